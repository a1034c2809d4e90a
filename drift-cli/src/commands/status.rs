use crate::app::CliApp;
use crate::project_info::{get_copyright_info, get_version_string};
use drift_core::config::SchemaFormat;
use tracing::info;

/// 显示当前配置
pub fn run_status(app: &CliApp) {
    let config = &app.config;

    info!("🧭 {}", get_version_string());
    info!("   {}", get_copyright_info());
    info!("📋 基本信息:");
    info!("   配置文件: {}", app.config_path.display());
    info!("   数据库客户端: {}", config.introspection.client);
    info!(
        "   超时: {}秒, 请求间隔: {}毫秒",
        config.introspection.timeout_secs, config.introspection.pacing_ms
    );
    match &config.schema.base_url {
        Some(url) => info!("   架构来源: {}", url),
        None => info!("   架构来源: 本地文件"),
    }
    info!("   结果目录: {}", config.output.dir);

    info!("📂 检查类别:");
    if config.categories.is_empty() {
        info!("   (无)");
    }
    for (name, category) in &config.categories {
        let format = match category.format {
            SchemaFormat::Abstract => "abstract",
            SchemaFormat::Sql => "sql",
        };
        let drift_file = config.output.drift_file(name);
        let state = if drift_file.exists() { "✅" } else { "⏳" };
        info!(
            "   {} {} [{}] {} 个架构文件, 分片: {}",
            state,
            name,
            format,
            category.paths.len(),
            category
                .shards
                .as_ref()
                .map(|s| s.join(", "))
                .unwrap_or_else(|| "全部".to_string())
        );
    }

    info!("🗄️ 分片:");
    for shard in &config.shards {
        info!(
            "   {}: {} 台主机, {} 个数据库",
            shard.name,
            shard.hosts.len(),
            shard.databases.len()
        );
    }
}
