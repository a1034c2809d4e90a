use drift_core::{config::AppConfig, error::Result};
use std::path::Path;
use tracing::{info, warn};

/// 写入默认配置文件
pub async fn run_init(config_path: &Path, force: bool) -> Result<()> {
    info!("🧭 db-drift 初始化");
    info!("==================");

    if !force && config_path.exists() {
        warn!("⚠️  检测到已存在的配置文件: {}", config_path.display());
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: db-drift init --force");
        return Ok(());
    }

    let config = AppConfig::default();
    config.save_to_file(config_path)?;
    info!("   ✅ 创建配置文件: {}", config_path.display());

    std::fs::create_dir_all(&config.output.dir)?;
    info!("   ✅ 漂移结果目录: {}", config.output.dir);

    info!("👉 下一步:");
    info!("   1. 在 [categories] 中填写架构文件路径");
    info!("   2. 在 [[shards]] 中填写副本主机与数据库");
    info!("   3. 运行 db-drift scan core --database <本地数据库> 试跑");
    Ok(())
}
