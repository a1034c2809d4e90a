use crate::app::CliApp;
use drift_core::error::Result;
use drift_core::sources::{CommandIntrospector, schema_source_from_config};
use drift_core::walker::{FleetWalker, ScanOptions};
use tracing::info;

/// 巡检一个类别或全部类别
pub async fn run_scan(
    app: &CliApp,
    category: &str,
    prod: bool,
    all_databases: bool,
    database: Option<String>,
) -> Result<()> {
    let config = &app.config;
    let options = ScanOptions {
        prod,
        all_databases,
        database,
    };

    let source = schema_source_from_config(&config.schema)?;
    let introspector = CommandIntrospector::new(config.introspection.clone())?;
    let walker = FleetWalker::new(config, source.as_ref(), &introspector);

    let results = walker.scan(category, &options).await?;

    info!("📊 巡检汇总:");
    for (name, summary) in &results {
        info!(
            "   {}: 目标 {}, 已比较 {} 张表, 无数据 {} 张, 新发现 {} 条 -> {}",
            name,
            summary.targets,
            summary.tables_compared,
            summary.tables_without_data,
            summary.findings,
            config.output.drift_file(name).display()
        );
    }
    Ok(())
}
