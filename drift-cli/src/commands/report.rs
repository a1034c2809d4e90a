use crate::app::CliApp;
use anyhow::{Context, Result};
use drift_core::recorder::DriftStore;
use drift_core::report::{DriftReport, build_report};
use drift_core::tracking::{load_tracking, set_tracking};
use tracing::info;

/// 汇总一个类别的漂移结果
pub fn run_report(app: &CliApp, category: &str, untracked_only: bool, json: bool) -> Result<()> {
    let config = &app.config;
    config.category(category)?;

    let path = config.output.drift_file(category);
    let store = DriftStore::load(&path)
        .with_context(|| format!("无法读取漂移结果: {}", path.display()))?;
    let tracked = load_tracking(&config.output.tracking_file);
    let report = build_report(&store, &tracked, untracked_only);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(category, &report);
    }
    Ok(())
}

fn print_report(category: &str, report: &DriftReport) {
    let state = match report.metadata.time_end {
        Some(end) => format!("已完成，用时 {:.0} 秒", end - report.metadata.time_start),
        None => "未完成".to_string(),
    };
    info!("📊 类别 {} 的漂移报告 ({})", category, state);
    info!("   共 {} 个漂移", report.entries.len());

    for entry in &report.entries {
        let tracked = entry
            .tracked
            .as_deref()
            .map(|ticket| format!(" [已跟踪: {ticket}]"))
            .unwrap_or_default();
        info!("");
        info!("🔸 {}{}", entry.title, tracked);
        info!("   {} ({} 个分片: {})", entry.key, entry.section_count, entry.sections.join(", "));
        for row in &entry.rows {
            info!("     {:<8} {:<32} {}", row.section, row.host, row.database);
        }
    }
}

/// 设置或取消漂移的跟踪工单
pub fn run_track(app: &CliApp, key: &str, ticket: &str) -> Result<()> {
    set_tracking(&app.config.output.tracking_file, key, ticket)?;
    Ok(())
}
