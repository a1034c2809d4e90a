use drift_core::error::Result;
use std::path::Path;

/// # db-drift 日志系统使用说明
///
/// 1. **库代码只使用 `tracing` 宏**：`info!()`, `warn!()`, `error!()`, `debug!()`
/// 2. **应用入口控制日志配置**：在 `main.rs` 中调用 `setup_logging()`
///
/// ## 配置选项
/// - `-v, --verbose`：启用详细日志模式（DEBUG 级别）
/// - `RUST_LOG`：标准的 Rust 日志级别控制
/// - `DRIFT_LOG_FILE`：日志文件路径，设置后日志输出到文件而非终端
///
/// ```bash
/// # 详细日志输出到终端
/// db-drift -v scan core --prod
///
/// # 日志输出到文件，巡检整个集群时便于事后排查
/// DRIFT_LOG_FILE=drift.log db-drift scan all --prod --all
///
/// # 只看巡检器的调试信息
/// RUST_LOG=drift_core::sources=debug db-drift scan core --database my_wiki
/// ```
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::env::var("DRIFT_LOG_FILE").ok().and_then(|path| {
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("无法打开日志文件 {path}: {e}，改为输出到终端");
                None
            }
        }
    });

    if let Some(file) = log_file {
        // 输出到文件 - 使用详细格式便于调试
        fmt()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .init();
    } else {
        // 输出到终端 - 使用简洁格式
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .without_time()
            .compact()
            .init();
    }
}

/// 读取保存下来的巡检输出，保留原始行
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_keeps_tabs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("revision.tsv");
        std::fs::write(&path, "Field\tType\tNull\nrev_id\tint(10) unsigned\tNO\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["Field\tType\tNull", "rev_id\tint(10) unsigned\tNO"]);
    }
}
