use crate::error::{DriftError, Result};
use crate::recorder::write_atomic;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// 已跟踪的漂移：漂移键 -> 工单
pub type TrackingMap = BTreeMap<String, String>;

/// 读取跟踪记录，文件不存在或内容无效时视为没有任何跟踪
pub fn load_tracking<P: AsRef<Path>>(path: P) -> TrackingMap {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return TrackingMap::new(),
    };
    match serde_json::from_str(&content) {
        Ok(tracked) => tracked,
        Err(e) => {
            warn!("跟踪记录 {} 格式无效，忽略: {}", path.display(), e);
            TrackingMap::new()
        }
    }
}

/// 严格读取跟踪记录：文件不存在视为空，内容无效则报错
fn read_tracking(path: &Path) -> Result<TrackingMap> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TrackingMap::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map_err(|e| {
        DriftError::persistence(format!(
            "跟踪记录 {} 格式无效，请先修复: {}",
            path.display(),
            e
        ))
    })
}

/// 设置或清除一条漂移的跟踪工单，`ticket` 为空表示清除
///
/// 现有文件无法解析时拒绝写入，避免覆盖已有工单。
pub fn set_tracking<P: AsRef<Path>>(path: P, key: &str, ticket: &str) -> Result<TrackingMap> {
    let path = path.as_ref();
    let mut tracked = read_tracking(path)?;
    let key = key.trim();
    let ticket = ticket.trim();

    if ticket.is_empty() {
        tracked.remove(key);
        info!("已取消跟踪: {}", key);
    } else {
        tracked.insert(key.to_string(), ticket.to_string());
        info!("已跟踪: {} -> {}", key, ticket);
    }

    write_atomic(path, &(serde_json::to_string_pretty(&tracked)? + "\n"))?;
    Ok(tracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_or_invalid_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.json");
        assert!(load_tracking(&path).is_empty());

        fs::write(&path, "not json").unwrap();
        assert!(load_tracking(&path).is_empty());
    }

    #[test]
    fn test_set_and_clear_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.json");
        let key = "revision rev_id field-unsigned-mismatch";

        set_tracking(&path, key, " T123456 ").unwrap();
        assert_eq!(load_tracking(&path).get(key).map(String::as_str), Some("T123456"));

        let cleared = set_tracking(&path, key, "").unwrap();
        assert!(cleared.is_empty());
        assert!(load_tracking(&path).is_empty());
    }

    #[test]
    fn test_set_tracking_refuses_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.json");
        let corrupt = r#"{"a b field-type-mismatch":"T1","c d field-size-mismatch":"T2",}"#;
        fs::write(&path, corrupt).unwrap();

        let result = set_tracking(&path, "e f field-nullable-mismatch", "T3");

        assert!(matches!(result, Err(DriftError::Persistence(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
    }

    #[test]
    fn test_set_tracking_keeps_existing_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tracking.json");

        set_tracking(&path, "a b field-type-mismatch", "T1").unwrap();
        let tracked = set_tracking(&path, "c d field-size-mismatch", "T2").unwrap();

        assert_eq!(tracked.len(), 2);
        assert_eq!(load_tracking(&path), tracked);
    }
}
