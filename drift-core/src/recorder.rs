//! 漂移结果记录
//!
//! 结果文件是一个 JSON 对象：漂移键 -> 分片 -> `host:database` 列表，
//! 另有 `_metadata` 记录本次巡检的开始与结束时间。

use crate::constants::store::METADATA_KEY;
use crate::error::{DriftError, Result};
use crate::schema_drift::DriftFinding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// 漂移键 -> 分片 -> 位置列表
pub type DriftMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// 巡检元数据，时间为 Unix 秒（带小数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub time_start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<f64>,
}

/// 一个类别的漂移结果
#[derive(Debug, Clone, PartialEq)]
pub struct DriftStore {
    pub metadata: RunMetadata,
    pub drifts: DriftMap,
}

impl DriftStore {
    pub fn new(time_start: f64) -> Self {
        Self {
            metadata: RunMetadata {
                time_start,
                time_end: None,
            },
            drifts: DriftMap::new(),
        }
    }

    /// 追加一个位置，已存在则忽略；返回是否新增
    pub fn insert(&mut self, key: &str, section: &str, location: &str) -> bool {
        let locations = self
            .drifts
            .entry(key.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default();
        if locations.iter().any(|l| l == location) {
            return false;
        }
        locations.push(location.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.drifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drifts.is_empty()
    }

    /// 巡检是否完整结束
    pub fn is_complete(&self) -> bool {
        self.metadata.time_end.is_some()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
        let metadata = raw
            .remove(METADATA_KEY)
            .ok_or_else(|| DriftError::persistence(format!("结果文件缺少 {METADATA_KEY}")))?;
        let metadata: RunMetadata = serde_json::from_value(metadata)?;

        let mut drifts = DriftMap::new();
        for (key, value) in raw {
            drifts.insert(key, serde_json::from_value(value)?);
        }

        Ok(Self { metadata, drifts })
    }

    /// 键排序、4 空格缩进，读入后原样写出字节不变
    pub fn to_json_string(&self) -> Result<String> {
        let mut document: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        document.insert(METADATA_KEY, serde_json::to_value(&self.metadata)?);
        for (key, sections) in &self.drifts {
            document.insert(key, serde_json::to_value(sections)?);
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| DriftError::persistence(format!("输出编码错误: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), &self.to_json_string()?)
    }
}

/// 先写入同目录的临时文件再重命名，中途失败不会留下半个文件
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path)?;
    Ok(())
}

/// 当前时间（Unix 秒，带小数）
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// 单次巡检的结果记录器
///
/// 发现先累积在内存中，每个巡检目标结束时 `checkpoint` 落盘，
/// 只有 `finish` 才会写入 `time_end`。
#[derive(Debug)]
pub struct DriftRecorder {
    path: PathBuf,
    store: DriftStore,
    pending: usize,
}

impl DriftRecorder {
    /// 开始新的一次巡检，立即写出只含 `time_start` 的结果文件
    pub fn start<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let store = DriftStore::new(unix_now());
        store.save(&path)?;
        info!("📝 漂移结果文件: {}", path.display());
        Ok(Self {
            path,
            store,
            pending: 0,
        })
    }

    /// 记录一条发现；返回是否为新位置
    pub fn record(&mut self, finding: &DriftFinding) -> bool {
        let added = self.store.insert(
            &finding.key(),
            &finding.target.section,
            &finding.target.location(),
        );
        if added {
            debug!("记录漂移: {} @ {}", finding.key(), finding.target);
            self.pending += 1;
        }
        added
    }

    /// 将尚未落盘的发现写入文件
    pub fn checkpoint(&mut self) -> Result<()> {
        if self.pending == 0 {
            return Ok(());
        }
        self.store.save(&self.path)?;
        debug!("已写入 {} 条新发现", self.pending);
        self.pending = 0;
        Ok(())
    }

    /// 写入 `time_end` 并落盘
    pub fn finish(mut self) -> Result<DriftStore> {
        self.store.metadata.time_end = Some(unix_now());
        self.store.save(&self.path)?;
        self.pending = 0;
        Ok(self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_drift::{Drift, DriftKind, Target};
    use tempfile::TempDir;

    fn finding(kind: DriftKind, table: &str, element: &str, target: &Target) -> DriftFinding {
        Drift::new(kind, table, element).at(target)
    }

    #[test]
    fn test_store_round_trip_is_byte_stable() {
        let content = r#"{
    "_metadata": {
        "time_end": 1700000123.25,
        "time_start": 1700000000.5
    },
    "page page_len field-nullable-mismatch": {
        "s1": [
            "db1001:enwiki"
        ],
        "s2": [
            "db2001:bgwiki",
            "db2001:cswiki"
        ]
    },
    "revision rev_id field-unsigned-mismatch": {
        "s1": [
            "db1002:3311:enwiki"
        ]
    }
}
"#;

        let store = DriftStore::from_json_str(content).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.is_complete());
        assert_eq!(store.to_json_string().unwrap(), content);
    }

    #[test]
    fn test_store_requires_metadata() {
        let result = DriftStore::from_json_str(r#"{"a b c": {"s1": ["h:d"]}}"#);
        assert!(matches!(result, Err(DriftError::Persistence(_))));
    }

    #[test]
    fn test_recorder_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("drifts_core.json");
        let s1 = Target::new("s1", "db1001", "enwiki");
        let s2 = Target::new("s2", "db2001", "bgwiki");

        let mut recorder = DriftRecorder::start(&path).unwrap();
        let started = DriftStore::load(&path).unwrap();
        assert!(started.is_empty());
        assert!(!started.is_complete());

        let unsigned = finding(DriftKind::FieldUnsignedMismatch, "revision", "rev_id", &s1);
        assert!(recorder.record(&unsigned));
        assert!(!recorder.record(&unsigned));
        assert!(recorder.record(&finding(
            DriftKind::FieldUnsignedMismatch,
            "revision",
            "rev_id",
            &s2
        )));
        recorder.checkpoint().unwrap();

        let partial = DriftStore::load(&path).unwrap();
        assert_eq!(partial.len(), 1);
        assert!(!partial.is_complete());

        let done = recorder.finish().unwrap();
        let loaded = DriftStore::load(&path).unwrap();
        assert_eq!(loaded, done);
        assert!(loaded.is_complete());
        assert!(loaded.metadata.time_end >= Some(loaded.metadata.time_start));
        assert_eq!(
            loaded.drifts["revision rev_id field-unsigned-mismatch"]["s2"],
            vec!["db2001:bgwiki"]
        );
    }

    #[test]
    fn test_save_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("drifts_core.json");

        DriftStore::new(1.0).save(&path).unwrap();
        assert!(path.exists());
    }
}
