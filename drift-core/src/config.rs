use crate::constants::{config, introspection, store};
use crate::error::{DriftError, Result};
use crate::schema_drift::CompareOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub introspection: IntrospectionConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub compare: CompareOptions,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
    #[serde(default)]
    pub shards: Vec<ShardConfig>,
}

/// 数据库巡检相关配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IntrospectionConfig {
    /// 数据库客户端程序
    #[serde(default = "default_client")]
    pub client: String,
    /// 追加到客户端命令行的参数，例如 `--defaults-file=...`
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// 非本机主机追加的域名后缀，例如 `.eqiad.wmnet`
    #[serde(default)]
    pub host_suffix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_client() -> String {
    introspection::DEFAULT_CLIENT.to_string()
}

fn default_timeout_secs() -> u64 {
    introspection::DEFAULT_TIMEOUT_SECS
}

fn default_pacing_ms() -> u64 {
    introspection::DEFAULT_PACING_MS
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            extra_args: Vec::new(),
            host_suffix: String::new(),
            timeout_secs: default_timeout_secs(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl IntrospectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// 架构定义来源，未配置 `base_url` 时读取本地文件
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SchemaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// 输出相关配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_tracking_file")]
    pub tracking_file: String,
}

fn default_output_dir() -> String {
    store::DEFAULT_OUTPUT_DIR.to_string()
}

fn default_tracking_file() -> String {
    store::DEFAULT_TRACKING_FILE.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            tracking_file: default_tracking_file(),
        }
    }
}

impl OutputConfig {
    /// 指定类别的漂移结果文件路径
    pub fn drift_file(&self, category: &str) -> PathBuf {
        store::get_drift_file_path(Path::new(&self.dir), category)
    }
}

/// 架构定义文档格式
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// 抽象架构 JSON 文档
    #[default]
    Abstract,
    /// 原始 MySQL 建表语句
    Sql,
}

/// 一个检查类别：一组架构文件及其适用的分片
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CategoryConfig {
    pub paths: Vec<String>,
    #[serde(default)]
    pub format: SchemaFormat,
    /// 为空表示所有分片
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<Vec<String>>,
}

/// 分片：一组副本主机及其承载的数据库
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShardConfig {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub databases: Vec<String>,
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：config.toml -> db-drift.toml -> .db-drift.toml
    pub fn find_and_load_config() -> Result<Self> {
        for config_file in config::CONFIG_FILE_CANDIDATES {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        tracing::warn!("未找到配置文件，请先运行 `db-drift init`");
        Err(DriftError::ConfigNotFound)
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存默认配置到文件（带注释）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/config.toml.template");

        TEMPLATE
            .replace("{client}", &self.introspection.client)
            .replace("{host_suffix}", &self.introspection.host_suffix)
            .replace("{timeout_secs}", &self.introspection.timeout_secs.to_string())
            .replace("{pacing_ms}", &self.introspection.pacing_ms.to_string())
            .replace("{output_dir}", &self.output.dir)
            .replace("{tracking_file}", &self.output.tracking_file)
            .replace("{important_only}", &self.compare.important_only.to_string())
    }

    /// 获取检查类别
    pub fn category(&self, name: &str) -> Result<&CategoryConfig> {
        self.categories
            .get(name)
            .ok_or_else(|| DriftError::UnknownCategory(name.to_string()))
    }

    /// 解析命令行中的类别参数，`all` 展开为全部类别
    pub fn resolve_categories(&self, name: &str) -> Result<Vec<String>> {
        if name == "all" {
            if self.categories.is_empty() {
                return Err(DriftError::custom("配置中没有任何检查类别"));
            }
            return Ok(self.categories.keys().cloned().collect());
        }
        self.category(name)?;
        Ok(vec![name.to_string()])
    }

    /// 类别适用的分片，按配置顺序
    pub fn shards_for(&self, category: &CategoryConfig) -> Vec<&ShardConfig> {
        match &category.shards {
            Some(names) => self
                .shards
                .iter()
                .filter(|shard| names.contains(&shard.name))
                .collect(),
            None => self.shards.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[introspection]
client = "mariadb"
extra_args = ["--defaults-file=/etc/my.cnf"]
host_suffix = ".eqiad.wmnet"

[output]
dir = "out"

[compare]
important_only = true
skip_tables = ["objectcache"]

[categories.core]
paths = ["sql/tables.json"]

[categories.flaggedrevs]
paths = ["extensions/FlaggedRevs/tables.sql"]
format = "sql"
shards = ["s2"]

[[shards]]
name = "s1"
hosts = ["db1001", "db1002:3311"]
databases = ["enwiki"]

[[shards]]
name = "s2"
hosts = ["db2001"]
databases = ["bgwiki", "cswiki"]
"#;

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.introspection.client, "mariadb");
        assert_eq!(config.introspection.timeout_secs, 5);
        assert_eq!(config.introspection.pacing(), Duration::from_millis(500));
        assert_eq!(config.output.tracking_file, "tracking.json");
        assert!(config.compare.important_only);
        assert_eq!(config.categories["core"].format, SchemaFormat::Abstract);
        assert_eq!(config.categories["flaggedrevs"].format, SchemaFormat::Sql);
        assert_eq!(config.output.drift_file("core"), Path::new("out").join("drifts_core.json"));
    }

    #[test]
    fn test_resolve_categories() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.resolve_categories("all").unwrap(), vec!["core", "flaggedrevs"]);
        assert_eq!(config.resolve_categories("core").unwrap(), vec!["core"]);
        assert!(matches!(
            config.resolve_categories("wikibase"),
            Err(DriftError::UnknownCategory(name)) if name == "wikibase"
        ));
    }

    #[test]
    fn test_shards_for_category() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();

        let all = config.shards_for(config.category("core").unwrap());
        assert_eq!(all.len(), 2);

        let restricted = config.shards_for(config.category("flaggedrevs").unwrap());
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].name, "s2");
    }

    #[test]
    fn test_default_template_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        AppConfig::default().save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.introspection.client, "mysql");
        assert_eq!(loaded.introspection.timeout_secs, 5);
        assert_eq!(loaded.output.dir, ".");
        assert!(!loaded.compare.important_only);
        assert!(loaded.categories.contains_key("core"));
        assert_eq!(loaded.shards.len(), 1);
    }
}
