use crate::config::SchemaConfig;
use crate::error::{DriftError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// 架构定义文件来源
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// 读取一个架构文件的完整内容
    async fn get_file(&self, path: &str) -> Result<String>;
}

/// 本地目录中的架构文件
#[derive(Debug, Clone)]
pub struct LocalSchemaSource {
    root: PathBuf,
}

impl LocalSchemaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SchemaSource for LocalSchemaSource {
    async fn get_file(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path);
        debug!("读取本地架构文件: {}", full_path.display());
        tokio::fs::read_to_string(&full_path).await.map_err(|e| {
            DriftError::schema(format!("无法读取架构文件 {}: {}", full_path.display(), e))
        })
    }
}

/// 通过 HTTP 获取的架构文件，地址为 `base_url + path`
#[derive(Debug, Clone)]
pub struct HttpSchemaSource {
    client: Client,
    base_url: String,
}

impl HttpSchemaSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl SchemaSource for HttpSchemaSource {
    async fn get_file(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        debug!("下载架构文件: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DriftError::schema(format!(
                "获取架构文件失败: {} - HTTP {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

/// 根据配置选择架构来源：配置了 `base_url` 用 HTTP，否则读当前目录
pub fn schema_source_from_config(config: &SchemaConfig) -> Result<Box<dyn SchemaSource>> {
    match &config.base_url {
        Some(base_url) => Ok(Box::new(HttpSchemaSource::new(base_url.clone())?)),
        None => Ok(Box::new(LocalSchemaSource::new("."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_source_reads_relative_path() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("sql")).unwrap();
        std::fs::write(temp_dir.path().join("sql/tables.json"), "[]").unwrap();

        let source = LocalSchemaSource::new(temp_dir.path());
        assert_eq!(source.get_file("sql/tables.json").await.unwrap(), "[]");

        let missing = source.get_file("sql/missing.json").await;
        assert!(matches!(missing, Err(DriftError::Schema(_))));
    }

    #[test]
    fn test_http_url_join() {
        let source = HttpSchemaSource::new("https://example.org/raw/").unwrap();
        assert_eq!(
            source.url_for("/sql/tables.json"),
            "https://example.org/raw/sql/tables.json"
        );
    }
}
