use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriftError>;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("HTTP 请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("未知的检查类别: {0}")]
    UnknownCategory(String),

    #[error("架构定义错误: {0}")]
    Schema(String),

    #[error("数据库巡检命令失败: {0}")]
    Introspection(String),

    #[error("超时错误: {operation} 操作超时 ({timeout_seconds}秒)")]
    Timeout {
        operation: String,
        timeout_seconds: u64,
    },

    #[error("漂移结果持久化失败: {0}")]
    Persistence(String),

    #[error("配置文件未找到")]
    ConfigNotFound,

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl From<tempfile::PersistError> for DriftError {
    fn from(err: tempfile::PersistError) -> Self {
        DriftError::Persistence(err.to_string())
    }
}

impl DriftError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// 是否属于单个目标的瞬时失败（跳过即可，不影响整次巡检）
    ///
    /// 启动客户端时的 IO 错误（进程数或文件句柄耗尽等）同样只影响当前请求。
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Introspection(_) | Self::Io(_)
        )
    }
}
