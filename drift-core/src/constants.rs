/// 配置文件相关常量
pub mod config {
    /// 按优先级查找的配置文件名
    pub const CONFIG_FILE_CANDIDATES: &[&str] = &["config.toml", "db-drift.toml", ".db-drift.toml"];
}

/// 数据库巡检相关常量
pub mod introspection {
    /// 默认数据库客户端程序
    pub const DEFAULT_CLIENT: &str = "mysql";

    /// 单次巡检命令超时时间（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// 两次巡检请求之间的间隔（毫秒），避免给线上数据库造成压力
    pub const DEFAULT_PACING_MS: u64 = 500;

    /// 本地模式使用的主机名
    pub const LOCALHOST: &str = "localhost";

    /// 数据库客户端输出的错误行前缀
    pub const ERROR_MARKER: &str = "ERROR";

    /// DESCRIBE 输出的表头
    pub const DESCRIBE_HEADER: &str = "Field\tType";

    /// SHOW INDEX 输出的表头
    pub const INDEX_HEADER: &str = "Table\tNon_unique";
}

/// 架构比较相关常量
pub mod compare {
    /// 全文检索表，线上结构与代码定义天然不同，始终跳过
    pub const FULLTEXT_SEARCH_TABLE: &str = "searchindex";

    /// 主键索引名（比较时不区分大小写）
    pub const PRIMARY_INDEX: &str = "primary";
}

/// 漂移结果文件相关常量
pub mod store {
    use std::path::{Path, PathBuf};

    /// 元数据键
    pub const METADATA_KEY: &str = "_metadata";

    /// 默认输出目录
    pub const DEFAULT_OUTPUT_DIR: &str = ".";

    /// 默认跟踪记录文件
    pub const DEFAULT_TRACKING_FILE: &str = "tracking.json";

    /// 获取指定类别的漂移结果文件路径
    pub fn get_drift_file_path(output_dir: &Path, category: &str) -> PathBuf {
        output_dir.join(format!("drifts_{category}.json"))
    }
}

/// 版本信息
pub mod version {
    /// 核心库版本
    pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
