/// db-drift 项目信息模块
///
/// drift-cli 是面向用户的主程序，项目元数据统一在这里定义，
/// drift-core 作为内部库，只提供技术性常量

/// 项目元数据（自动从 drift-cli 的 Cargo.toml 同步）
pub mod metadata {
    /// 项目描述
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    /// 项目作者
    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// 项目许可证
    pub const PROJECT_LICENSE: &str = env!("CARGO_PKG_LICENSE");

    /// 用户友好的显示名称（手动维护）
    pub mod display {
        /// 用户友好的项目名称
        pub const FRIENDLY_NAME: &str = "db-drift";

        /// 项目详细描述
        pub const DESCRIPTION_LONG: &str = "比较代码中声明的数据库架构与生产副本上的实际结构，按分片记录列、索引和主键的漂移，并汇总成报告";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// 核心库版本
    pub const CORE_VERSION: &str = drift_core::constants::version::CORE_VERSION;
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{} (core v{})",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION,
        version_info::CORE_VERSION
    )
}

/// 获取作者和许可证信息
pub fn get_copyright_info() -> String {
    format!(
        "© {} - Licensed under {}",
        metadata::PROJECT_AUTHORS,
        metadata::PROJECT_LICENSE
    )
}
