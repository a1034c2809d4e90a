use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand, ValueEnum};
use drift_core::config::SchemaFormat;
use std::path::PathBuf;

/// 架构文档格式
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// 抽象架构 JSON
    #[default]
    Abstract,
    /// MySQL 建表语句
    Sql,
}

impl From<FormatArg> for SchemaFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Abstract => SchemaFormat::Abstract,
            FormatArg::Sql => SchemaFormat::Sql,
        }
    }
}

/// db-drift - 数据库架构漂移巡检工具
#[derive(Parser)]
#[command(name = "db-drift")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 创建默认配置文件
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 显示当前配置：检查类别、分片和输出位置
    Status,
    /// 巡检数据库并记录架构漂移
    Scan {
        /// 检查类别，`all` 表示全部类别
        category: String,
        /// 巡检配置中的生产分片（默认只检查本机）
        #[arg(long)]
        prod: bool,
        /// 检查分片中的所有数据库（默认只检查第一个）
        #[arg(long)]
        all: bool,
        /// 本地模式使用的数据库
        #[arg(long)]
        database: Option<String>,
    },
    /// 离线比较一张表：架构文档与保存下来的巡检输出
    CheckTable {
        /// 架构文档路径
        #[arg(long)]
        schema: PathBuf,
        /// 架构文档格式
        #[arg(long, value_enum, default_value_t = FormatArg::Abstract)]
        format: FormatArg,
        /// 表名
        #[arg(long)]
        table: String,
        /// DESCRIBE 与 SHOW INDEX 的输出（制表符分隔）
        #[arg(long)]
        observed: PathBuf,
        /// 只报告结构性漂移
        #[arg(long)]
        important_only: bool,
    },
    /// 把 MySQL 建表语句转换为抽象架构 JSON
    Abstract {
        /// SQL 文件路径
        #[arg(long)]
        sql_file: PathBuf,
        /// 输出文件，缺省输出到标准输出
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// 汇总一个类别的漂移结果
    Report {
        /// 检查类别
        category: String,
        /// 只显示尚未跟踪的漂移
        #[arg(long)]
        untracked_only: bool,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 为漂移登记跟踪工单，不带工单则取消跟踪
    Track {
        /// 漂移键，例如 "revision rev_id field-unsigned-mismatch"
        key: String,
        /// 工单编号
        ticket: Option<String>,
    },
}
