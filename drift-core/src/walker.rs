//! 分片巡检
//!
//! 按 类别 -> 分片 -> 数据库 -> 主机 -> 表 的顺序逐个读取线上结构并比较，
//! 每次请求之间按配置间隔等待，单个目标失败只记录日志并跳过。

use crate::config::{AppConfig, CategoryConfig, SchemaFormat};
use crate::constants::introspection::LOCALHOST;
use crate::error::{DriftError, Result};
use crate::recorder::DriftRecorder;
use crate::schema_drift::{ExpectedTable, ObservedTable, TableComparator, Target, parse_sql_schema};
use crate::sources::{Introspector, SchemaSource};
use tracing::{debug, info, warn};

/// 本地模式下的分片名
pub const LOCAL_SECTION: &str = "local";

/// 巡检范围
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// 巡检配置中的生产分片，否则只检查本机
    pub prod: bool,
    /// 检查分片中的所有数据库，否则只检查第一个
    pub all_databases: bool,
    /// 本地模式使用的数据库
    pub database: Option<String>,
}

/// 一个类别的巡检统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub targets: usize,
    pub tables_compared: usize,
    pub tables_without_data: usize,
    pub findings: usize,
}

/// 按格式解码一个架构文档，`origin` 只用于错误信息
pub fn decode_schema(content: &str, format: SchemaFormat, origin: &str) -> Result<Vec<ExpectedTable>> {
    match format {
        SchemaFormat::Abstract => serde_json::from_str(content)
            .map_err(|e| DriftError::schema(format!("无法解析架构文件 {origin}: {e}"))),
        SchemaFormat::Sql => parse_sql_schema(content),
    }
}

pub struct FleetWalker<'a> {
    config: &'a AppConfig,
    source: &'a dyn SchemaSource,
    introspector: &'a dyn Introspector,
    comparator: TableComparator,
}

impl<'a> FleetWalker<'a> {
    pub fn new(
        config: &'a AppConfig,
        source: &'a dyn SchemaSource,
        introspector: &'a dyn Introspector,
    ) -> Self {
        Self {
            config,
            source,
            introspector,
            comparator: TableComparator::new(config.compare.clone()),
        }
    }

    /// 巡检一个类别或 `all`，返回每个类别的统计
    pub async fn scan(&self, category: &str, options: &ScanOptions) -> Result<Vec<(String, ScanSummary)>> {
        let mut results = Vec::new();
        for name in self.config.resolve_categories(category)? {
            let summary = self.scan_category(&name, options).await?;
            results.push((name, summary));
        }
        Ok(results)
    }

    /// 读取并解码类别的全部架构文件，任一文件失败即终止
    pub async fn load_schema(&self, category: &CategoryConfig) -> Result<Vec<ExpectedTable>> {
        let mut tables = Vec::new();
        for path in &category.paths {
            let content = self.source.get_file(path).await?;
            let parsed = decode_schema(&content, category.format, path)?;
            debug!("架构文件 {} 包含 {} 张表", path, parsed.len());
            tables.extend(parsed);
        }
        Ok(tables)
    }

    /// 列出巡检目标
    pub fn targets(&self, category: &CategoryConfig, options: &ScanOptions) -> Result<Vec<Target>> {
        if !options.prod {
            let database = options
                .database
                .as_deref()
                .ok_or_else(|| DriftError::custom("本地模式需要指定 --database"))?;
            return Ok(vec![Target::new(LOCAL_SECTION, LOCALHOST, database)]);
        }

        let mut targets = Vec::new();
        for shard in self.config.shards_for(category) {
            let databases: &[String] = if options.all_databases {
                &shard.databases
            } else {
                &shard.databases[..shard.databases.len().min(1)]
            };
            if databases.is_empty() {
                warn!("分片 {} 没有配置数据库，跳过", shard.name);
                continue;
            }
            for database in databases {
                for host in &shard.hosts {
                    targets.push(Target::new(&shard.name, host, database));
                }
            }
        }
        Ok(targets)
    }

    /// 巡检一个类别并写入 `drifts_<类别>.json`
    pub async fn scan_category(&self, name: &str, options: &ScanOptions) -> Result<ScanSummary> {
        let category = self.config.category(name)?;
        let tables = self.load_schema(category).await?;
        let targets = self.targets(category, options)?;
        info!("🚀 开始巡检类别 {}: {} 张表, {} 个目标", name, tables.len(), targets.len());

        let mut recorder = DriftRecorder::start(self.config.output.drift_file(name))?;
        let mut summary = ScanSummary::default();
        let pacing = self.config.introspection.pacing();
        let mut first_request = true;

        for target in &targets {
            info!("🔍 巡检 {}", target);
            summary.targets += 1;

            for table in &tables {
                if self.comparator.should_skip(&table.name) {
                    continue;
                }
                if !first_request && !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }
                first_request = false;

                let lines = match self
                    .introspector
                    .introspect(&target.host, &target.database, &table.name)
                    .await
                {
                    Ok(lines) => lines,
                    Err(e) if e.is_transient() => {
                        warn!("⚠️ 无响应: {} {} - {}", target, table.name, e);
                        summary.tables_without_data += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let Some(observed) = ObservedTable::from_output(&lines) else {
                    warn!("⚠️ 无数据: {} {}", target, table.name);
                    summary.tables_without_data += 1;
                    continue;
                };

                summary.tables_compared += 1;
                for drift in self.comparator.compare_table(table, &observed) {
                    if recorder.record(&drift.at(target)) {
                        summary.findings += 1;
                    }
                }
            }

            recorder.checkpoint()?;
        }

        let store = recorder.finish()?;
        info!(
            "✅ 类别 {} 巡检完成: 目标 {}, 已比较 {} 张表, 无数据 {} 张, 新发现 {} 条, 漂移键 {} 个",
            name,
            summary.targets,
            summary.tables_compared,
            summary.tables_without_data,
            summary.findings,
            store.len()
        );
        Ok(summary)
    }
}
