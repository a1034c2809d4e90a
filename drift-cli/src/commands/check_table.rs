use crate::cli::FormatArg;
use crate::utils::read_lines;
use anyhow::{Context, Result};
use drift_core::report::title_for;
use drift_core::schema_drift::{CompareOptions, Drift, ObservedTable, TableComparator};
use drift_core::walker::decode_schema;
use std::path::Path;
use tracing::{info, warn};

/// 离线比较一张表，返回发现的漂移
pub fn run_check_table(
    schema: &Path,
    format: FormatArg,
    table: &str,
    observed: &Path,
    important_only: bool,
) -> Result<Vec<Drift>> {
    let content = std::fs::read_to_string(schema)
        .with_context(|| format!("无法读取架构文件: {}", schema.display()))?;
    let tables = decode_schema(&content, format.into(), &schema.display().to_string())?;
    let expected = tables
        .iter()
        .find(|t| t.name == table)
        .ok_or_else(|| anyhow::anyhow!("架构文件中没有表 {}", table))?;

    let lines = read_lines(observed)
        .with_context(|| format!("无法读取巡检输出: {}", observed.display()))?;
    let Some(observed_table) = ObservedTable::from_output(&lines) else {
        warn!("⚠️ 无数据: {} 中没有可用的表结构", observed.display());
        return Ok(Vec::new());
    };

    let comparator = TableComparator::new(CompareOptions {
        important_only,
        ..CompareOptions::default()
    });
    let drifts = comparator.compare_table(expected, &observed_table);

    if drifts.is_empty() {
        info!("✅ 表 {} 与架构定义一致", table);
    } else {
        info!("🔎 表 {} 发现 {} 处漂移:", table, drifts.len());
        for drift in &drifts {
            info!("   - {} ({})", title_for(&drift.key()), drift.kind);
        }
    }
    Ok(drifts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::schema_drift::DriftKind;
    use tempfile::TempDir;

    const SCHEMA_SQL: &str = "CREATE TABLE page (\n  page_id int unsigned NOT NULL PRIMARY KEY AUTO_INCREMENT,\n  page_len int unsigned NOT NULL\n);";

    #[test]
    fn test_check_table_from_sql_schema() {
        let temp_dir = TempDir::new().unwrap();
        let schema = temp_dir.path().join("tables.sql");
        let observed = temp_dir.path().join("page.tsv");
        std::fs::write(&schema, SCHEMA_SQL).unwrap();
        std::fs::write(
            &observed,
            "Field\tType\tNull\tKey\tDefault\tExtra\n\
             page_id\tint(10) unsigned\tNO\tPRI\tNULL\tauto_increment\n\
             page_len\tint(10) unsigned\tYES\t\tNULL\t\n\
             Table\tNon_unique\tKey_name\tSeq_in_index\tColumn_name\n\
             page\t0\tPRIMARY\t1\tpage_id\n",
        )
        .unwrap();

        let drifts = run_check_table(&schema, FormatArg::Sql, "page", &observed, false).unwrap();
        assert_eq!(
            drifts,
            vec![Drift::new(DriftKind::FieldNullableMismatch, "page", "page_len")]
        );

        let important = run_check_table(&schema, FormatArg::Sql, "page", &observed, true).unwrap();
        assert!(important.is_empty());
    }

    #[test]
    fn test_check_table_unknown_table() {
        let temp_dir = TempDir::new().unwrap();
        let schema = temp_dir.path().join("tables.json");
        let observed = temp_dir.path().join("page.tsv");
        std::fs::write(&schema, "[]").unwrap();
        std::fs::write(&observed, "").unwrap();

        assert!(run_check_table(&schema, FormatArg::Abstract, "page", &observed, false).is_err());
    }
}
