use anyhow::{Context, Result};
use drift_core::schema_drift::{parse_sql_schema, to_abstract_json};
use std::path::Path;
use tracing::info;

/// 把 SQL 建表语句转换为抽象架构 JSON
pub fn run_abstract(sql_file: &Path, output: Option<&Path>) -> Result<()> {
    let sql = std::fs::read_to_string(sql_file)
        .with_context(|| format!("无法读取 SQL 文件: {}", sql_file.display()))?;
    let tables = parse_sql_schema(&sql)?;
    let rendered = to_abstract_json(&tables)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("无法写入: {}", path.display()))?;
            info!("✅ 已写入 {} 张表到 {}", tables.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::schema_drift::ExpectedTable;
    use tempfile::TempDir;

    #[test]
    fn test_abstract_writes_decodable_json() {
        let temp_dir = TempDir::new().unwrap();
        let sql_file = temp_dir.path().join("tables.sql");
        let output = temp_dir.path().join("tables.json");
        std::fs::write(
            &sql_file,
            "CREATE TABLE /*_*/user_groups (\n  ug_user int unsigned NOT NULL default 0,\n  ug_group varbinary(255) NOT NULL default '',\n  PRIMARY KEY (ug_user, ug_group)\n) /*$wgDBTableOptions*/;\n",
        )
        .unwrap();

        run_abstract(&sql_file, Some(&output)).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let tables: Vec<ExpectedTable> = serde_json::from_str(&content).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "user_groups");
        assert_eq!(
            tables[0].pk,
            Some(vec!["ug_user".to_string(), "ug_group".to_string()])
        );
    }
}
