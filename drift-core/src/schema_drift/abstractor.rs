use super::parser::parse_type_spec;
use super::types::{
    ColumnOptions, ColumnSize, CustomSchemaOptions, DeclaredType, EngineType, ExpectedColumn,
    ExpectedIndex, ExpectedTable,
};
use crate::error::{DriftError, Result};
use regex::Regex;
use sqlparser::ast::{ColumnDef, ColumnOption, Statement, TableConstraint};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::{debug, info, warn};

/// 把 MySQL 建表语句转换为抽象架构定义
///
/// 支持 `CREATE TABLE` 与 `CREATE [UNIQUE] INDEX ... ON t (...)`，
/// 注释会先被去掉，无法解析的语句记录警告后跳过。
pub fn parse_sql_schema(sql: &str) -> Result<Vec<ExpectedTable>> {
    let cleaned = strip_comments(sql)?;
    let dialect = MySqlDialect {};

    let mut tables: Vec<ExpectedTable> = Vec::new();
    let mut pending_indexes: Vec<(String, ExpectedIndex)> = Vec::new();

    for statement_sql in split_statements(&cleaned) {
        debug!("解析 SQL 语句: {}", statement_sql);
        let statements = match Parser::parse_sql(&dialect, &statement_sql) {
            Ok(statements) => statements,
            Err(e) => {
                warn!("解析 SQL 语句失败: {} - 错误: {}", statement_sql, e);
                continue;
            }
        };

        for statement in statements {
            match statement {
                Statement::CreateTable(create_table) => {
                    let mut table = ExpectedTable {
                        name: clean_ident(&create_table.name.to_string()),
                        comment: None,
                        columns: Vec::new(),
                        indexes: Vec::new(),
                        pk: None,
                    };

                    for column in &create_table.columns {
                        let (expected, inline_pk) = convert_column(column);
                        if inline_pk {
                            table.pk = Some(vec![expected.name.clone()]);
                        }
                        table.columns.push(expected);
                    }

                    for constraint in &create_table.constraints {
                        apply_constraint(&mut table, constraint);
                    }

                    tables.push(table);
                }
                Statement::CreateIndex(create_index) => {
                    let Some(name) = create_index.name.as_ref() else {
                        warn!("跳过未命名的索引: {}", statement_sql);
                        continue;
                    };
                    let table_name = clean_ident(&create_index.table_name.to_string());
                    let index = ExpectedIndex {
                        name: clean_ident(&name.to_string()),
                        columns: create_index
                            .columns
                            .iter()
                            .map(|c| clean_ident(&c.to_string()))
                            .collect(),
                        unique: create_index.unique,
                        comment: None,
                    };
                    pending_indexes.push((table_name, index));
                }
                _ => {}
            }
        }
    }

    for (table_name, index) in pending_indexes {
        match tables.iter_mut().find(|t| t.name == table_name) {
            Some(table) => table.indexes.push(index),
            None => warn!("索引 {} 引用了未定义的表 {}", index.name, table_name),
        }
    }

    info!("成功解析 {} 个表", tables.len());
    Ok(tables)
}

/// 以制表符缩进输出抽象架构文档
pub fn to_abstract_json(tables: &[ExpectedTable]) -> Result<String> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tables.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| DriftError::schema(format!("输出编码错误: {e}")))
}

fn strip_comments(sql: &str) -> Result<String> {
    let block = Regex::new(r"(?s)/\*.*?\*/")
        .map_err(|e| DriftError::custom(format!("正则表达式编译失败: {e}")))?;
    let line = Regex::new(r"(?m)--.*$")
        .map_err(|e| DriftError::custom(format!("正则表达式编译失败: {e}")))?;

    let without_block = block.replace_all(sql, " ");
    Ok(line.replace_all(&without_block, "").into_owned())
}

/// 按分号切分语句，忽略引号内的分号
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for ch in content.chars() {
        current.push(ch);
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escape_next = true,
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"' | '`') => quote = Some(ch),
            (None, ';') => {
                let statement = current.trim().trim_end_matches(';').trim().to_string();
                if !statement.is_empty() {
                    statements.push(statement);
                }
                current.clear();
            }
            _ => {}
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    debug!("提取到 {} 条 SQL 语句", statements.len());
    statements
}

/// 转换列定义，同时返回该列是否声明了行内主键
fn convert_column(column: &ColumnDef) -> (ExpectedColumn, bool) {
    let name = clean_ident(&column.name.to_string());
    let rendered = column.data_type.to_string().to_lowercase();
    let observed = parse_type_spec(&rendered);

    let mut options = ColumnOptions {
        notnull: Some(false),
        ..ColumnOptions::default()
    };
    if observed.unsigned {
        options.unsigned = Some(true);
    }

    let mut inline_pk = false;
    for option in &column.options {
        match &option.option {
            ColumnOption::NotNull => options.notnull = Some(true),
            ColumnOption::Null => options.notnull = Some(false),
            ColumnOption::Default(expr) => options.default = Some(convert_default(&expr.to_string())),
            ColumnOption::Unique { is_primary, .. } if *is_primary => {
                inline_pk = true;
                options.notnull = Some(true);
            }
            ColumnOption::DialectSpecific(tokens) => {
                let token_str = tokens
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_uppercase();
                if token_str.contains("AUTO_INCREMENT") {
                    options.autoincrement = Some(true);
                }
            }
            _ => {}
        }
    }

    let length = match &observed.size {
        Some(ColumnSize::Length(length)) => Some(*length),
        _ => None,
    };

    let declared_type = if name.contains("timestamp") {
        options.length = Some(14);
        DeclaredType::MwTimestamp
    } else {
        options.length = length;
        match &observed.base {
            EngineType::Int => DeclaredType::Integer,
            EngineType::VarBinary => DeclaredType::Binary,
            EngineType::Binary => {
                options.fixed = Some(true);
                DeclaredType::Binary
            }
            EngineType::VarChar => DeclaredType::String,
            EngineType::TinyInt => DeclaredType::MwTinyInt,
            EngineType::Timestamp => DeclaredType::Time,
            EngineType::Enum => {
                if let Some(ColumnSize::Members(members)) = &observed.size {
                    options.custom_schema_options = Some(CustomSchemaOptions {
                        enum_values: members.iter().cloned().collect(),
                        allow_infinite: None,
                    });
                }
                DeclaredType::MwEnum
            }
            EngineType::TinyBlob => {
                options.length = Some(255);
                DeclaredType::Blob
            }
            EngineType::MediumBlob => {
                options.length = Some(16777215);
                DeclaredType::Blob
            }
            EngineType::Other(token) if token == "bool" || token == "boolean" => {
                DeclaredType::Boolean
            }
            other => DeclaredType::from(other.as_str().to_string()),
        }
    };

    let expected = ExpectedColumn {
        name,
        declared_type,
        options,
        comment: None,
    };
    (expected, inline_pk)
}

/// 默认值：去掉引号，数字转为数值，`null` 转为空值
fn convert_default(raw: &str) -> serde_json::Value {
    let unquoted = raw.trim().trim_matches('\'').trim_matches('"');
    if raw.trim().eq_ignore_ascii_case("null") {
        return serde_json::Value::Null;
    }
    if let Ok(number) = unquoted.parse::<i64>() {
        return serde_json::Value::from(number);
    }
    serde_json::Value::String(unquoted.to_string())
}

fn apply_constraint(table: &mut ExpectedTable, constraint: &TableConstraint) {
    match constraint {
        TableConstraint::PrimaryKey { columns, .. } => {
            table.pk = Some(columns.iter().map(|c| clean_ident(&c.to_string())).collect());
        }
        TableConstraint::Unique {
            name,
            index_name,
            columns,
            ..
        } => match index_name.as_ref().or(name.as_ref()) {
            Some(name) => table.indexes.push(ExpectedIndex {
                name: clean_ident(&name.to_string()),
                columns: columns.iter().map(|c| clean_ident(&c.to_string())).collect(),
                unique: true,
                comment: None,
            }),
            None => debug!("跳过未命名的唯一约束: {}", table.name),
        },
        TableConstraint::Index { name, columns, .. } => match name {
            Some(name) => table.indexes.push(ExpectedIndex {
                name: clean_ident(&name.to_string()),
                columns: columns.iter().map(|c| clean_ident(&c.to_string())).collect(),
                unique: false,
                comment: None,
            }),
            // KEY(...) 没有索引名，无法与线上索引对应
            None => debug!("跳过未命名的索引: {}", table.name),
        },
        _ => {}
    }
}

/// 去掉标识符引号、前缀长度和排序方向，例如 `` `ar_title`(10) ASC `` -> `ar_title`
fn clean_ident(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .unwrap_or_default()
        .split('(')
        .next()
        .unwrap_or_default()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .to_lowercase()
}
