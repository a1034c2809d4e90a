use super::types::{
    ColumnSize, EngineType, Nullability, ObservedColumn, ObservedIndex, ObservedTable, ObservedType,
};
use crate::constants::introspection::{DESCRIBE_HEADER, ERROR_MARKER, INDEX_HEADER};
use std::collections::BTreeSet;
use tracing::debug;

/// 巡检输出中的两段：DESCRIBE 与 SHOW INDEX
#[derive(Debug, Default)]
pub struct IntrospectionSections<'a> {
    pub describe: Vec<&'a str>,
    pub indexes: Vec<&'a str>,
}

impl ObservedTable {
    /// 解析一次巡检命令的完整输出
    ///
    /// 出现错误行或没有任何列时返回 `None`，表示该表“无数据”，
    /// 而不是把所有列都报告成代码中多余的列。
    pub fn from_output<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        let sections = split_sections(lines)?;
        let columns = parse_columns(&sections.describe)?;
        if columns.is_empty() {
            return None;
        }
        let indexes = parse_indexes(&sections.indexes)?;
        Some(Self { columns, indexes })
    }
}

/// 按表头把输出拆成两段；表头之前的行归入 DESCRIBE 段
pub fn split_sections<S: AsRef<str>>(lines: &[S]) -> Option<IntrospectionSections<'_>> {
    let mut sections = IntrospectionSections::default();
    let mut in_indexes = false;

    for line in lines {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        if is_error_row(line) {
            return None;
        }
        if line.starts_with(DESCRIBE_HEADER) {
            in_indexes = false;
        } else if line.starts_with(INDEX_HEADER) {
            in_indexes = true;
        }
        if in_indexes {
            sections.indexes.push(line);
        } else {
            sections.describe.push(line);
        }
    }

    Some(sections)
}

/// 解析 DESCRIBE 风格的行：name, type, null, ...
pub fn parse_columns<S: AsRef<str>>(lines: &[S]) -> Option<Vec<ObservedColumn>> {
    let mut columns = Vec::new();

    for line in lines {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        if is_error_row(line) {
            return None;
        }
        if line.starts_with(DESCRIBE_HEADER) {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            debug!("跳过格式异常的列定义行: {}", line);
            continue;
        }

        let raw_type = fields[1].trim().to_lowercase();
        columns.push(ObservedColumn {
            name: fields[0].to_string(),
            column_type: parse_type_spec(&raw_type),
            raw_type,
            nullable: Nullability::parse(fields[2]),
        });
    }

    Some(columns)
}

/// 解析 SHOW INDEX 风格的行：table, non_unique, key_name, seq, column, ...
///
/// 同名索引的多行合并为一个索引，唯一性以第一行为准，列按行顺序追加。
pub fn parse_indexes<S: AsRef<str>>(lines: &[S]) -> Option<Vec<ObservedIndex>> {
    let mut indexes: Vec<ObservedIndex> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        if is_error_row(line) {
            return None;
        }
        if line.starts_with(INDEX_HEADER) {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            debug!("跳过格式异常的索引行: {}", line);
            continue;
        }

        let name = fields[2];
        let column = fields[4].to_string();
        match indexes.iter_mut().find(|index| index.name == name) {
            Some(index) => index.columns.push(column),
            None => indexes.push(ObservedIndex {
                name: name.to_string(),
                unique: fields[1].trim() == "0",
                columns: vec![column],
            }),
        }
    }

    Some(indexes)
}

/// 拆解线上类型描述，例如 `varbinary(32)`、`int(10) unsigned`、`enum('a','b')`
///
/// 括号缺失或内容无法识别时视为未声明大小，不会报错。
pub fn parse_type_spec(raw: &str) -> ObservedType {
    let raw = raw.trim().to_lowercase();
    let head = raw.split('(').next().unwrap_or_default();
    let base = EngineType::parse(head.split_whitespace().next().unwrap_or_default());

    let (size, tail) = match (raw.find('('), raw.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let inner = &raw[open + 1..close];
            let size = if base.has_members() {
                Some(ColumnSize::Members(parse_members(inner)))
            } else {
                inner.trim().parse::<u64>().ok().map(ColumnSize::Length)
            };
            (size, &raw[close + 1..])
        }
        _ => (None, raw.as_str()),
    };

    ObservedType {
        base,
        size,
        unsigned: tail.split_whitespace().any(|token| token == "unsigned"),
    }
}

/// 解析 `'a','b'` 形式的成员列表，支持 `''` 转义
fn parse_members(inner: &str) -> BTreeSet<String> {
    let mut members = BTreeSet::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        let state = quote;
        match state {
            Some(q) if ch == q => {
                if chars.peek() == Some(&q) {
                    current.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                ',' => {
                    members.insert(std::mem::take(&mut current));
                }
                c if c.is_whitespace() => {}
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() || !members.is_empty() {
        members.insert(current);
    }

    members
}

/// 数据库客户端的错误行，例如 `ERROR 1146 (42S02) at line 1: ...`
///
/// 错误信息不含制表符，借此与名为 `ERROR` 的列区分开。
fn is_error_row(line: &str) -> bool {
    line.starts_with(ERROR_MARKER) && !line.contains('\t')
}
