use super::normalizer::Normalize;
use super::types::{
    ColumnSize, Drift, DriftKind, ExpectedColumn, ExpectedTable, Nullability, ObservedColumn,
    ObservedIndex, ObservedTable,
};
use crate::constants::compare::{FULLTEXT_SEARCH_TABLE, PRIMARY_INDEX};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 比较选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// 只报告结构性漂移（见 [`DriftKind::is_important`]）
    #[serde(default)]
    pub important_only: bool,
    /// 额外跳过的表，全文检索表总是跳过
    #[serde(default)]
    pub skip_tables: Vec<String>,
}

/// 表结构比较器
#[derive(Debug, Clone, Default)]
pub struct TableComparator {
    options: CompareOptions,
}

impl TableComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// 是否跳过该表
    pub fn should_skip(&self, table: &str) -> bool {
        table == FULLTEXT_SEARCH_TABLE || self.options.skip_tables.iter().any(|t| t == table)
    }

    /// 比较一张表，返回按发现顺序排列的漂移
    pub fn compare_table(&self, expected: &ExpectedTable, observed: &ObservedTable) -> Vec<Drift> {
        self.compare(expected, &observed.columns, &observed.indexes)
    }

    /// 比较代码中声明的表与线上的列和索引
    pub fn compare(
        &self,
        expected: &ExpectedTable,
        columns: &[ObservedColumn],
        indexes: &[ObservedIndex],
    ) -> Vec<Drift> {
        if self.should_skip(&expected.name) {
            debug!("跳过表: {}", expected.name);
            return Vec::new();
        }

        let mut collector = DriftCollector::new(&expected.name, self.options.important_only);
        compare_columns(&mut collector, expected, columns);
        compare_indexes(&mut collector, expected, indexes);
        collector.drifts
    }
}

/// 使用默认选项比较一张表
pub fn compare_table(expected: &ExpectedTable, observed: &ObservedTable) -> Vec<Drift> {
    TableComparator::default().compare_table(expected, observed)
}

/// 收集单张表上的漂移
struct DriftCollector<'a> {
    table: &'a str,
    important_only: bool,
    drifts: Vec<Drift>,
}

impl<'a> DriftCollector<'a> {
    fn new(table: &'a str, important_only: bool) -> Self {
        Self {
            table,
            important_only,
            drifts: Vec::new(),
        }
    }

    fn check(&mut self, kind: DriftKind, element: &str, mismatch: bool) {
        if !mismatch || (self.important_only && !kind.is_important()) {
            return;
        }
        self.drifts.push(Drift::new(kind, self.table, element));
    }
}

fn compare_columns(
    collector: &mut DriftCollector<'_>,
    expected: &ExpectedTable,
    columns: &[ObservedColumn],
) {
    for observed in columns {
        match expected.columns.iter().find(|c| c.name == observed.name) {
            Some(declared) => compare_column(collector, declared, observed),
            None => collector.check(DriftKind::FieldMismatchProdExtra, &observed.name, true),
        }
    }

    for declared in &expected.columns {
        let missing = !columns.iter().any(|c| c.name == declared.name);
        collector.check(DriftKind::FieldMismatchCodebaseExtra, &declared.name, missing);
    }
}

fn compare_column(
    collector: &mut DriftCollector<'_>,
    declared: &ExpectedColumn,
    observed: &ObservedColumn,
) {
    let expected = declared.normalize();
    let actual = &observed.column_type;
    let name = observed.name.as_str();

    if let (Some(want), Some(got)) = (&expected.size, &actual.size) {
        if want.is_asserted() && got.is_asserted() {
            collector.check(DriftKind::FieldSizeMismatch, name, !same_size(want, got));
        }
    }

    collector.check(
        DriftKind::FieldUnsignedMismatch,
        name,
        expected.unsigned != actual.unsigned,
    );

    collector.check(
        DriftKind::FieldTypeMismatch,
        name,
        expected.engine_type != actual.base,
    );

    let nullable_mismatch = match observed.nullable {
        Nullability::No => !expected.not_null,
        Nullability::Yes => expected.not_null,
        Nullability::Unknown => false,
    };
    collector.check(DriftKind::FieldNullableMismatch, name, nullable_mismatch);
}

/// 长度按整数比较，枚举按成员集合比较，两者混用视为不一致
fn same_size(want: &ColumnSize, got: &ColumnSize) -> bool {
    match (want, got) {
        (ColumnSize::Length(a), ColumnSize::Length(b)) => a == b,
        (ColumnSize::Members(a), ColumnSize::Members(b)) => a == b,
        _ => false,
    }
}

fn is_primary(name: &str) -> bool {
    name.eq_ignore_ascii_case(PRIMARY_INDEX)
}

fn compare_indexes(
    collector: &mut DriftCollector<'_>,
    expected: &ExpectedTable,
    indexes: &[ObservedIndex],
) {
    for observed in indexes {
        if is_primary(&observed.name) {
            let mismatch = expected.pk.as_deref() != Some(observed.columns.as_slice());
            collector.check(DriftKind::PrimaryKeyMismatch, &observed.name, mismatch);
            continue;
        }

        let Some(declared) = expected.indexes.iter().find(|i| i.name == observed.name) else {
            collector.check(DriftKind::IndexMismatchProdExtra, &observed.name, true);
            continue;
        };

        collector.check(
            DriftKind::IndexUniquenessMismatch,
            &observed.name,
            observed.unique != declared.unique,
        );
        collector.check(
            DriftKind::IndexColumnsMismatch,
            &observed.name,
            observed.columns != declared.columns,
        );
    }

    for declared in &expected.indexes {
        if is_primary(&declared.name) {
            continue;
        }
        let missing = !indexes.iter().any(|i| i.name == declared.name);
        collector.check(DriftKind::IndexMismatchCodeExtra, &declared.name, missing);
    }
}
