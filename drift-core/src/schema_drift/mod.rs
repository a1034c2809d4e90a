mod abstractor;
mod comparator;
mod normalizer;
mod parser;
mod types;


// 重新导出公共接口
pub use abstractor::{parse_sql_schema, to_abstract_json};
pub use comparator::{CompareOptions, TableComparator, compare_table};
pub use normalizer::{Normalize, normalize};
pub use parser::{IntrospectionSections, parse_columns, parse_indexes, parse_type_spec, split_sections};
pub use types::{
    ColumnOptions, ColumnSize, CustomSchemaOptions, DeclaredType, Drift, DriftFinding, DriftKind,
    EngineType, ExpectedColumn, ExpectedIndex, ExpectedTable, NormalizedColumn, Nullability,
    ObservedColumn, ObservedIndex, ObservedTable, ObservedType, Target,
};
