use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 代码中声明的逻辑列类型
///
/// 抽象架构文档使用与数据库引擎无关的逻辑类型，未知的类型标签原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    Integer,
    SmallInt,
    BigInt,
    String,
    Binary,
    Blob,
    Text,
    Boolean,
    Float,
    Decimal,
    Time,
    DateTimeTz,
    MwTinyInt,
    MwEnum,
    MwTimestamp,
    Other(std::string::String),
}

impl DeclaredType {
    pub fn as_str(&self) -> &str {
        match self {
            DeclaredType::Integer => "integer",
            DeclaredType::SmallInt => "smallint",
            DeclaredType::BigInt => "bigint",
            DeclaredType::String => "string",
            DeclaredType::Binary => "binary",
            DeclaredType::Blob => "blob",
            DeclaredType::Text => "text",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Float => "float",
            DeclaredType::Decimal => "decimal",
            DeclaredType::Time => "time",
            DeclaredType::DateTimeTz => "datetimetz",
            DeclaredType::MwTinyInt => "mwtinyint",
            DeclaredType::MwEnum => "mwenum",
            DeclaredType::MwTimestamp => "mwtimestamp",
            DeclaredType::Other(tag) => tag,
        }
    }
}

impl From<std::string::String> for DeclaredType {
    fn from(tag: std::string::String) -> Self {
        match tag.as_str() {
            "integer" => DeclaredType::Integer,
            "smallint" => DeclaredType::SmallInt,
            "bigint" => DeclaredType::BigInt,
            "string" => DeclaredType::String,
            "binary" => DeclaredType::Binary,
            "blob" => DeclaredType::Blob,
            "text" => DeclaredType::Text,
            "boolean" => DeclaredType::Boolean,
            "float" => DeclaredType::Float,
            "decimal" => DeclaredType::Decimal,
            "time" => DeclaredType::Time,
            "datetimetz" => DeclaredType::DateTimeTz,
            "mwtinyint" => DeclaredType::MwTinyInt,
            "mwenum" => DeclaredType::MwEnum,
            "mwtimestamp" => DeclaredType::MwTimestamp,
            _ => DeclaredType::Other(tag),
        }
    }
}

impl From<DeclaredType> for std::string::String {
    fn from(declared: DeclaredType) -> Self {
        match declared {
            DeclaredType::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 数据库引擎报告的原生类型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Float,
    Decimal,
    Binary,
    VarBinary,
    Char,
    VarChar,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    TinyText,
    Text,
    MediumText,
    LongText,
    Enum,
    Set,
    Date,
    Time,
    Datetime,
    Timestamp,
    Other(String),
}

impl EngineType {
    /// 从类型标记解析（大小写不敏感），`double` 与 `double precision` 视为 `float`
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "tinyint" => EngineType::TinyInt,
            "smallint" => EngineType::SmallInt,
            "mediumint" => EngineType::MediumInt,
            "int" => EngineType::Int,
            "bigint" => EngineType::BigInt,
            "float" | "double" | "double precision" => EngineType::Float,
            "decimal" => EngineType::Decimal,
            "binary" => EngineType::Binary,
            "varbinary" => EngineType::VarBinary,
            "char" => EngineType::Char,
            "varchar" => EngineType::VarChar,
            "tinyblob" => EngineType::TinyBlob,
            "blob" => EngineType::Blob,
            "mediumblob" => EngineType::MediumBlob,
            "longblob" => EngineType::LongBlob,
            "tinytext" => EngineType::TinyText,
            "text" => EngineType::Text,
            "mediumtext" => EngineType::MediumText,
            "longtext" => EngineType::LongText,
            "enum" => EngineType::Enum,
            "set" => EngineType::Set,
            "date" => EngineType::Date,
            "time" => EngineType::Time,
            "datetime" => EngineType::Datetime,
            "timestamp" => EngineType::Timestamp,
            _ => EngineType::Other(token),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EngineType::TinyInt => "tinyint",
            EngineType::SmallInt => "smallint",
            EngineType::MediumInt => "mediumint",
            EngineType::Int => "int",
            EngineType::BigInt => "bigint",
            EngineType::Float => "float",
            EngineType::Decimal => "decimal",
            EngineType::Binary => "binary",
            EngineType::VarBinary => "varbinary",
            EngineType::Char => "char",
            EngineType::VarChar => "varchar",
            EngineType::TinyBlob => "tinyblob",
            EngineType::Blob => "blob",
            EngineType::MediumBlob => "mediumblob",
            EngineType::LongBlob => "longblob",
            EngineType::TinyText => "tinytext",
            EngineType::Text => "text",
            EngineType::MediumText => "mediumtext",
            EngineType::LongText => "longtext",
            EngineType::Enum => "enum",
            EngineType::Set => "set",
            EngineType::Date => "date",
            EngineType::Time => "time",
            EngineType::Datetime => "datetime",
            EngineType::Timestamp => "timestamp",
            EngineType::Other(token) => token,
        }
    }

    /// 类型参数是否为成员列表而非长度
    pub fn has_members(&self) -> bool {
        matches!(self, EngineType::Enum | EngineType::Set)
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列的大小：长度，或枚举成员集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSize {
    Length(u64),
    Members(BTreeSet<String>),
}

impl ColumnSize {
    /// 是否真正声明了大小（长度为 0 或空成员集合都不参与比较）
    pub fn is_asserted(&self) -> bool {
        match self {
            ColumnSize::Length(length) => *length > 0,
            ColumnSize::Members(members) => !members.is_empty(),
        }
    }
}

/// 自定义架构选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomSchemaOptions {
    #[serde(
        default,
        rename = "enum_values",
        alias = "enumValues",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub enum_values: Vec<String>,
    #[serde(
        default,
        rename = "allowInfinite",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_infinite: Option<bool>,
}

/// 列选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notnull: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoincrement: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "CustomSchemaOptions",
        alias = "customSchemaOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_schema_options: Option<CustomSchemaOptions>,
}

/// 代码中声明的列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub options: ColumnOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// 代码中声明的索引，`unique` 缺省即非唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedIndex {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// 代码中声明的表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub columns: Vec<ExpectedColumn>,
    #[serde(default)]
    pub indexes: Vec<ExpectedIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<Vec<String>>,
}

/// 归一化后的列，与数据库引擎的报告方式一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedColumn {
    pub engine_type: EngineType,
    pub size: Option<ColumnSize>,
    pub not_null: bool,
    pub unsigned: bool,
    pub auto_increment: bool,
}

/// 线上列类型（在解析边界一次性拆解）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedType {
    pub base: EngineType,
    pub size: Option<ColumnSize>,
    pub unsigned: bool,
}

/// 线上列的可空标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Yes,
    No,
    Unknown,
}

impl Nullability {
    pub fn parse(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "yes" => Nullability::Yes,
            "no" => Nullability::No,
            _ => Nullability::Unknown,
        }
    }
}

/// 线上列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedColumn {
    pub name: String,
    pub raw_type: String,
    pub column_type: ObservedType,
    pub nullable: Nullability,
}

/// 线上索引，列顺序与引擎报告一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedIndex {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// 一张线上表的结构
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedTable {
    pub columns: Vec<ObservedColumn>,
    pub indexes: Vec<ObservedIndex>,
}

/// 漂移类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriftKind {
    FieldMismatchProdExtra,
    FieldMismatchCodebaseExtra,
    FieldSizeMismatch,
    FieldUnsignedMismatch,
    FieldTypeMismatch,
    FieldNullableMismatch,
    PrimaryKeyMismatch,
    IndexMismatchProdExtra,
    IndexMismatchCodeExtra,
    IndexUniquenessMismatch,
    IndexColumnsMismatch,
}

impl DriftKind {
    pub const ALL: [DriftKind; 11] = [
        DriftKind::FieldMismatchProdExtra,
        DriftKind::FieldMismatchCodebaseExtra,
        DriftKind::FieldSizeMismatch,
        DriftKind::FieldUnsignedMismatch,
        DriftKind::FieldTypeMismatch,
        DriftKind::FieldNullableMismatch,
        DriftKind::PrimaryKeyMismatch,
        DriftKind::IndexMismatchProdExtra,
        DriftKind::IndexMismatchCodeExtra,
        DriftKind::IndexUniquenessMismatch,
        DriftKind::IndexColumnsMismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftKind::FieldMismatchProdExtra => "field-mismatch-prod-extra",
            DriftKind::FieldMismatchCodebaseExtra => "field-mismatch-codebase-extra",
            DriftKind::FieldSizeMismatch => "field-size-mismatch",
            DriftKind::FieldUnsignedMismatch => "field-unsigned-mismatch",
            DriftKind::FieldTypeMismatch => "field-type-mismatch",
            DriftKind::FieldNullableMismatch => "field-nullable-mismatch",
            DriftKind::PrimaryKeyMismatch => "primary-key-mismatch",
            DriftKind::IndexMismatchProdExtra => "index-mismatch-prod-extra",
            DriftKind::IndexMismatchCodeExtra => "index-mismatch-code-extra",
            DriftKind::IndexUniquenessMismatch => "index-uniqueness-mismatch",
            DriftKind::IndexColumnsMismatch => "index-columns-mismatch",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }

    /// 结构性漂移：缺失/多余的列和索引、类型不一致、主键不一致
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            DriftKind::FieldMismatchProdExtra
                | DriftKind::FieldMismatchCodebaseExtra
                | DriftKind::FieldTypeMismatch
                | DriftKind::PrimaryKeyMismatch
                | DriftKind::IndexMismatchProdExtra
                | DriftKind::IndexMismatchCodeExtra
        )
    }

    /// 报告标题模板，`{table}` 与 `{element}` 会被替换
    pub fn title_template(&self) -> &'static str {
        match self {
            DriftKind::FieldMismatchProdExtra => "Extra field {table}.{element} in production",
            DriftKind::FieldMismatchCodebaseExtra => "Extra field {table}.{element} in code",
            DriftKind::FieldSizeMismatch => "Mismatching field size of {table}.{element}",
            DriftKind::FieldUnsignedMismatch => {
                "Mismatching field unsigned status of {table}.{element}"
            }
            DriftKind::FieldTypeMismatch => "Mismatching field type of {table}.{element}",
            DriftKind::FieldNullableMismatch => {
                "Mismatching field nullability of {table}.{element}"
            }
            DriftKind::PrimaryKeyMismatch => "Mismatching primary key on table {table}",
            DriftKind::IndexMismatchProdExtra => {
                "Extra index {element} in production on table {table}"
            }
            DriftKind::IndexMismatchCodeExtra => "Extra index {element} in codebase on table {table}",
            DriftKind::IndexUniquenessMismatch => {
                "Mismatching uniqueness of index {element} on table {table}"
            }
            DriftKind::IndexColumnsMismatch => {
                "Mismatching columns of index {element} on table {table}"
            }
        }
    }
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 巡检目标：分片、主机、数据库
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub section: String,
    pub host: String,
    pub database: String,
}

impl Target {
    pub fn new(
        section: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            host: host.into(),
            database: database.into(),
        }
    }

    /// 记录在漂移结果中的 `host:database` 形式
    pub fn location(&self) -> String {
        format!("{}:{}", self.host, self.database)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.location())
    }
}

/// 单张表上的一条漂移，尚未绑定巡检目标
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Drift {
    pub kind: DriftKind,
    pub table: String,
    pub element: String,
}

impl Drift {
    pub fn new(kind: DriftKind, table: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            element: element.into(),
        }
    }

    /// 漂移结果中的合成键 `<table> <element> <kind>`
    pub fn key(&self) -> String {
        format!("{} {} {}", self.table, self.element, self.kind)
    }

    pub fn at(self, target: &Target) -> DriftFinding {
        DriftFinding {
            kind: self.kind,
            table: self.table,
            element: self.element,
            target: target.clone(),
        }
    }
}

/// 已绑定巡检目标的漂移发现
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriftFinding {
    pub kind: DriftKind,
    pub table: String,
    pub element: String,
    pub target: Target,
}

impl DriftFinding {
    pub fn key(&self) -> String {
        format!("{} {} {}", self.table, self.element, self.kind)
    }
}
