use super::types::{ColumnSize, DeclaredType, EngineType, ExpectedColumn, NormalizedColumn};
use std::collections::BTreeSet;

/// 转换为与数据库引擎报告方式一致的列定义
pub trait Normalize {
    fn normalize(&self) -> NormalizedColumn;
}

impl Normalize for ExpectedColumn {
    fn normalize(&self) -> NormalizedColumn {
        normalize(self)
    }
}

/// 已经是引擎类型，不再做任何改写
impl Normalize for NormalizedColumn {
    fn normalize(&self) -> NormalizedColumn {
        self.clone()
    }
}

/// 归一化代码中声明的列
///
/// 逻辑类型到引擎类型的映射依赖上下文：长度区间、枚举成员、无限时间戳等。
pub fn normalize(column: &ExpectedColumn) -> NormalizedColumn {
    let options = &column.options;
    let custom = options.custom_schema_options.as_ref();
    let length = options.length.unwrap_or(0);

    let mut size = Some(ColumnSize::Length(length)).filter(ColumnSize::is_asserted);

    let engine_type = match &column.declared_type {
        // string 先改写为 binary，未声明定长则提升为 varbinary
        DeclaredType::String | DeclaredType::Binary => {
            if options.fixed.unwrap_or(false) {
                EngineType::Binary
            } else {
                EngineType::VarBinary
            }
        }
        DeclaredType::Integer => EngineType::Int,
        DeclaredType::Blob | DeclaredType::Text => blob_bucket(length)
            .unwrap_or_else(|| EngineType::parse(column.declared_type.as_str())),
        DeclaredType::MwTinyInt => EngineType::TinyInt,
        DeclaredType::MwEnum => {
            let members: BTreeSet<String> = custom
                .map(|c| c.enum_values.iter().map(|v| v.to_lowercase()).collect())
                .unwrap_or_default();
            size = Some(ColumnSize::Members(members));
            EngineType::Enum
        }
        DeclaredType::MwTimestamp => {
            size = Some(ColumnSize::Length(14));
            if custom.and_then(|c| c.allow_infinite).unwrap_or(false) {
                EngineType::VarBinary
            } else {
                EngineType::Binary
            }
        }
        DeclaredType::DateTimeTz => EngineType::Timestamp,
        other => EngineType::parse(other.as_str()),
    };

    NormalizedColumn {
        engine_type,
        size,
        not_null: options.notnull.unwrap_or(false),
        unsigned: options.unsigned.unwrap_or(false),
        auto_increment: options.autoincrement.unwrap_or(false),
    }
}

/// blob/text 按长度落入对应的存储类型，超过 mediumblob 的保持声明值
fn blob_bucket(length: u64) -> Option<EngineType> {
    match length {
        0..256 => Some(EngineType::TinyBlob),
        256..65536 => Some(EngineType::Blob),
        65536..16777216 => Some(EngineType::MediumBlob),
        _ => None,
    }
}
