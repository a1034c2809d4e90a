// 模块声明
mod introspector;
mod schema_source;

// 重新导出公共API
pub use introspector::{CommandIntrospector, HostAddress, Introspector};
pub use schema_source::{HttpSchemaSource, LocalSchemaSource, SchemaSource, schema_source_from_config};
