//! 字段解析模块
//!
//! 将字段集中的逻辑字段映射到后端列引用、参数类型和转换器

pub mod query_field;
pub mod resolver;

pub use query_field::{FieldMapping, QueryField};
pub use resolver::{ColumnResolver, FieldConfigBuilder, ResolvedColumn, ResolvedFields, TableColumnResolver};
