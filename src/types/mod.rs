//! 搜索条件类型定义
//!
//! 定义值对象、条件树、字段集、参数表以及配置相关类型

pub mod data_value;
pub mod values;
pub mod values_bag;
pub mod values_group;
pub mod field_set;
pub mod search_condition;
pub mod database_config;
pub mod parameters;
pub mod cache_config;

// 重新导出所有公共类型
pub use data_value::DataValue;
pub use values::{Compare, CompareOperator, PatternMatch, PatternMatchType, Range, SingleValue};
pub use values_bag::{ValuesBag, ValuesBagBuilder};
pub use values_group::{GroupLogical, ValuesGroup};
pub use field_set::{FieldDescriptor, FieldOptions, FieldSet, FieldSetBuilder, FieldType};
pub use search_condition::{SearchCondition, SearchPrimaryCondition};
pub use database_config::DatabaseType;
pub use parameters::{Parameter, ParameterTable, ParameterType};
pub use cache_config::{CacheConfig, CacheStrategy, L1CacheConfig, L2CacheConfig, TtlConfig};
