//! 全局管理模块
//!
//! 按名称登记字段集，供查询解析层查找

pub mod field_set_registry;

pub use field_set_registry::{
    get_all_registered_field_sets, get_field_set, register_field_set, require_field_set,
};
