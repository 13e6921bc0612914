//! 字段集注册表模块
//!
//! 提供全局的字段集名称到字段集定义的映射，供外部解析器按名称查找

use crate::error::QuickSearchResult;
use crate::types::FieldSet;
use rat_logger::debug;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// 字段集的全局注册表
static FIELD_SET_REGISTRY: OnceLock<RwLock<HashMap<String, Arc<FieldSet>>>> = OnceLock::new();

/// 注册字段集，同名字段集会被替换
pub fn register_field_set(field_set: FieldSet) -> QuickSearchResult<Arc<FieldSet>> {
    let registry = FIELD_SET_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()));
    let mut map = registry
        .write()
        .map_err(|_| crate::quick_error!(config, "字段集注册表锁被污染"))?;

    let field_set = Arc::new(field_set);
    if map
        .insert(field_set.name().to_string(), Arc::clone(&field_set))
        .is_some()
    {
        debug!("替换已注册的字段集: {}", field_set.name());
    }
    Ok(field_set)
}

/// 通过名称获取字段集
pub fn get_field_set(name: &str) -> Option<Arc<FieldSet>> {
    let registry = FIELD_SET_REGISTRY.get()?;
    let map = registry.read().ok()?;
    map.get(name).cloned()
}

/// 通过名称获取字段集，未注册时返回配置错误
pub fn require_field_set(name: &str) -> QuickSearchResult<Arc<FieldSet>> {
    get_field_set(name)
        .ok_or_else(|| crate::quick_error!(config, format!("字段集 '{}' 未注册", name)))
}

/// 获取所有已注册的字段集名称
pub fn get_all_registered_field_sets() -> Vec<String> {
    let Some(registry) = FIELD_SET_REGISTRY.get() else {
        return Vec::new();
    };
    match registry.read() {
        Ok(map) => {
            let mut names: Vec<String> = map.keys().cloned().collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDescriptor, FieldType};

    #[test]
    fn test_field_set_registry() {
        let users = FieldSet::builder("registry_users")
            .add(FieldDescriptor::new("id", FieldType::Integer))
            .build()
            .unwrap();
        let orders = FieldSet::builder("registry_orders")
            .add(FieldDescriptor::new("total", FieldType::Float))
            .build()
            .unwrap();

        register_field_set(users).unwrap();
        register_field_set(orders).unwrap();

        let found = get_field_set("registry_users").unwrap();
        assert!(found.has("id"));
        assert!(get_field_set("nonexistent").is_none());
        assert!(require_field_set("nonexistent").is_err());

        let names = get_all_registered_field_sets();
        assert!(names.contains(&"registry_users".to_string()));
        assert!(names.contains(&"registry_orders".to_string()));
    }

    #[test]
    fn test_register_replaces_existing() {
        let first = FieldSet::builder("registry_replace")
            .add(FieldDescriptor::new("a", FieldType::String))
            .build()
            .unwrap();
        let second = FieldSet::builder("registry_replace")
            .add(FieldDescriptor::new("b", FieldType::String))
            .build()
            .unwrap();

        register_field_set(first).unwrap();
        register_field_set(second).unwrap();

        let found = require_field_set("registry_replace").unwrap();
        assert!(found.has("b"));
        assert!(!found.has("a"));
    }
}
