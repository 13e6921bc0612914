//! 参数表
//!
//! 编译产生的占位符 -> (值, 类型) 有序映射，同时也是缓存快照的一部分

use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};

/// 参数绑定类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    Integer,
    BigInteger,
    Float,
    Boolean,
    Date,
    DateTime,
    Uuid,
    Binary,
    Null,
}

impl ParameterType {
    /// 类型标记字符串（用于缓存键编码和日志）
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::BigInteger => "bigint",
            ParameterType::Float => "float",
            ParameterType::Boolean => "boolean",
            ParameterType::Date => "date",
            ParameterType::DateTime => "datetime",
            ParameterType::Uuid => "uuid",
            ParameterType::Binary => "binary",
            ParameterType::Null => "null",
        }
    }

    /// 根据值推断参数类型
    pub fn infer(value: &DataValue) -> Self {
        match value {
            DataValue::Null => ParameterType::Null,
            DataValue::Bool(_) => ParameterType::Boolean,
            DataValue::Int(_) => ParameterType::Integer,
            DataValue::UInt(_) => ParameterType::BigInteger,
            DataValue::Float(_) => ParameterType::Float,
            DataValue::String(_) => ParameterType::String,
            DataValue::Bytes(_) => ParameterType::Binary,
            DataValue::Date(_) => ParameterType::Date,
            DataValue::DateTime(_) | DataValue::DateTimeUTC(_) => ParameterType::DateTime,
            DataValue::Uuid(_) => ParameterType::Uuid,
        }
    }
}

/// 单个绑定参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: DataValue,
    pub param_type: ParameterType,
}

/// 有序参数表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTable {
    entries: Vec<Parameter>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加参数，同名参数会被覆盖并保留原位置
    pub fn insert(&mut self, name: impl Into<String>, value: DataValue, param_type: ParameterType) {
        let name = name.into();
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.param_type = param_type;
            }
            None => self.entries.push(Parameter {
                name,
                value,
                param_type,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.entries.iter()
    }

    /// 按插入顺序返回占位符名称
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterTable {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut table = ParameterTable::new();
        table.insert("b_0", DataValue::Int(2), ParameterType::Integer);
        table.insert("a_0", DataValue::Int(1), ParameterType::Integer);
        table.insert("b_0", DataValue::Int(3), ParameterType::Integer);

        assert_eq!(table.names(), vec!["b_0", "a_0"]);
        assert_eq!(table.get("b_0").unwrap().value, DataValue::Int(3));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(ParameterType::infer(&DataValue::from("x")), ParameterType::String);
        assert_eq!(ParameterType::infer(&DataValue::Null), ParameterType::Null);
        assert_eq!(ParameterType::infer(&DataValue::Float(1.5)), ParameterType::Float);
    }
}
