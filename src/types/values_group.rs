//! 条件树
//!
//! `ValuesGroup` 保存有序的 字段名 -> 值集合 映射以及子组，组内字段按组的逻辑操作符组合，
//! 子组之间始终以 OR 组合

use crate::types::values_bag::ValuesBag;
use serde::{Deserialize, Serialize};

/// 组逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupLogical {
    /// AND 逻辑
    And,
    /// OR 逻辑
    Or,
}

impl GroupLogical {
    /// 获取 SQL 连接符
    pub fn as_sql(&self) -> &'static str {
        match self {
            GroupLogical::And => " AND ",
            GroupLogical::Or => " OR ",
        }
    }
}

impl Default for GroupLogical {
    fn default() -> Self {
        GroupLogical::And
    }
}

/// 条件组
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValuesGroup {
    fields: Vec<(String, ValuesBag)>,
    groups: Vec<ValuesGroup>,
    logical: GroupLogical,
    errors: bool,
}

impl ValuesGroup {
    /// 创建新的条件组
    pub fn new(logical: GroupLogical) -> Self {
        Self {
            fields: Vec::new(),
            groups: Vec::new(),
            logical,
            errors: false,
        }
    }

    /// 设置字段值集合
    ///
    /// 字段名在组内唯一，重复设置时替换原值并保持原位置
    pub fn add_field(&mut self, name: impl Into<String>, values: ValuesBag) -> &mut Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = values,
            None => self.fields.push((name, values)),
        }
        self
    }

    /// 链式设置字段
    pub fn with_field(mut self, name: impl Into<String>, values: ValuesBag) -> Self {
        self.add_field(name, values);
        self
    }

    /// 添加子组
    pub fn add_group(&mut self, group: ValuesGroup) -> &mut Self {
        self.groups.push(group);
        self
    }

    /// 链式添加子组
    pub fn with_group(mut self, group: ValuesGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn field(&self, name: &str) -> Option<&ValuesBag> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, bag)| bag)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// 按声明顺序返回所有字段
    pub fn fields(&self) -> &[(String, ValuesBag)] {
        &self.fields
    }

    pub fn groups(&self) -> &[ValuesGroup] {
        &self.groups
    }

    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn logical(&self) -> GroupLogical {
        self.logical
    }

    pub fn has_errors(&self) -> bool {
        self.errors
    }

    pub fn set_errors(&mut self, errors: bool) {
        self.errors = errors;
    }

    /// 统计含有值的字段数（不含子组）
    pub fn count_value_fields(&self) -> usize {
        self.fields.iter().filter(|(_, bag)| !bag.is_empty()).count()
    }

    /// 没有字段也没有子组
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::values::SingleValue;

    fn bag(value: i64) -> ValuesBag {
        ValuesBag::builder().add_simple_value(SingleValue::new(value)).build()
    }

    #[test]
    fn test_field_replacement_keeps_position() {
        let mut group = ValuesGroup::new(GroupLogical::Or)
            .with_field("a", bag(1))
            .with_field("b", bag(2));
        group.add_field("a", bag(3));

        let names: Vec<&str> = group.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            group.field("a").unwrap().simple_values()[0].value(),
            &crate::types::DataValue::Int(3)
        );
    }

    #[test]
    fn test_empty_and_counts() {
        let group = ValuesGroup::default();
        assert!(group.is_empty());
        assert_eq!(group.logical(), GroupLogical::And);

        let group = ValuesGroup::new(GroupLogical::And)
            .with_field("a", ValuesBag::builder().build())
            .with_field("b", bag(1))
            .with_group(ValuesGroup::default());
        assert!(!group.is_empty());
        assert_eq!(group.count_value_fields(), 1);
        assert!(group.has_groups());
    }
}
