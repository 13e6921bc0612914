//! 搜索条件
//!
//! 字段集 + 条件树，以及可选的主条件（先于主体条件编译并以 AND 合并）

use crate::types::field_set::FieldSet;
use crate::types::values_group::ValuesGroup;
use std::sync::Arc;

/// 主条件
///
/// 与主体条件共享字段集，单独计算缓存键以便在不同查询间复用
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPrimaryCondition {
    values_group: ValuesGroup,
}

impl SearchPrimaryCondition {
    pub fn new(values_group: ValuesGroup) -> Self {
        Self { values_group }
    }

    pub fn values_group(&self) -> &ValuesGroup {
        &self.values_group
    }
}

/// 搜索条件
#[derive(Debug, Clone)]
pub struct SearchCondition {
    field_set: Arc<FieldSet>,
    values_group: ValuesGroup,
    primary_condition: Option<SearchPrimaryCondition>,
}

impl SearchCondition {
    pub fn new(field_set: Arc<FieldSet>, values_group: ValuesGroup) -> Self {
        Self {
            field_set,
            values_group,
            primary_condition: None,
        }
    }

    /// 设置主条件
    pub fn with_primary_condition(mut self, primary: SearchPrimaryCondition) -> Self {
        self.primary_condition = Some(primary);
        self
    }

    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    pub fn values_group(&self) -> &ValuesGroup {
        &self.values_group
    }

    pub fn primary_condition(&self) -> Option<&SearchPrimaryCondition> {
        self.primary_condition.as_ref()
    }

    /// 条件树是否带有输入错误标记
    pub fn is_invalid(&self) -> bool {
        self.values_group.has_errors()
    }
}
