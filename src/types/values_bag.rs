//! 单个字段的值集合
//!
//! 输入处理阶段使用 `ValuesBagBuilder` 收集值，调用 `build()` 后得到不可变的 `ValuesBag`

use crate::error::QuickSearchResult;
use crate::types::values::{Compare, PatternMatch, Range, SingleValue};
use serde::{Deserialize, Serialize};

/// 字段值集合构建器
#[derive(Debug, Clone, Default)]
pub struct ValuesBagBuilder {
    simple_values: Vec<SingleValue>,
    excluded_simple_values: Vec<SingleValue>,
    ranges: Vec<Range>,
    excluded_ranges: Vec<Range>,
    comparisons: Vec<Compare>,
    pattern_matchers: Vec<PatternMatch>,
    value_count: usize,
}

/// 从列表中按索引移除元素，越界时返回 BadMethodCall
fn remove_at<T>(list: &mut Vec<T>, index: usize, kind: &str) -> QuickSearchResult<T> {
    if index >= list.len() {
        return Err(crate::quick_error!(
            bad_method_call,
            format!("{} 索引 {} 越界（共 {} 个）", kind, index, list.len())
        ));
    }
    Ok(list.remove(index))
}

impl ValuesBagBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_simple_value(mut self, value: SingleValue) -> Self {
        self.simple_values.push(value);
        self.value_count += 1;
        self
    }

    pub fn add_excluded_simple_value(mut self, value: SingleValue) -> Self {
        self.excluded_simple_values.push(value);
        self.value_count += 1;
        self
    }

    pub fn add_range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self.value_count += 1;
        self
    }

    pub fn add_excluded_range(mut self, range: Range) -> Self {
        self.excluded_ranges.push(range);
        self.value_count += 1;
        self
    }

    pub fn add_comparison(mut self, compare: Compare) -> Self {
        self.comparisons.push(compare);
        self.value_count += 1;
        self
    }

    pub fn add_pattern_match(mut self, pattern: PatternMatch) -> Self {
        self.pattern_matchers.push(pattern);
        self.value_count += 1;
        self
    }

    pub fn remove_simple_value(&mut self, index: usize) -> QuickSearchResult<SingleValue> {
        let removed = remove_at(&mut self.simple_values, index, "simple_values")?;
        self.value_count -= 1;
        Ok(removed)
    }

    pub fn remove_excluded_simple_value(&mut self, index: usize) -> QuickSearchResult<SingleValue> {
        let removed = remove_at(&mut self.excluded_simple_values, index, "excluded_simple_values")?;
        self.value_count -= 1;
        Ok(removed)
    }

    pub fn remove_range(&mut self, index: usize) -> QuickSearchResult<Range> {
        let removed = remove_at(&mut self.ranges, index, "ranges")?;
        self.value_count -= 1;
        Ok(removed)
    }

    pub fn remove_excluded_range(&mut self, index: usize) -> QuickSearchResult<Range> {
        let removed = remove_at(&mut self.excluded_ranges, index, "excluded_ranges")?;
        self.value_count -= 1;
        Ok(removed)
    }

    pub fn remove_comparison(&mut self, index: usize) -> QuickSearchResult<Compare> {
        let removed = remove_at(&mut self.comparisons, index, "comparisons")?;
        self.value_count -= 1;
        Ok(removed)
    }

    pub fn remove_pattern_match(&mut self, index: usize) -> QuickSearchResult<PatternMatch> {
        let removed = remove_at(&mut self.pattern_matchers, index, "pattern_matchers")?;
        self.value_count -= 1;
        Ok(removed)
    }

    /// 当前值总数
    pub fn count(&self) -> usize {
        self.value_count
    }

    /// 锁定为不可变的值集合
    pub fn build(self) -> ValuesBag {
        ValuesBag {
            simple_values: self.simple_values,
            excluded_simple_values: self.excluded_simple_values,
            ranges: self.ranges,
            excluded_ranges: self.excluded_ranges,
            comparisons: self.comparisons,
            pattern_matchers: self.pattern_matchers,
            value_count: self.value_count,
        }
    }
}

/// 不可变的字段值集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesBag {
    simple_values: Vec<SingleValue>,
    excluded_simple_values: Vec<SingleValue>,
    ranges: Vec<Range>,
    excluded_ranges: Vec<Range>,
    comparisons: Vec<Compare>,
    pattern_matchers: Vec<PatternMatch>,
    value_count: usize,
}

impl ValuesBag {
    /// 创建值集合构建器
    pub fn builder() -> ValuesBagBuilder {
        ValuesBagBuilder::new()
    }

    pub fn simple_values(&self) -> &[SingleValue] {
        &self.simple_values
    }

    pub fn excluded_simple_values(&self) -> &[SingleValue] {
        &self.excluded_simple_values
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn excluded_ranges(&self) -> &[Range] {
        &self.excluded_ranges
    }

    pub fn comparisons(&self) -> &[Compare] {
        &self.comparisons
    }

    pub fn pattern_matchers(&self) -> &[PatternMatch] {
        &self.pattern_matchers
    }

    pub fn has_simple_values(&self) -> bool {
        !self.simple_values.is_empty()
    }

    pub fn has_excluded_simple_values(&self) -> bool {
        !self.excluded_simple_values.is_empty()
    }

    pub fn has_ranges(&self) -> bool {
        !self.ranges.is_empty()
    }

    pub fn has_excluded_ranges(&self) -> bool {
        !self.excluded_ranges.is_empty()
    }

    pub fn has_comparisons(&self) -> bool {
        !self.comparisons.is_empty()
    }

    pub fn has_pattern_matchers(&self) -> bool {
        !self.pattern_matchers.is_empty()
    }

    /// 值总数
    pub fn count(&self) -> usize {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }

    /// 转回构建器以便派生新的值集合
    pub fn to_builder(&self) -> ValuesBagBuilder {
        ValuesBagBuilder {
            simple_values: self.simple_values.clone(),
            excluded_simple_values: self.excluded_simple_values.clone(),
            ranges: self.ranges.clone(),
            excluded_ranges: self.excluded_ranges.clone(),
            comparisons: self.comparisons.clone(),
            pattern_matchers: self.pattern_matchers.clone(),
            value_count: self.value_count,
        }
    }
}
