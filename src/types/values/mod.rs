//! 搜索值对象
//!
//! 单值、区间、比较、模式匹配四类不可变值对象，由输入层创建，编译器只读使用

use crate::error::QuickSearchResult;
use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};

/// 单个值（包含或排除）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleValue {
    value: DataValue,
    view: String,
}

impl SingleValue {
    /// 创建单值，视图表示取值的字符串形式
    pub fn new(value: impl Into<DataValue>) -> Self {
        let value = value.into();
        let view = value.to_string();
        Self { value, view }
    }

    /// 创建单值并指定原始视图表示
    pub fn with_view(value: impl Into<DataValue>, view: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            view: view.into(),
        }
    }

    pub fn value(&self) -> &DataValue {
        &self.value
    }

    pub fn view(&self) -> &str {
        &self.view
    }
}

/// 区间值
///
/// 下界不大于上界由输入层保证，编译器不做校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    lower: DataValue,
    upper: DataValue,
    lower_inclusive: bool,
    upper_inclusive: bool,
    view_lower: String,
    view_upper: String,
}

impl Range {
    /// 创建区间
    pub fn new(
        lower: impl Into<DataValue>,
        upper: impl Into<DataValue>,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        let lower = lower.into();
        let upper = upper.into();
        Self {
            view_lower: lower.to_string(),
            view_upper: upper.to_string(),
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }
    }

    /// 创建两端都包含的闭区间
    pub fn inclusive(lower: impl Into<DataValue>, upper: impl Into<DataValue>) -> Self {
        Self::new(lower, upper, true, true)
    }

    /// 指定视图表示
    pub fn with_views(mut self, view_lower: impl Into<String>, view_upper: impl Into<String>) -> Self {
        self.view_lower = view_lower.into();
        self.view_upper = view_upper.into();
        self
    }

    pub fn lower(&self) -> &DataValue {
        &self.lower
    }

    pub fn upper(&self) -> &DataValue {
        &self.upper
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }

    pub fn view_lower(&self) -> &str {
        &self.view_lower
    }

    pub fn view_upper(&self) -> &str {
        &self.view_upper
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOperator {
    /// 大于
    Greater,
    /// 小于
    Lower,
    /// 大于等于
    GreaterOrEqual,
    /// 小于等于
    LowerOrEqual,
    /// 不等于
    NotEqual,
}

impl CompareOperator {
    /// 获取操作符的 SQL 表示
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOperator::Greater => ">",
            CompareOperator::Lower => "<",
            CompareOperator::GreaterOrEqual => ">=",
            CompareOperator::LowerOrEqual => "<=",
            CompareOperator::NotEqual => "<>",
        }
    }

    /// 从字符串解析操作符
    pub fn from_str(s: &str) -> QuickSearchResult<Self> {
        match s.trim() {
            ">" => Ok(CompareOperator::Greater),
            "<" => Ok(CompareOperator::Lower),
            ">=" => Ok(CompareOperator::GreaterOrEqual),
            "<=" => Ok(CompareOperator::LowerOrEqual),
            "<>" | "!=" => Ok(CompareOperator::NotEqual),
            other => Err(crate::quick_error!(
                validation,
                "operator",
                format!("未知的比较操作符: {}", other)
            )),
        }
    }

    /// `<>` 属于排除条件，其余为包含条件
    pub fn is_exclusive(&self) -> bool {
        matches!(self, CompareOperator::NotEqual)
    }
}

/// 比较值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compare {
    value: DataValue,
    operator: CompareOperator,
    view: String,
}

impl Compare {
    pub fn new(value: impl Into<DataValue>, operator: CompareOperator) -> Self {
        let value = value.into();
        Self {
            view: value.to_string(),
            value,
            operator,
        }
    }

    pub fn value(&self) -> &DataValue {
        &self.value
    }

    pub fn operator(&self) -> CompareOperator {
        self.operator
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn is_exclusive(&self) -> bool {
        self.operator.is_exclusive()
    }
}

/// 模式匹配类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternMatchType {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
    Regex,
    NotContains,
    NotStartsWith,
    NotEndsWith,
    NotEquals,
    NotRegex,
}

impl PatternMatchType {
    /// NOT 变体属于排除条件
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            PatternMatchType::NotContains
                | PatternMatchType::NotStartsWith
                | PatternMatchType::NotEndsWith
                | PatternMatchType::NotEquals
                | PatternMatchType::NotRegex
        )
    }

    /// 去掉 NOT 后的基础匹配类型
    pub fn base(&self) -> PatternMatchType {
        match self {
            PatternMatchType::NotContains => PatternMatchType::Contains,
            PatternMatchType::NotStartsWith => PatternMatchType::StartsWith,
            PatternMatchType::NotEndsWith => PatternMatchType::EndsWith,
            PatternMatchType::NotEquals => PatternMatchType::Equals,
            PatternMatchType::NotRegex => PatternMatchType::Regex,
            other => *other,
        }
    }

    /// 获取匹配类型名称
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMatchType::Contains => "CONTAINS",
            PatternMatchType::StartsWith => "STARTS_WITH",
            PatternMatchType::EndsWith => "ENDS_WITH",
            PatternMatchType::Equals => "EQUALS",
            PatternMatchType::Regex => "REGEX",
            PatternMatchType::NotContains => "NOT_CONTAINS",
            PatternMatchType::NotStartsWith => "NOT_STARTS_WITH",
            PatternMatchType::NotEndsWith => "NOT_ENDS_WITH",
            PatternMatchType::NotEquals => "NOT_EQUALS",
            PatternMatchType::NotRegex => "NOT_REGEX",
        }
    }
}

/// 模式匹配值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    value: String,
    match_type: PatternMatchType,
    case_insensitive: bool,
}

impl PatternMatch {
    pub fn new(value: impl Into<String>, match_type: PatternMatchType, case_insensitive: bool) -> Self {
        Self {
            value: value.into(),
            match_type,
            case_insensitive,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn match_type(&self) -> PatternMatchType {
        self.match_type
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_exclusive(&self) -> bool {
        self.match_type.is_exclusive()
    }
}
