//! 值与列转换模块
//!
//! 字段可以挂载值转换器和列转换器，编译器在生成表达式前调用它们。
//! 转换器还可以根据具体值选择转换策略，使同一字段按值的类型生成不同的 SQL

pub mod builtin;

use crate::error::QuickSearchResult;
use crate::types::{DataValue, DatabaseType, FieldDescriptor, FieldOptions};

pub use builtin::{AgeDateConversion, CastConversion, LowerCaseConversion};

/// 表达式模板中的值标记
pub const VALUE_MARKER: &str = "{value}";

/// 转换上下文
///
/// 每次调用转换器时重新构建，转换器只读使用
#[derive(Debug, Clone, Copy)]
pub struct ConversionHints<'a> {
    /// 当前字段
    pub field: &'a FieldDescriptor,
    /// 已解析的列引用，选择策略阶段列尚未确定
    pub column: Option<&'a str>,
    /// 目标数据库
    pub database_type: DatabaseType,
    /// 当前转换策略
    pub conversion_strategy: Option<i32>,
}

impl<'a> ConversionHints<'a> {
    pub fn new(field: &'a FieldDescriptor, database_type: DatabaseType) -> Self {
        Self {
            field,
            column: None,
            database_type,
            conversion_strategy: None,
        }
    }

    pub fn with_column(mut self, column: &'a str) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_strategy(mut self, strategy: Option<i32>) -> Self {
        self.conversion_strategy = strategy;
        self
    }
}

/// 值转换结果
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedValue {
    /// 转换后的值，按普通参数绑定
    Value(DataValue),
    /// 包含 `{value}` 标记的表达式片段，标记会被替换为占位符或内嵌字面量
    Expression { template: String, value: DataValue },
}

impl ConvertedValue {
    pub fn value(&self) -> &DataValue {
        match self {
            ConvertedValue::Value(value) => value,
            ConvertedValue::Expression { value, .. } => value,
        }
    }
}

/// 值转换器
pub trait ValueConversion: Send + Sync {
    /// 转换器标识，参与缓存键计算
    fn conversion_id(&self) -> &str;

    /// 是否需要先做后端基础类型转换
    fn requires_base_conversion(&self, _options: &FieldOptions, _hints: &ConversionHints<'_>) -> bool {
        false
    }

    /// 为 true 时值以转义后的字面量内嵌，而不是绑定参数
    fn value_requires_embedding(&self) -> bool {
        false
    }

    fn convert_value(
        &self,
        value: &DataValue,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<ConvertedValue>;

    /// 根据具体值选择转换策略
    fn conversion_strategy(
        &self,
        _value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> Option<i32> {
        None
    }
}

/// 列转换器
pub trait FieldConversion: Send + Sync {
    /// 转换器标识，参与缓存键计算
    fn conversion_id(&self) -> &str;

    /// 将列引用转换为 SQL 表达式
    fn convert_sql_field(
        &self,
        column: &str,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<String>;

    fn conversion_strategy(
        &self,
        _value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> Option<i32> {
        None
    }
}

/// 用实际值替换表达式模板中的标记
pub fn render_template(template: &str, token: &str) -> String {
    template.replace(VALUE_MARKER, token)
}
