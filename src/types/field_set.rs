//! 字段集（搜索模式）
//!
//! 描述一个搜索场景中可用的逻辑字段，字段名与后端列无关

use crate::conversion::{FieldConversion, ValueConversion};
use crate::error::QuickSearchResult;
use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 字段选项
pub type FieldOptions = BTreeMap<String, DataValue>;

/// 字段类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// 字符串类型
    String,
    /// 文本类型
    Text,
    /// 整数类型
    Integer,
    /// 大整数类型
    BigInteger,
    /// 浮点数类型
    Float,
    /// 布尔类型
    Boolean,
    /// 日期类型
    Date,
    /// 日期时间类型
    DateTime,
    /// UUID类型
    Uuid,
    /// 二进制类型
    Binary,
    /// 自定义类型，需要显式指定参数类型
    Custom(String),
}

/// 字段描述
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    options: FieldOptions,
    value_conversion: Option<Arc<dyn ValueConversion>>,
    field_conversion: Option<Arc<dyn FieldConversion>>,
}

impl FieldDescriptor {
    /// 创建新的字段描述
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            options: FieldOptions::new(),
            value_conversion: None,
            field_conversion: None,
        }
    }

    /// 设置字段选项
    pub fn option(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// 设置值转换器
    pub fn with_value_conversion(mut self, conversion: Arc<dyn ValueConversion>) -> Self {
        self.value_conversion = Some(conversion);
        self
    }

    /// 设置列转换器
    pub fn with_field_conversion(mut self, conversion: Arc<dyn FieldConversion>) -> Self {
        self.field_conversion = Some(conversion);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn value_conversion(&self) -> Option<&Arc<dyn ValueConversion>> {
        self.value_conversion.as_ref()
    }

    pub fn field_conversion(&self) -> Option<&Arc<dyn FieldConversion>> {
        self.field_conversion.as_ref()
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("options", &self.options)
            .field(
                "value_conversion",
                &self.value_conversion.as_ref().map(|c| c.conversion_id()),
            )
            .field(
                "field_conversion",
                &self.field_conversion.as_ref().map(|c| c.conversion_id()),
            )
            .finish()
    }
}

/// 字段集
#[derive(Debug, Clone)]
pub struct FieldSet {
    name: String,
    fields: Vec<Arc<FieldDescriptor>>,
}

impl FieldSet {
    /// 创建字段集构建器
    pub fn builder(name: impl Into<String>) -> FieldSetBuilder {
        FieldSetBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取字段描述，字段不存在时返回 UnknownField
    pub fn get(&self, name: &str) -> QuickSearchResult<&Arc<FieldDescriptor>> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| crate::quick_error!(unknown_field, name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// 按声明顺序返回字段名
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 字段集构建器
#[derive(Debug)]
pub struct FieldSetBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldSetBuilder {
    /// 添加字段
    pub fn add(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 构建字段集，字段名重复时返回配置错误
    pub fn build(self) -> QuickSearchResult<FieldSet> {
        if self.name.trim().is_empty() {
            return Err(crate::quick_error!(config, "字段集名称不能为空"));
        }

        let mut fields: Vec<Arc<FieldDescriptor>> = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            if fields.iter().any(|f| f.name() == field.name()) {
                return Err(crate::quick_error!(
                    config,
                    format!("字段集 '{}' 中字段 '{}' 重复", self.name, field.name())
                ));
            }
            fields.push(Arc::new(field));
        }

        Ok(FieldSet {
            name: self.name,
            fields,
        })
    }
}
