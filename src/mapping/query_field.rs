//! 字段映射声明与解析结果

use crate::conversion::{FieldConversion, ValueConversion};
use crate::types::{FieldDescriptor, ParameterType};
use std::sync::Arc;

/// 字段映射声明
///
/// 目标写作 `alias.column` 或 `column`，未写别名时使用默认表别名
#[derive(Clone)]
pub struct FieldMapping {
    field: String,
    target: String,
    db_type: Option<ParameterType>,
    value_conversion: Option<Arc<dyn ValueConversion>>,
    field_conversion: Option<Arc<dyn FieldConversion>>,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
            db_type: None,
            value_conversion: None,
            field_conversion: None,
        }
    }

    /// 显式指定参数类型
    pub fn db_type(mut self, db_type: ParameterType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    /// 覆盖字段描述中的值转换器
    pub fn value_conversion(mut self, conversion: Arc<dyn ValueConversion>) -> Self {
        self.value_conversion = Some(conversion);
        self
    }

    /// 覆盖字段描述中的列转换器
    pub fn field_conversion(mut self, conversion: Arc<dyn FieldConversion>) -> Self {
        self.field_conversion = Some(conversion);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn declared_db_type(&self) -> Option<ParameterType> {
        self.db_type
    }

    pub fn declared_value_conversion(&self) -> Option<&Arc<dyn ValueConversion>> {
        self.value_conversion.as_ref()
    }

    pub fn declared_field_conversion(&self) -> Option<&Arc<dyn FieldConversion>> {
        self.field_conversion.as_ref()
    }
}

impl std::fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMapping")
            .field("field", &self.field)
            .field("target", &self.target)
            .field("db_type", &self.db_type)
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

/// 已解析的查询字段
#[derive(Clone)]
pub struct QueryField {
    descriptor: Arc<FieldDescriptor>,
    column: String,
    db_type: ParameterType,
    value_conversion: Option<Arc<dyn ValueConversion>>,
    field_conversion: Option<Arc<dyn FieldConversion>>,
}

impl QueryField {
    pub(crate) fn new(
        descriptor: Arc<FieldDescriptor>,
        column: String,
        db_type: ParameterType,
        mapping: &FieldMapping,
    ) -> Self {
        // 映射声明的转换器优先于字段描述
        let value_conversion = mapping
            .declared_value_conversion()
            .or_else(|| descriptor.value_conversion())
            .cloned();
        let field_conversion = mapping
            .declared_field_conversion()
            .or_else(|| descriptor.field_conversion())
            .cloned();

        Self {
            descriptor,
            column,
            db_type,
            value_conversion,
            field_conversion,
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// 已加引号的列引用
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn db_type(&self) -> ParameterType {
        self.db_type
    }

    pub fn value_conversion(&self) -> Option<&Arc<dyn ValueConversion>> {
        self.value_conversion.as_ref()
    }

    pub fn field_conversion(&self) -> Option<&Arc<dyn FieldConversion>> {
        self.field_conversion.as_ref()
    }
}

impl std::fmt::Debug for QueryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryField")
            .field("name", &self.name())
            .field("column", &self.column)
            .field("db_type", &self.db_type)
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
