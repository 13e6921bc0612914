//! 字段解析
//!
//! 将逻辑字段名解析为列引用和参数类型。`FieldConfigBuilder` 在首次编译时被消耗，
//! 转换为不可变的 `ResolvedFields`

use crate::error::QuickSearchResult;
use crate::mapping::query_field::{FieldMapping, QueryField};
use crate::security::DatabaseSecurityValidator;
use crate::types::{DatabaseType, FieldDescriptor, FieldSet, FieldType, ParameterType};
use rat_logger::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 列解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    /// 已加引号的列引用
    pub column: String,
    pub db_type: ParameterType,
}

/// 列解析器
///
/// 后端相关的扩展点，无法确定列或类型时返回 ConfigError
pub trait ColumnResolver: Send + Sync {
    fn resolve(
        &self,
        descriptor: &FieldDescriptor,
        mapping: &FieldMapping,
    ) -> QuickSearchResult<ResolvedColumn>;
}

/// 基于表别名的默认列解析器
#[derive(Debug, Clone)]
pub struct TableColumnResolver {
    default_alias: Option<String>,
    validator: DatabaseSecurityValidator,
}

impl TableColumnResolver {
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            default_alias: None,
            validator: DatabaseSecurityValidator::new(db_type),
        }
    }

    /// 设置默认表别名，映射目标未写别名时使用
    pub fn with_default_alias(mut self, alias: impl Into<String>) -> Self {
        self.default_alias = Some(alias.into());
        self
    }

    /// 由字段类型推导参数类型
    pub fn parameter_type_for(field_type: &FieldType) -> Option<ParameterType> {
        match field_type {
            FieldType::String | FieldType::Text => Some(ParameterType::String),
            FieldType::Integer => Some(ParameterType::Integer),
            FieldType::BigInteger => Some(ParameterType::BigInteger),
            FieldType::Float => Some(ParameterType::Float),
            FieldType::Boolean => Some(ParameterType::Boolean),
            FieldType::Date => Some(ParameterType::Date),
            FieldType::DateTime => Some(ParameterType::DateTime),
            FieldType::Uuid => Some(ParameterType::Uuid),
            FieldType::Binary => Some(ParameterType::Binary),
            FieldType::Custom(_) => None,
        }
    }
}

impl ColumnResolver for TableColumnResolver {
    fn resolve(
        &self,
        descriptor: &FieldDescriptor,
        mapping: &FieldMapping,
    ) -> QuickSearchResult<ResolvedColumn> {
        let target = mapping.target().trim();
        let parts: Vec<&str> = target.split('.').collect();

        let column = match parts.as_slice() {
            [column] if !column.is_empty() => self
                .validator
                .get_safe_column_reference(self.default_alias.as_deref(), *column)?,
            [alias, column] => self.validator.get_safe_column_reference(Some(*alias), *column)?,
            _ => {
                return Err(crate::quick_error!(
                    config,
                    format!("字段 '{}' 的映射目标 '{}' 无法确定列", descriptor.name(), target)
                ));
            }
        };

        let db_type = match mapping.declared_db_type() {
            Some(db_type) => db_type,
            None => Self::parameter_type_for(descriptor.field_type()).ok_or_else(|| {
                crate::quick_error!(
                    config,
                    format!(
                        "字段 '{}' 的类型 {:?} 无法确定映射类型，请显式指定 db_type",
                        descriptor.name(),
                        descriptor.field_type()
                    )
                )
            })?,
        };

        Ok(ResolvedColumn { column, db_type })
    }
}

/// 字段配置构建器
#[derive(Debug, Clone)]
pub struct FieldConfigBuilder {
    field_set: Arc<FieldSet>,
    mappings: Vec<FieldMapping>,
}

impl FieldConfigBuilder {
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self {
            field_set,
            mappings: Vec::new(),
        }
    }

    /// 声明字段映射，同一字段重复声明时覆盖
    pub fn configure(&mut self, mapping: FieldMapping) -> QuickSearchResult<()> {
        if !self.field_set.has(mapping.field()) {
            return Err(crate::quick_error!(unknown_field, mapping.field()));
        }

        match self.mappings.iter_mut().find(|m| m.field() == mapping.field()) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
        Ok(())
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// 解析所有映射并锁定配置
    pub fn resolve(self, resolver: &dyn ColumnResolver) -> QuickSearchResult<ResolvedFields> {
        let mut fields = BTreeMap::new();
        for mapping in &self.mappings {
            let descriptor = self.field_set.get(mapping.field())?;
            let resolved = resolver.resolve(descriptor, mapping)?;
            debug!(
                "字段映射解析: {} -> {} ({})",
                mapping.field(),
                resolved.column,
                resolved.db_type.as_str()
            );
            fields.insert(
                mapping.field().to_string(),
                QueryField::new(Arc::clone(descriptor), resolved.column, resolved.db_type, mapping),
            );
        }

        Ok(ResolvedFields {
            fields,
            mappings: self.mappings,
        })
    }
}

/// 已解析且不可变的字段表
#[derive(Debug, Clone)]
pub struct ResolvedFields {
    fields: BTreeMap<String, QueryField>,
    mappings: Vec<FieldMapping>,
}

impl ResolvedFields {
    pub fn get(&self, name: &str) -> Option<&QueryField> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// 按声明顺序返回映射声明
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::LowerCaseConversion;
    use crate::error::QuickSearchError;
    use crate::types::FieldDescriptor;

    fn field_set() -> Arc<FieldSet> {
        Arc::new(
            FieldSet::builder("users")
                .add(FieldDescriptor::new("id", FieldType::Integer))
                .add(
                    FieldDescriptor::new("name", FieldType::String)
                        .with_field_conversion(Arc::new(LowerCaseConversion::new())),
                )
                .add(FieldDescriptor::new("geo", FieldType::Custom("point".into())))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_resolve_with_default_alias() {
        let mut builder = FieldConfigBuilder::new(field_set());
        builder.configure(FieldMapping::new("id", "id")).unwrap();
        builder.configure(FieldMapping::new("name", "c.name")).unwrap();

        let resolver = TableColumnResolver::new(DatabaseType::MySQL).with_default_alias("u");
        let resolved = builder.resolve(&resolver).unwrap();

        let id = resolved.get("id").unwrap();
        assert_eq!(id.column(), "`u`.`id`");
        assert_eq!(id.db_type(), ParameterType::Integer);

        let name = resolved.get("name").unwrap();
        assert_eq!(name.column(), "`c`.`name`");
        assert!(name.field_conversion().is_some());
        assert_eq!(resolved.mappings().len(), 2);
    }

    #[test]
    fn test_configure_unknown_field() {
        let mut builder = FieldConfigBuilder::new(field_set());
        let err = builder.configure(FieldMapping::new("email", "email")).unwrap_err();
        assert!(matches!(err, QuickSearchError::UnknownField { .. }));
    }

    #[test]
    fn test_custom_type_requires_db_type() {
        let resolver = TableColumnResolver::new(DatabaseType::PostgreSQL);

        let mut builder = FieldConfigBuilder::new(field_set());
        builder.configure(FieldMapping::new("geo", "geo")).unwrap();
        let err = builder.resolve(&resolver).unwrap_err();
        assert!(matches!(err, QuickSearchError::ConfigError { .. }));

        let mut builder = FieldConfigBuilder::new(field_set());
        builder
            .configure(FieldMapping::new("geo", "geo").db_type(ParameterType::String))
            .unwrap();
        let resolved = builder.resolve(&resolver).unwrap();
        assert_eq!(resolved.get("geo").unwrap().column(), "\"geo\"");
    }

    #[test]
    fn test_bad_targets() {
        let resolver = TableColumnResolver::new(DatabaseType::SQLite);
        let descriptor = FieldDescriptor::new("id", FieldType::Integer);

        let err = resolver.resolve(&descriptor, &FieldMapping::new("id", "a.b.c")).unwrap_err();
        assert!(matches!(err, QuickSearchError::ConfigError { .. }));

        let err = resolver.resolve(&descriptor, &FieldMapping::new("id", "id; DROP")).unwrap_err();
        assert!(matches!(err, QuickSearchError::ValidationError { .. }));
    }
}
