//! 内置转换器

use super::{ConversionHints, ConvertedValue, FieldConversion, ValueConversion, VALUE_MARKER};
use crate::error::QuickSearchResult;
use crate::types::{DataValue, DatabaseType, FieldOptions};
use chrono::NaiveDate;
use regex::Regex;

/// 年龄/日期转换器
///
/// 整数值按年龄比较（策略 1，列被转换为年龄表达式），日期值按日期比较（策略 2，列保持不变）
#[derive(Debug, Default, Clone, Copy)]
pub struct AgeDateConversion;

impl AgeDateConversion {
    pub const STRATEGY_AGE: i32 = 1;
    pub const STRATEGY_DATE: i32 = 2;

    pub fn new() -> Self {
        Self
    }

    fn select_strategy(value: &DataValue) -> Option<i32> {
        match value {
            DataValue::Int(_) | DataValue::UInt(_) => Some(Self::STRATEGY_AGE),
            v if v.is_temporal() => Some(Self::STRATEGY_DATE),
            DataValue::String(s) if parse_date(s).is_some() => Some(Self::STRATEGY_DATE),
            _ => None,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

impl ValueConversion for AgeDateConversion {
    fn conversion_id(&self) -> &str {
        "age_date"
    }

    fn convert_value(
        &self,
        value: &DataValue,
        _options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<ConvertedValue> {
        match (hints.conversion_strategy, value) {
            (Some(Self::STRATEGY_AGE), DataValue::Int(_)) => Ok(ConvertedValue::Value(value.clone())),
            (Some(Self::STRATEGY_AGE), DataValue::UInt(u)) => {
                let age = i64::try_from(*u).map_err(|_| {
                    crate::quick_error!(transformation, hints.field.name(), format!("年龄超出范围: {}", u))
                })?;
                Ok(ConvertedValue::Value(DataValue::Int(age)))
            }
            (Some(Self::STRATEGY_DATE), DataValue::String(s)) => parse_date(s)
                .map(|date| ConvertedValue::Value(DataValue::Date(date)))
                .ok_or_else(|| {
                    crate::quick_error!(transformation, hints.field.name(), format!("无效的日期: {}", s))
                }),
            (Some(Self::STRATEGY_DATE), v) if v.is_temporal() => {
                let date = v.as_date().ok_or_else(|| {
                    crate::quick_error!(transformation, hints.field.name(), "无法读取日期")
                })?;
                Ok(ConvertedValue::Value(DataValue::Date(date)))
            }
            _ => Err(crate::quick_error!(
                transformation,
                hints.field.name(),
                format!("值 {:?} 既不是年龄也不是日期", value)
            )),
        }
    }

    fn conversion_strategy(
        &self,
        value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> Option<i32> {
        Self::select_strategy(value)
    }
}

impl FieldConversion for AgeDateConversion {
    fn conversion_id(&self) -> &str {
        "age_date"
    }

    fn convert_sql_field(
        &self,
        column: &str,
        _options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<String> {
        if hints.conversion_strategy != Some(Self::STRATEGY_AGE) {
            return Ok(column.to_string());
        }

        let expression = match hints.database_type {
            DatabaseType::SQLite => format!(
                "CAST(strftime('%Y.%m%d', 'now') - strftime('%Y.%m%d', {}) AS INTEGER)",
                column
            ),
            DatabaseType::PostgreSQL => format!("CAST(EXTRACT(YEAR FROM AGE({})) AS INTEGER)", column),
            DatabaseType::MySQL => format!("TIMESTAMPDIFF(YEAR, {}, CURDATE())", column),
        };
        Ok(expression)
    }

    fn conversion_strategy(
        &self,
        value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> Option<i32> {
        Self::select_strategy(value)
    }
}

/// CAST 目标类型名格式，只允许字母数字和精度声明
const SQL_TYPE_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_ ]*(\(\s*\d+\s*(,\s*\d+\s*)?\))?$";

/// CAST 转换器
///
/// 列和值都包装为 `CAST(.. AS <type>)`，可选择以字面量内嵌值
#[derive(Debug, Clone)]
pub struct CastConversion {
    sql_type: String,
    embed: bool,
    id: String,
}

impl CastConversion {
    /// 创建 CAST 转换器，类型名只允许字母数字和精度声明
    pub fn new(sql_type: &str) -> QuickSearchResult<Self> {
        let sql_type = sql_type.trim();
        let pattern = Regex::new(SQL_TYPE_PATTERN)
            .map_err(|e| crate::quick_error!(validation, "sql_type", e.to_string()))?;
        if !pattern.is_match(sql_type) {
            return Err(crate::quick_error!(
                validation,
                "sql_type",
                format!("非法的 CAST 类型: {}", sql_type)
            ));
        }
        Ok(Self {
            sql_type: sql_type.to_uppercase(),
            embed: false,
            id: format!("cast:{}", sql_type.to_uppercase()),
        })
    }

    /// 以内嵌字面量代替参数绑定
    pub fn embedded(mut self) -> Self {
        self.embed = true;
        self.id = format!("cast:{}:embedded", self.sql_type);
        self
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }
}

impl ValueConversion for CastConversion {
    fn conversion_id(&self) -> &str {
        &self.id
    }

    fn requires_base_conversion(&self, _options: &FieldOptions, _hints: &ConversionHints<'_>) -> bool {
        true
    }

    fn value_requires_embedding(&self) -> bool {
        self.embed
    }

    fn convert_value(
        &self,
        value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<ConvertedValue> {
        Ok(ConvertedValue::Expression {
            template: format!("CAST({} AS {})", VALUE_MARKER, self.sql_type),
            value: value.clone(),
        })
    }
}

impl FieldConversion for CastConversion {
    fn conversion_id(&self) -> &str {
        &self.id
    }

    fn convert_sql_field(
        &self,
        column: &str,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<String> {
        Ok(format!("CAST({} AS {})", column, self.sql_type))
    }
}

/// 小写转换器，列使用 LOWER()，字符串值转为小写
#[derive(Debug, Default, Clone, Copy)]
pub struct LowerCaseConversion;

impl LowerCaseConversion {
    pub fn new() -> Self {
        Self
    }
}

impl ValueConversion for LowerCaseConversion {
    fn conversion_id(&self) -> &str {
        "lower_case"
    }

    fn convert_value(
        &self,
        value: &DataValue,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<ConvertedValue> {
        let converted = match value {
            DataValue::String(s) => DataValue::String(s.to_lowercase()),
            other => other.clone(),
        };
        Ok(ConvertedValue::Value(converted))
    }
}

impl FieldConversion for LowerCaseConversion {
    fn conversion_id(&self) -> &str {
        "lower_case"
    }

    fn convert_sql_field(
        &self,
        column: &str,
        _options: &FieldOptions,
        _hints: &ConversionHints<'_>,
    ) -> QuickSearchResult<String> {
        Ok(format!("LOWER({})", column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickSearchError;
    use crate::types::{FieldDescriptor, FieldType};

    fn birthday() -> FieldDescriptor {
        FieldDescriptor::new("birthday", FieldType::Date)
    }

    #[test]
    fn test_age_date_strategy_selection() {
        let field = birthday();
        let hints = ConversionHints::new(&field, DatabaseType::MySQL);
        let options = FieldOptions::new();
        let conversion = AgeDateConversion::new();

        assert_eq!(
            ValueConversion::conversion_strategy(&conversion, &DataValue::Int(18), &options, &hints),
            Some(AgeDateConversion::STRATEGY_AGE)
        );
        assert_eq!(
            ValueConversion::conversion_strategy(&conversion, &DataValue::from("2000-01-31"), &options, &hints),
            Some(AgeDateConversion::STRATEGY_DATE)
        );
        assert_eq!(
            ValueConversion::conversion_strategy(&conversion, &DataValue::from("soon"), &options, &hints),
            None
        );
    }

    #[test]
    fn test_age_date_column_per_strategy() {
        let field = birthday();
        let options = FieldOptions::new();
        let conversion = AgeDateConversion::new();

        let age = ConversionHints::new(&field, DatabaseType::MySQL).with_strategy(Some(1));
        assert_eq!(
            conversion.convert_sql_field("`u`.`birthday`", &options, &age).unwrap(),
            "TIMESTAMPDIFF(YEAR, `u`.`birthday`, CURDATE())"
        );

        let date = ConversionHints::new(&field, DatabaseType::MySQL).with_strategy(Some(2));
        assert_eq!(
            conversion.convert_sql_field("`u`.`birthday`", &options, &date).unwrap(),
            "`u`.`birthday`"
        );
    }

    #[test]
    fn test_age_date_rejects_unknown_value() {
        let field = birthday();
        let hints = ConversionHints::new(&field, DatabaseType::SQLite);
        let err = AgeDateConversion::new()
            .convert_value(&DataValue::Bool(true), &FieldOptions::new(), &hints)
            .unwrap_err();
        assert!(matches!(err, QuickSearchError::TransformationFailed { ref field, .. } if field == "birthday"));
    }

    #[test]
    fn test_cast_conversion() {
        assert!(CastConversion::new("DATE; DROP TABLE x").is_err());

        let cast = CastConversion::new("decimal(10, 2)").unwrap();
        assert_eq!(cast.sql_type(), "DECIMAL(10, 2)");
        assert_eq!(ValueConversion::conversion_id(&cast), "cast:DECIMAL(10, 2)");
        assert_eq!(ValueConversion::conversion_id(&cast.clone().embedded()), "cast:DECIMAL(10, 2):embedded");

        let field = FieldDescriptor::new("price", FieldType::Float);
        let hints = ConversionHints::new(&field, DatabaseType::PostgreSQL);
        let converted = cast.convert_value(&DataValue::Float(1.5), &FieldOptions::new(), &hints).unwrap();
        assert_eq!(
            converted,
            ConvertedValue::Expression {
                template: "CAST({value} AS DECIMAL(10, 2))".to_string(),
                value: DataValue::Float(1.5),
            }
        );
    }
}
