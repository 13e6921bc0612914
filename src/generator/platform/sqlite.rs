use super::QueryPlatform;
use crate::types::{DataValue, DatabaseType};

/// SQLite 方言
///
/// 布尔值存为 0/1，日期与 UUID 存为文本，REGEXP 依赖连接注册的 regexp() 函数
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlitePlatform;

impl QueryPlatform for SqlitePlatform {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn base_convert(&self, value: &DataValue) -> DataValue {
        match value {
            DataValue::Bool(b) => DataValue::Int(i64::from(*b)),
            DataValue::Date(d) => DataValue::String(d.format("%Y-%m-%d").to_string()),
            DataValue::DateTime(dt) => DataValue::String(dt.format("%Y-%m-%d %H:%M:%S%:z").to_string()),
            DataValue::DateTimeUTC(dt) => DataValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            DataValue::Uuid(u) => DataValue::String(u.to_string()),
            other => other.clone(),
        }
    }

    // SQLite 的 LIKE 没有默认转义字符
    fn like_escape_clause(&self) -> &'static str {
        " ESCAPE '\\'"
    }

    fn regex_predicate(&self, column: &str, value: &str, _case_insensitive: bool, negate: bool) -> String {
        let operator = if negate { "NOT REGEXP" } else { "REGEXP" };
        format!("{} {} {}", column, operator, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_base_convert() {
        let platform = SqlitePlatform;
        assert_eq!(platform.base_convert(&DataValue::Bool(true)), DataValue::Int(1));
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            platform.base_convert(&DataValue::Date(date)),
            DataValue::String("2024-05-01".to_string())
        );
    }

    #[test]
    fn test_like_has_escape_clause() {
        assert_eq!(
            SqlitePlatform.like_predicate("\"name\"", ":name_0", true),
            "\"name\" NOT LIKE :name_0 ESCAPE '\\'"
        );
    }
}
