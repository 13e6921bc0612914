use super::QueryPlatform;
use crate::types::{DataValue, DatabaseType};

/// MySQL 方言
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlPlatform;

impl QueryPlatform for MysqlPlatform {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySQL
    }

    fn base_convert(&self, value: &DataValue) -> DataValue {
        match value {
            DataValue::Bool(b) => DataValue::Int(i64::from(*b)),
            DataValue::Uuid(u) => DataValue::String(u.to_string()),
            DataValue::DateTime(dt) => DataValue::String(
                dt.with_timezone(&chrono::Utc).format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            DataValue::DateTimeUTC(dt) => DataValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            other => other.clone(),
        }
    }

    fn quote_literal(&self, value: &DataValue) -> String {
        match value {
            // MySQL 字符串中反斜杠是转义符
            DataValue::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''")),
            DataValue::Null => "NULL".to_string(),
            DataValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            DataValue::Int(i) => i.to_string(),
            DataValue::UInt(u) => u.to_string(),
            DataValue::Float(f) if f.is_finite() => f.to_string(),
            DataValue::Float(_) => "NULL".to_string(),
            DataValue::Bytes(bytes) => format!("X'{}'", hex::encode(bytes)),
            other => super::quote_string(&other.to_string()),
        }
    }

    fn regex_predicate(&self, column: &str, value: &str, case_insensitive: bool, negate: bool) -> String {
        if case_insensitive {
            let operator = if negate { "<>" } else { "=" };
            return format!("REGEXP_LIKE({}, {}, 'i') {} 1", column, value, operator);
        }
        let operator = if negate { "NOT REGEXP" } else { "REGEXP" };
        format!("{} {} {}", column, operator, value)
    }

    fn native_case_insensitive_regex(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_predicates() {
        let platform = MysqlPlatform;
        assert_eq!(platform.regex_predicate("`c`", ":c_0", false, false), "`c` REGEXP :c_0");
        assert_eq!(platform.regex_predicate("`c`", ":c_0", false, true), "`c` NOT REGEXP :c_0");
        assert_eq!(
            platform.regex_predicate("`c`", ":c_0", true, true),
            "REGEXP_LIKE(`c`, :c_0, 'i') <> 1"
        );
    }

    #[test]
    fn test_quote_literal_escapes_backslash() {
        assert_eq!(MysqlPlatform.quote_literal(&DataValue::from("a\\'b")), "'a\\\\''b'");
    }
}
