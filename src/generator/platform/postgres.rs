use super::QueryPlatform;
use crate::types::{DataValue, DatabaseType};

/// PostgreSQL 方言
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresPlatform;

impl QueryPlatform for PostgresPlatform {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    // PostgreSQL 原生支持布尔、日期和 UUID 类型
    fn base_convert(&self, value: &DataValue) -> DataValue {
        value.clone()
    }

    fn quote_literal(&self, value: &DataValue) -> String {
        match value {
            DataValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            DataValue::Bytes(bytes) => format!("'\\x{}'::bytea", hex::encode(bytes)),
            DataValue::Null => "NULL".to_string(),
            DataValue::Int(i) => i.to_string(),
            DataValue::UInt(u) => u.to_string(),
            DataValue::Float(f) if f.is_finite() => f.to_string(),
            DataValue::Float(_) => "NULL".to_string(),
            other => super::quote_string(&other.to_string()),
        }
    }

    fn regex_predicate(&self, column: &str, value: &str, case_insensitive: bool, negate: bool) -> String {
        let operator = match (case_insensitive, negate) {
            (false, false) => "~",
            (false, true) => "!~",
            (true, false) => "~*",
            (true, true) => "!~*",
        };
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
    fn test_regex_operators() {
        let platform = PostgresPlatform;
        assert_eq!(platform.regex_predicate("\"c\"", ":c_0", true, false), "\"c\" ~* :c_0");
        assert_eq!(platform.regex_predicate("\"c\"", ":c_0", false, true), "\"c\" !~ :c_0");
    }

    #[test]
    fn test_quote_literal() {
        let platform = PostgresPlatform;
        assert_eq!(platform.quote_literal(&DataValue::Bool(false)), "FALSE");
        assert_eq!(platform.quote_literal(&DataValue::Bytes(vec![0xde, 0xad])), "'\\xdead'::bytea");
        assert_eq!(platform.quote_literal(&DataValue::from("it's")), "'it''s'");
    }
}
