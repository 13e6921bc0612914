//! SQL 方言平台
//!
//! 封装不同数据库在字面量引用、基础类型转换、LIKE 转义和正则谓词上的差异

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MysqlPlatform;
pub use postgres::PostgresPlatform;
pub use sqlite::SqlitePlatform;

use crate::types::{DataValue, DatabaseType};

/// 方言平台
pub trait QueryPlatform: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// 基础类型转换：将值转换为后端原生表示
    fn base_convert(&self, value: &DataValue) -> DataValue;

    /// 以转义后的字面量输出值，用于内嵌
    fn quote_literal(&self, value: &DataValue) -> String {
        match value {
            DataValue::Null => "NULL".to_string(),
            DataValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            DataValue::Int(i) => i.to_string(),
            DataValue::UInt(u) => u.to_string(),
            DataValue::Float(f) if f.is_finite() => f.to_string(),
            DataValue::Float(_) => "NULL".to_string(),
            DataValue::Bytes(bytes) => format!("X'{}'", hex::encode(bytes)),
            other => quote_string(&other.to_string()),
        }
    }

    /// LIKE 谓词后附加的 ESCAPE 子句
    fn like_escape_clause(&self) -> &'static str {
        ""
    }

    /// LIKE 谓词
    fn like_predicate(&self, column: &str, value: &str, negate: bool) -> String {
        let operator = if negate { "NOT LIKE" } else { "LIKE" };
        format!("{} {} {}{}", column, operator, value, self.like_escape_clause())
    }

    /// 正则谓词，大小写不敏感时列和值已由调用方决定是否包装
    fn regex_predicate(&self, column: &str, value: &str, case_insensitive: bool, negate: bool) -> String;

    /// 大小写不敏感的正则是否由方言原生支持（否则调用方使用小写函数包装）
    fn native_case_insensitive_regex(&self) -> bool {
        false
    }

    /// 小写函数
    fn lower(&self, expression: &str) -> String {
        format!("LOWER({})", expression)
    }
}

/// 标准 SQL 字符串字面量，单引号加倍
pub(crate) fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// 转义 LIKE 通配符，转义字符为反斜杠
pub fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// 根据数据库类型创建方言平台
pub fn create_platform(db_type: DatabaseType) -> Box<dyn QueryPlatform> {
    match db_type {
        DatabaseType::SQLite => Box::new(SqlitePlatform),
        DatabaseType::PostgreSQL => Box::new(PostgresPlatform),
        DatabaseType::MySQL => Box::new(MysqlPlatform),
    }
}
