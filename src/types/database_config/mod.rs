use serde::{Deserialize, Serialize};

/// 支持的数据库类型（决定 SQL 方言）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// SQLite 数据库
    SQLite,
    /// PostgreSQL 数据库
    PostgreSQL,
    /// MySQL 数据库
    MySQL,
}

impl DatabaseType {
    /// 获取数据库类型的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "sqlite",
            DatabaseType::PostgreSQL => "postgresql",
            DatabaseType::MySQL => "mysql",
        }
    }

    /// 从字符串解析数据库类型
    pub fn from_str(s: &str) -> Result<Self, crate::error::QuickSearchError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::SQLite),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseType::MySQL),
            _ => Err(crate::quick_error!(unsupported_db, s)),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickSearchError;

    #[test]
    fn test_parse_database_type() {
        assert_eq!(DatabaseType::from_str("PG").unwrap(), DatabaseType::PostgreSQL);
        assert_eq!(DatabaseType::from_str("sqlite").unwrap(), DatabaseType::SQLite);
        let err = DatabaseType::from_str("mongodb").unwrap_err();
        assert!(matches!(err, QuickSearchError::UnsupportedDatabase { .. }));
    }
}
