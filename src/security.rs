//! 标识符安全验证工具
//!
//! 提供跨数据库类型的列名、表别名等标识符的安全验证与引用，
//! 防止通过字段映射注入 SQL

use crate::error::QuickSearchResult;
use crate::types::DatabaseType;

/// 列名中禁止使用的 SQL 关键字
const SQL_KEYWORDS: [&str; 56] = [
    "SELECT", "FROM", "WHERE", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP",
    "ALTER", "TABLE", "INDEX", "AND", "OR", "NOT", "NULL", "IS", "IN", "EXISTS",
    "BETWEEN", "LIKE", "REGEXP", "UNION", "JOIN", "INNER", "LEFT", "RIGHT", "OUTER",
    "GROUP", "BY", "HAVING", "ORDER", "LIMIT", "OFFSET", "DISTINCT", "COUNT", "SUM",
    "AVG", "MIN", "MAX", "AS", "ON", "PRIMARY", "KEY", "FOREIGN", "REFERENCES",
    "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "COALESCE", "CAST", "CONVERT",
    "ESCAPE", "ILIKE",
];

/// 数据库安全验证器
#[derive(Debug, Clone, Copy)]
pub struct DatabaseSecurityValidator {
    db_type: DatabaseType,
}

impl DatabaseSecurityValidator {
    /// 创建新的安全验证器
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }

    /// 验证标识符（列名或表别名）的安全性
    ///
    /// # 参数
    /// * `kind` - 标识符类别，用于错误信息
    /// * `identifier` - 标识符
    pub fn validate_identifier(&self, kind: &str, identifier: &str) -> QuickSearchResult<()> {
        let Some(first) = identifier.chars().next() else {
            return Err(crate::quick_error!(validation, kind, format!("{}不能为空", kind)));
        };

        if identifier.len() > 64 {
            return Err(crate::quick_error!(
                validation,
                identifier,
                format!("{}长度不能超过64个字符", kind)
            ));
        }

        // 检查第一个字符不能是数字
        if first.is_ascii_digit() {
            return Err(crate::quick_error!(
                validation,
                identifier,
                format!("{}不能以数字开头", kind)
            ));
        }

        for (i, ch) in identifier.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return Err(crate::quick_error!(
                    validation,
                    identifier,
                    format!("{}包含非法字符 '{}' 在位置 {}", kind, ch, i)
                ));
            }
        }

        let upper_name = identifier.to_uppercase();
        if SQL_KEYWORDS.contains(&upper_name.as_str()) {
            return Err(crate::quick_error!(
                validation,
                identifier,
                format!("{}不能使用SQL关键字: {}", kind, identifier)
            ));
        }

        Ok(())
    }

    /// 按方言为标识符加引号（不做验证）
    pub fn quote(&self, identifier: &str) -> String {
        match self.db_type {
            DatabaseType::PostgreSQL | DatabaseType::SQLite => format!("\"{}\"", identifier),
            DatabaseType::MySQL => format!("`{}`", identifier),
        }
    }

    /// 获取安全的列标识符
    pub fn get_safe_field_identifier(&self, field_name: &str) -> QuickSearchResult<String> {
        self.validate_identifier("列名", field_name)?;
        Ok(self.quote(field_name))
    }

    /// 获取安全的列引用，带表别名时输出 `"alias"."column"`
    pub fn get_safe_column_reference(
        &self,
        alias: Option<&str>,
        column: &str,
    ) -> QuickSearchResult<String> {
        let column = self.get_safe_field_identifier(column)?;
        match alias {
            Some(alias) => {
                self.validate_identifier("表别名", alias)?;
                Ok(format!("{}.{}", self.quote(alias), column))
            }
            None => Ok(column),
        }
    }

    /// 获取安全的表标识符
    pub fn get_safe_table_identifier(&self, table_name: &str) -> QuickSearchResult<String> {
        self.validate_identifier("表名", table_name)?;
        Ok(self.quote(table_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickSearchError;

    #[test]
    fn test_identifier_validation() {
        let validator = DatabaseSecurityValidator::new(DatabaseType::PostgreSQL);

        assert!(validator.validate_identifier("列名", "name").is_ok());
        assert!(validator.validate_identifier("列名", "user_name").is_ok());
        assert!(validator.validate_identifier("列名", "createdAt").is_ok());

        assert!(validator.validate_identifier("列名", "").is_err());
        assert!(validator.validate_identifier("列名", "123name").is_err());
        assert!(validator.validate_identifier("列名", "na-me").is_err());
        assert!(validator.validate_identifier("列名", "na me").is_err());
        assert!(validator.validate_identifier("列名", "select").is_err());
        assert!(validator.validate_identifier("列名", "WHERE").is_err());
    }

    #[test]
    fn test_safe_identifier_generation() {
        let pg_validator = DatabaseSecurityValidator::new(DatabaseType::PostgreSQL);
        let mysql_validator = DatabaseSecurityValidator::new(DatabaseType::MySQL);

        assert_eq!(pg_validator.get_safe_field_identifier("name").unwrap(), "\"name\"");
        assert_eq!(mysql_validator.get_safe_field_identifier("name").unwrap(), "`name`");
        assert_eq!(
            mysql_validator.get_safe_column_reference(Some("u"), "name").unwrap(),
            "`u`.`name`"
        );

        let err = pg_validator.get_safe_column_reference(Some("u;--"), "name").unwrap_err();
        assert!(matches!(err, QuickSearchError::ValidationError { .. }));
        assert!(mysql_validator.get_safe_field_identifier("123name").is_err());
    }
}
