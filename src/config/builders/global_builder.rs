//! # 全局配置构建器模块
//!
//! 提供全局配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{GlobalConfig, LoggingConfig};
use crate::error::QuickSearchError;
use crate::security::DatabaseSecurityValidator;
use crate::types::{CacheConfig, DatabaseType};
use rat_logger::info;

/// 全局配置构建器
///
/// 提供链式配置接口，支持流畅的API调用
#[derive(Debug)]
pub struct GlobalConfigBuilder {
    database_type: Option<DatabaseType>,
    default_table_alias: Option<String>,
    cache: Option<CacheConfig>,
    logging: Option<LoggingConfig>,
}
impl GlobalConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            database_type: None,
            default_table_alias: None,
            cache: None,
            logging: None,
        }
    }

    /// 设置后端数据库类型
    ///
    /// # 参数
    ///
    /// * `db_type` - 数据库类型
    pub fn database_type(mut self, db_type: DatabaseType) -> Self {
        self.database_type = Some(db_type);
        self
    }

    /// 设置默认表别名
    pub fn default_table_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.default_table_alias = Some(alias.into());
        self
    }

    /// 设置条件缓存配置
    ///
    /// # 参数
    ///
    /// * `cache` - 缓存配置
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 设置日志配置
    ///
    /// # 参数
    ///
    /// * `logging` - 日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 构建全局配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<GlobalConfig, QuickSearchError> {
        let database_type = self
            .database_type
            .ok_or_else(|| crate::quick_error!(config, "数据库类型必须设置"))?;

        let logging = self
            .logging
            .ok_or_else(|| crate::quick_error!(config, "日志配置必须设置"))?;

        // 默认别名会直接拼入列引用，必须是安全标识符
        if let Some(ref alias) = self.default_table_alias {
            DatabaseSecurityValidator::new(database_type).validate_identifier("表别名", alias)?;
        }

        if let Some(ref cache) = self.cache {
            if cache.version.trim().is_empty() {
                return Err(crate::quick_error!(config, "缓存版本不能为空"));
            }
            if cache.key_prefix.trim().is_empty() {
                return Err(crate::quick_error!(config, "缓存键前缀不能为空"));
            }
            if cache.ttl_config.default_ttl_secs > cache.ttl_config.max_ttl_secs {
                return Err(crate::quick_error!(config, "默认TTL不能大于最大TTL"));
            }
        }

        info!(
            "创建全局配置: 数据库类型={}, 默认别名={:?}, 缓存={}",
            database_type,
            self.default_table_alias,
            self.cache.as_ref().map(|c| c.enabled).unwrap_or(false)
        );

        Ok(GlobalConfig {
            database_type,
            default_table_alias: self.default_table_alias,
            cache: self.cache,
            logging,
        })
    }
}
impl Default for GlobalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::core::LogLevel;
    use crate::error::QuickSearchError;

    fn logging() -> LoggingConfig {
        LoggingConfig {
            level: LogLevel::Info,
            console: false,
            structured: false,
        }
    }

    #[test]
    fn test_build_requires_database_type() {
        let result = GlobalConfigBuilder::new().logging(logging()).build();
        assert!(matches!(result, Err(QuickSearchError::ConfigError { .. })));
    }

    #[test]
    fn test_build_requires_logging() {
        let result = GlobalConfigBuilder::new().database_type(DatabaseType::SQLite).build();
        assert!(matches!(result, Err(QuickSearchError::ConfigError { .. })));
    }

    #[test]
    fn test_unsafe_alias_is_rejected() {
        let result = GlobalConfigBuilder::new()
            .database_type(DatabaseType::MySQL)
            .default_table_alias("u; DROP")
            .logging(logging())
            .build();
        assert!(matches!(result, Err(QuickSearchError::ValidationError { .. })));
    }

    #[test]
    fn test_invalid_cache_ttl_is_rejected() {
        let mut cache = CacheConfig::default();
        cache.ttl_config.default_ttl_secs = cache.ttl_config.max_ttl_secs + 1;
        let result = GlobalConfigBuilder::new()
            .database_type(DatabaseType::SQLite)
            .cache(cache)
            .logging(logging())
            .build();
        assert!(matches!(result, Err(QuickSearchError::ConfigError { .. })));
    }

    #[test]
    fn test_build_full_config() {
        let config = GlobalConfigBuilder::new()
            .database_type(DatabaseType::PostgreSQL)
            .default_table_alias("u")
            .cache(CacheConfig::default())
            .logging(logging())
            .build()
            .unwrap();
        assert_eq!(config.database_type, DatabaseType::PostgreSQL);
        assert_eq!(config.default_table_alias.as_deref(), Some("u"));
        assert!(config.cache.is_some());
    }
}
