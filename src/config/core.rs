//! # 配置管理模块 - 核心配置类型
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

use crate::cache::CacheManager;
use crate::condition::{ConditionGenerator, create_condition_generator, create_condition_generator_with_cache};
use crate::error::QuickSearchError;
use crate::types::{CacheConfig, DatabaseType, SearchCondition};
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 全局配置
///
/// 负责管理条件生成所需的后端类型、默认表别名、缓存与日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// 后端数据库类型
    pub database_type: DatabaseType,
    /// 字段映射未写表别名时使用的默认别名
    pub default_table_alias: Option<String>,
    /// 条件缓存配置，未设置时不启用缓存
    pub cache: Option<CacheConfig>,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台
    pub console: bool,
    /// 是否启用结构化日志
    pub structured: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 错误级别
    Error,
    /// 警告级别
    Warn,
    /// 信息级别
    Info,
    /// 调试级别
    Debug,
    /// 跟踪级别
    Trace,
}

impl GlobalConfig {
    /// 创建全局配置构建器
    pub fn builder() -> super::builders::GlobalConfigBuilder {
        super::builders::GlobalConfigBuilder::new()
    }

    /// 从配置文件加载配置，`.toml` 按 TOML 解析，其余按 JSON 解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> Result<Self, QuickSearchError> {
        let content = std::fs::read_to_string(config_path.as_ref())?;

        let config: GlobalConfig = if is_toml(config_path.as_ref()) {
            toml::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> Result<(), QuickSearchError> {
        let content = if is_toml(config_path.as_ref()) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 按缓存配置创建缓存管理器，未配置或未启用时返回 `None`
    pub async fn create_cache_manager(&self) -> Result<Option<Arc<CacheManager>>, QuickSearchError> {
        match &self.cache {
            Some(cache) if cache.enabled => Ok(Some(Arc::new(CacheManager::new(cache.clone()).await?))),
            _ => Ok(None),
        }
    }

    /// 创建条件生成器，提供缓存管理器时包装缓存层
    pub fn condition_generator(
        &self,
        condition: SearchCondition,
        cache_manager: Option<Arc<CacheManager>>,
    ) -> Box<dyn ConditionGenerator> {
        let alias = self.default_table_alias.as_deref();
        match cache_manager {
            Some(cache_manager) => {
                create_condition_generator_with_cache(condition, self.database_type, alias, cache_manager)
            }
            None => create_condition_generator(condition, self.database_type, alias),
        }
    }
}

fn is_toml(path: &std::path::Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

impl LoggingConfig {
    /// 创建日志配置构建器
    pub fn builder() -> super::builders::LoggingConfigBuilder {
        super::builders::LoggingConfigBuilder::new()
    }
}

impl From<LogLevel> for rat_logger::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => rat_logger::LevelFilter::Error,
            LogLevel::Warn => rat_logger::LevelFilter::Warn,
            LogLevel::Info => rat_logger::LevelFilter::Info,
            LogLevel::Debug => rat_logger::LevelFilter::Debug,
            LogLevel::Trace => rat_logger::LevelFilter::Trace,
        }
    }
}

/// 按日志配置初始化 rat_logger
///
/// 本库不会自动初始化日志，调用者可以自行初始化或调用此函数
pub fn init_logging(config: &LoggingConfig) -> Result<(), QuickSearchError> {
    if !config.console {
        return Ok(());
    }

    rat_logger::LoggerBuilder::new()
        .with_level(config.level.into())
        .add_terminal_with_config(rat_logger::handler::term::TermConfig::default())
        .init()
        .map_err(|e| crate::quick_error!(config, format!("日志初始化失败: {}", e)))?;

    info!("日志系统初始化完成: 级别={:?}, 结构化={}", config.level, config.structured);
    Ok(())
}
