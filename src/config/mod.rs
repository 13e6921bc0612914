//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

pub mod builders;
pub mod core;

pub use builders::{GlobalConfigBuilder, LoggingConfigBuilder};
pub use core::{GlobalConfig, LogLevel, LoggingConfig, init_logging};
