//! # 配置构建器模块
//!
//! 提供所有配置类型的构建器实现，支持链式调用和严格验证

pub mod global_builder;
pub mod logging_builder;

pub use global_builder::GlobalConfigBuilder;
pub use logging_builder::LoggingConfigBuilder;
