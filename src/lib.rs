//! rat_quicksearch - 结构化搜索条件引擎
//!
//! 将规范化的搜索条件树（字段、值、排除值、范围、比较、模式匹配、嵌套 AND/OR 组以及主条件）
//! 编译为带命名占位符的 WHERE 子句和参数表，支持 SQLite、PostgreSQL、MySQL 方言，
//! 并可通过确定性缓存键回放已编译的条件

// 导出所有公共模块
pub mod error;
pub mod i18n;
pub mod types;
pub mod conversion;
pub mod mapping;
pub mod generator;
pub mod condition;
pub mod cache;
pub mod manager;
pub mod security;
pub mod config;

// 重新导出常用类型和函数
pub use error::{QuickSearchError, QuickSearchResult};
pub use types::*;
pub use conversion::{ConversionHints, ConvertedValue, FieldConversion, ValueConversion};
pub use conversion::builtin::{AgeDateConversion, CastConversion, LowerCaseConversion};
pub use mapping::{ColumnResolver, FieldMapping, QueryField, ResolvedFields, TableColumnResolver};
pub use generator::{QueryPlatform, create_platform};
pub use condition::{
    CompiledCondition, ConditionGenerator, QuerySink, SortDirection, SqlConditionGenerator, SqlQueryBuilder,
    create_condition_generator, create_condition_generator_with_cache,
};
pub use cache::{CacheManager, CacheStats, CacheStore, CachedConditionGenerator, MemoryCacheStore};
pub use manager::{get_all_registered_field_sets, get_field_set, register_field_set};
pub use config::{GlobalConfig, GlobalConfigBuilder, LogLevel, LoggingConfig, LoggingConfigBuilder, init_logging};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quicksearch库
///
/// 初始化多语言错误消息系统
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
