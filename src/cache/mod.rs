//! 条件缓存模块
//!
//! 基于规范化编码摘要的缓存键，配合可替换的缓存存储（进程内 / rat_memcache），
//! 为条件生成器提供编译结果的回放能力。

pub mod stats;
pub mod key_generator;
pub mod store;
pub mod cache_manager;
pub mod cached_generator;

// 重新导出主要的公共类型和结构体
pub use stats::{CachePerformanceStats, CacheStats};
pub use key_generator::{CANONICAL_ENCODING_VERSION, CacheKeyGenerator, hash_values_group};
pub use store::{CacheStore, MemoryCacheStore, RatMemCacheStore};
pub use cache_manager::CacheManager;
pub use cached_generator::CachedConditionGenerator;
