//! 缓存存储后端
//!
//! 条件缓存只依赖键值存储的 get/set(ttl) 两个操作

use crate::error::QuickSearchResult;
use crate::types::{CacheConfig, CacheStrategy};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use rat_logger::{debug, info};
use rat_memcache::types::EvictionStrategy;
use rat_memcache::{CacheOptions, RatMemCache, RatMemCacheBuilder};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 缓存存储trait
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> QuickSearchResult<Option<Vec<u8>>>;

    /// 写入缓存，`ttl_secs` 为 0 表示不过期
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> QuickSearchResult<()>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// 进程内缓存存储，读取时惰性过期
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数（含尚未清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> QuickSearchResult<Option<Vec<u8>>> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => match entry.expires_at {
                Some(deadline) if Instant::now() >= deadline => true,
                _ => return Ok(Some(entry.value.clone())),
            },
        };

        if expired {
            self.entries.remove(key);
            debug!("内存缓存条目已过期: key={}", key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> QuickSearchResult<()> {
        let expires_at = (ttl_secs > 0).then(|| Instant::now() + Duration::from_secs(ttl_secs));
        self.entries.insert(key.to_string(), MemoryEntry { value, expires_at });
        Ok(())
    }
}

/// 基于 rat_memcache 的 L1/L2 缓存存储
pub struct RatMemCacheStore {
    cache: RatMemCache,
}

impl std::fmt::Debug for RatMemCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatMemCacheStore").finish_non_exhaustive()
    }
}

impl RatMemCacheStore {
    /// 根据缓存配置创建存储
    pub async fn new(config: &CacheConfig) -> QuickSearchResult<Self> {
        debug!("创建 rat_memcache 存储，配置: {:?}", config);

        let l2 = config.l2_config.as_ref();
        let builder = RatMemCacheBuilder::new()
            .l1_config(rat_memcache::config::L1Config {
                max_memory: config.l1_config.max_memory_mb * 1024 * 1024,
                max_entries: config.l1_config.max_capacity,
                eviction_strategy: match config.strategy {
                    CacheStrategy::Lru => EvictionStrategy::Lru,
                    CacheStrategy::Lfu => EvictionStrategy::Lfu,
                    CacheStrategy::Fifo => EvictionStrategy::Fifo,
                    CacheStrategy::Custom(_) => EvictionStrategy::Lru,
                },
            })
            .l2_config(rat_memcache::config::L2Config {
                enable_l2_cache: l2.is_some(),
                data_dir: l2.map(|c| PathBuf::from(&c.storage_path)),
                max_disk_size: l2.map(|c| c.max_disk_mb as u64 * 1024 * 1024).unwrap_or(500 * 1024 * 1024),
                write_buffer_size: 64 * 1024 * 1024,
                max_write_buffer_number: 3,
                block_cache_size: 16 * 1024 * 1024,
                // 条件快照通常很小，只压缩较大的条目
                enable_lz4: true,
                compression_threshold: 1024,
                compression_max_threshold: 10 * 1024,
                compression_level: l2.map(|c| c.compression_level).unwrap_or(6),
                background_threads: 2,
                clear_on_startup: l2.map(|c| c.clear_on_startup).unwrap_or(false),
                cache_size_mb: l2.map(|c| c.max_disk_mb).unwrap_or(500),
                max_file_size_mb: l2.map(|c| c.max_disk_mb / 2).unwrap_or(250),
                smart_flush_enabled: true,
                smart_flush_base_interval_ms: 100,
                smart_flush_min_interval_ms: 20,
                smart_flush_max_interval_ms: 500,
                smart_flush_write_rate_threshold: 10000,
                smart_flush_accumulated_bytes_threshold: 4 * 1024 * 1024,
                cache_warmup_strategy: rat_memcache::config::CacheWarmupStrategy::Recent,
                zstd_compression_level: None,
                l2_write_strategy: "write_through".to_string(),
                l2_write_threshold: 1024,
                l2_write_ttl_threshold: 3600,
            })
            .ttl_config(rat_memcache::config::TtlConfig {
                expire_seconds: Some(config.ttl_config.default_ttl_secs),
                cleanup_interval: config.ttl_config.check_interval_secs,
                max_cleanup_entries: 1000,
                lazy_expiration: true,
                active_expiration: true,
            })
            .performance_config(rat_memcache::config::PerformanceConfig {
                worker_threads: 4,
                enable_concurrency: true,
                read_write_separation: true,
                batch_size: 1000,
                enable_warmup: true,
                large_value_threshold: 10240,
            })
            .logging_config(rat_memcache::config::LoggingConfig {
                level: "INFO".to_string(),
                enable_colors: true,
                show_timestamp: true,
                enable_performance_logs: false,
                enable_audit_logs: false,
                enable_cache_logs: true,
                enable_logging: true,
                enable_async: false,
                batch_size: 2048,
                batch_interval_ms: 25,
                buffer_size: 16384,
            });

        let cache = builder
            .build()
            .await
            .map_err(|e| crate::quick_error!(cache, format!("创建缓存失败: {}", e)))?;

        info!(
            "条件缓存存储初始化成功 - L1容量: {}, L1内存: {}MB, L2磁盘: {}MB, 策略: {:?}",
            config.l1_config.max_capacity,
            config.l1_config.max_memory_mb,
            l2.map(|c| c.max_disk_mb).unwrap_or(0),
            config.strategy
        );

        Ok(Self { cache })
    }
}

#[async_trait]
impl CacheStore for RatMemCacheStore {
    async fn get(&self, key: &str) -> QuickSearchResult<Option<Vec<u8>>> {
        self.cache
            .get(key)
            .await
            .map(|data| data.map(|bytes| bytes.to_vec()))
            .map_err(|e| crate::quick_error!(cache, format!("读取缓存失败: {}", e)))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> QuickSearchResult<()> {
        let options = CacheOptions {
            ttl_seconds: (ttl_secs > 0).then_some(ttl_secs),
            ..Default::default()
        };
        self.cache
            .set_with_options(key.to_string(), Bytes::from(value), &options)
            .await
            .map_err(|e| crate::quick_error!(cache, format!("写入缓存失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryCacheStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", b"value".to_vec(), 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_overwrite() {
        let store = MemoryCacheStore::new();
        store.set("k", b"a".to_vec(), 0).await.unwrap();
        store.set("k", b"b".to_vec(), 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemoryCacheStore::new();
        store
            .entries
            .insert(
                "old".to_string(),
                MemoryEntry {
                    value: b"x".to_vec(),
                    expires_at: Some(Instant::now()),
                },
            );
        assert_eq!(store.get("old").await.unwrap(), None);
        assert!(store.is_empty());
    }
}
