//! 缓存管理器核心模块
//!
//! 在缓存存储之上负责编译结果的序列化、TTL 与统计

use super::key_generator::CacheKeyGenerator;
use super::stats::{CachePerformanceStats, CacheStats};
use super::store::{CacheStore, MemoryCacheStore, RatMemCacheStore};
use crate::condition::CompiledCondition;
use crate::error::QuickSearchResult;
use crate::mapping::FieldMapping;
use crate::types::{CacheConfig, DatabaseType, SearchCondition};
use rat_logger::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

/// 缓存管理器
#[derive(Clone)]
pub struct CacheManager {
    /// 内部缓存存储
    pub(crate) store: Arc<dyn CacheStore>,
    /// 缓存配置
    pub(crate) config: CacheConfig,
    pub(crate) key_generator: CacheKeyGenerator,
    /// 性能统计
    pub(crate) stats: Arc<RwLock<CachePerformanceStats>>,
    /// 原子计数器用于高频统计
    pub(crate) hits_counter: Arc<AtomicU64>,
    pub(crate) misses_counter: Arc<AtomicU64>,
    pub(crate) writes_counter: Arc<AtomicU64>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("hits", &self.hits_counter.load(Ordering::Relaxed))
            .field("misses", &self.misses_counter.load(Ordering::Relaxed))
            .field("writes", &self.writes_counter.load(Ordering::Relaxed))
            .finish()
    }
}

impl CacheManager {
    /// 使用 rat_memcache 存储创建缓存管理器
    pub async fn new(config: CacheConfig) -> QuickSearchResult<Self> {
        let store = RatMemCacheStore::new(&config).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// 使用进程内存储创建缓存管理器
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryCacheStore::new()))
    }

    /// 使用自定义存储创建缓存管理器
    pub fn with_store(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            key_generator: CacheKeyGenerator::from_config(&config),
            config,
            stats: Arc::new(RwLock::new(CachePerformanceStats::new())),
            hits_counter: Arc::new(AtomicU64::new(0)),
            misses_counter: Arc::new(AtomicU64::new(0)),
            writes_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// 生成条件缓存键
    pub fn generate_condition_cache_key(
        &self,
        db_type: DatabaseType,
        condition: &SearchCondition,
        mappings: &[FieldMapping],
    ) -> String {
        self.key_generator
            .generate_condition_cache_key(db_type, condition, mappings)
    }

    /// 生成主条件片段缓存键，没有主条件时返回 `None`
    pub fn generate_primary_cache_key(
        &self,
        db_type: DatabaseType,
        condition: &SearchCondition,
        mappings: &[FieldMapping],
    ) -> Option<String> {
        self.key_generator
            .generate_primary_cache_key(db_type, condition, mappings)
    }

    /// 读取缓存的编译结果
    ///
    /// 缓存禁用时直接返回 `None`；反序列化失败视为错误，由调用方按未命中处理
    pub async fn get_compiled(&self, key: &str) -> QuickSearchResult<Option<CompiledCondition>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let start_time = Instant::now();
        let result = self.store.get(key).await;
        let elapsed = start_time.elapsed();

        let compiled = match result {
            Ok(Some(data)) => match serde_json::from_slice::<CompiledCondition>(&data) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    self.record_error().await;
                    return Err(crate::quick_error!(
                        serialization,
                        format!("缓存条目反序列化失败: {}", e)
                    ));
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.record_error().await;
                return Err(e);
            }
        };

        let hit = compiled.is_some();
        if hit {
            self.hits_counter.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses_counter.fetch_add(1, Ordering::Relaxed);
        }
        if self.stats_enabled() {
            let mut stats = self.stats.write().await;
            stats.query_count += 1;
            stats.total_query_latency_ns += elapsed.as_nanos() as u64;
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }

        Ok(compiled)
    }

    /// 写入编译结果，空结果不写入
    ///
    /// 返回是否实际写入
    pub async fn store_compiled(&self, key: &str, compiled: &CompiledCondition) -> QuickSearchResult<bool> {
        if !self.config.enabled {
            return Ok(false);
        }

        if compiled.is_empty() {
            debug!("跳过缓存空条件: key={}", key);
            if self.stats_enabled() {
                self.stats.write().await.skipped_writes += 1;
            }
            return Ok(false);
        }

        let start_time = Instant::now();
        let serialized = serde_json::to_vec(compiled)?;
        let ttl = self.config.ttl_config.effective_ttl(0);

        if let Err(e) = self.store.set(key, serialized, ttl).await {
            self.record_error().await;
            return Err(e);
        }

        let elapsed = start_time.elapsed();
        self.writes_counter.fetch_add(1, Ordering::Relaxed);
        if self.stats_enabled() {
            let mut stats = self.stats.write().await;
            stats.writes += 1;
            stats.write_count += 1;
            stats.total_write_latency_ns += elapsed.as_nanos() as u64;
        }

        debug!("已缓存条件: key={}, 参数数量={}", key, compiled.parameters.len());
        Ok(true)
    }

    /// 是否记录详细统计（原子计数器始终记录）
    fn stats_enabled(&self) -> bool {
        self.config.l1_config.enable_stats
    }

    async fn record_error(&self) {
        if self.stats_enabled() {
            self.stats.write().await.errors += 1;
        }
    }

    /// 获取统计快照
    pub async fn get_stats(&self) -> CacheStats {
        CacheStats::from(&*self.stats.read().await)
    }

    pub fn hit_count(&self) -> u64 {
        self.hits_counter.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses_counter.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> u64 {
        self.writes_counter.load(Ordering::Relaxed)
    }
}
