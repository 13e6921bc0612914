use serde::{Deserialize, Serialize};

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存策略
    pub strategy: CacheStrategy,
    /// 缓存版本标识，变更此值可使所有条件缓存失效
    #[serde(default = "default_cache_version")]
    pub version: String,
    /// 缓存键前缀
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// L1 缓存配置
    pub l1_config: L1CacheConfig,
    /// L2 缓存配置（可选）
    pub l2_config: Option<L2CacheConfig>,
    /// TTL 配置
    pub ttl_config: TtlConfig,
}

/// 默认缓存版本
fn default_cache_version() -> String {
    "v1".to_string()
}

fn default_key_prefix() -> String {
    "rat_quicksearch".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: CacheStrategy::Lru,
            l1_config: L1CacheConfig::default(),
            l2_config: None,
            ttl_config: TtlConfig::default(),
            version: default_cache_version(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// 缓存策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheStrategy {
    /// LRU（最近最少使用）
    Lru,
    /// LFU（最少使用频率）
    Lfu,
    /// FIFO（先进先出）
    Fifo,
    /// 自定义策略
    Custom(String),
}

/// L1 缓存配置（内存缓存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L1CacheConfig {
    /// 最大容量（条目数）
    pub max_capacity: usize,
    /// 最大内存使用（MB）
    pub max_memory_mb: usize,
    /// 是否启用统计
    pub enable_stats: bool,
}

impl Default for L1CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_memory_mb: 64,
            enable_stats: true,
        }
    }
}

/// L2 缓存配置（磁盘缓存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L2CacheConfig {
    /// 存储路径
    pub storage_path: String,
    /// 最大磁盘使用（MB）
    pub max_disk_mb: usize,
    /// 压缩级别（0-22）
    pub compression_level: i32,
    /// 启动时清空缓存目录
    pub clear_on_startup: bool,
}

/// TTL 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlConfig {
    /// 默认 TTL（秒）
    pub default_ttl_secs: u64,
    /// 最大 TTL（秒）
    pub max_ttl_secs: u64,
    /// TTL 检查间隔（秒）
    pub check_interval_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            max_ttl_secs: 86400,
            check_interval_secs: 300,
        }
    }
}

impl TtlConfig {
    /// 将请求的 TTL 限制在最大值以内，0 表示使用默认值
    pub fn effective_ttl(&self, requested: u64) -> u64 {
        let ttl = if requested == 0 { self.default_ttl_secs } else { requested };
        ttl.min(self.max_ttl_secs)
    }
}
