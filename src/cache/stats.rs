//! 缓存统计模块
//!
//! 提供缓存性能统计和信息收集功能

use serde::{Deserialize, Serialize};

/// 缓存性能统计
#[derive(Debug, Clone, Default)]
pub struct CachePerformanceStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 缓存写入次数
    pub writes: u64,
    /// 因结果为空而跳过的写入次数
    pub skipped_writes: u64,
    /// 读写失败次数
    pub errors: u64,
    /// 总查询延迟（纳秒）
    pub total_query_latency_ns: u64,
    /// 总写入延迟（纳秒）
    pub total_write_latency_ns: u64,
    /// 查询次数
    pub query_count: u64,
    /// 写入次数
    pub write_count: u64,
}

impl CachePerformanceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// 计算平均查询延迟（毫秒）
    pub fn avg_query_latency_ms(&self) -> f64 {
        if self.query_count == 0 {
            0.0
        } else {
            (self.total_query_latency_ns as f64 / self.query_count as f64) / 1_000_000.0
        }
    }

    /// 计算平均写入延迟（毫秒）
    pub fn avg_write_latency_ms(&self) -> f64 {
        if self.write_count == 0 {
            0.0
        } else {
            (self.total_write_latency_ns as f64 / self.write_count as f64) / 1_000_000.0
        }
    }
}

/// 缓存统计信息快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub skipped_writes: u64,
    pub errors: u64,
    /// 缓存命中率
    pub hit_rate: f64,
    pub avg_query_latency_ms: f64,
    pub avg_write_latency_ms: f64,
}

impl From<&CachePerformanceStats> for CacheStats {
    fn from(stats: &CachePerformanceStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            skipped_writes: stats.skipped_writes,
            errors: stats.errors,
            hit_rate: stats.hit_rate(),
            avg_query_latency_ms: stats.avg_query_latency_ms(),
            avg_write_latency_ms: stats.avg_write_latency_ms(),
        }
    }
}
