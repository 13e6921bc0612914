//! 缓存条件生成器
//!
//! 包装任意条件生成器，相同的（条件树, 字段映射）直接回放已缓存的 WHERE 子句与参数

use super::cache_manager::CacheManager;
use crate::condition::{CompiledCondition, ConditionGenerator, QuerySink};
use crate::error::QuickSearchResult;
use crate::mapping::FieldMapping;
use crate::types::{DatabaseType, ParameterTable, SearchCondition};
use async_trait::async_trait;
use rat_logger::{debug, warn};
use std::sync::Arc;

/// 带缓存功能的条件生成器包装器
pub struct CachedConditionGenerator<G: ConditionGenerator> {
    /// 内部真实的条件生成器
    inner: G,
    /// 缓存管理器
    cache_manager: Arc<CacheManager>,
    cache_key: Option<String>,
    compiled: Option<CompiledCondition>,
    cache_hit: bool,
    query_updated: bool,
}

impl<G: ConditionGenerator> CachedConditionGenerator<G> {
    /// 创建新的缓存条件生成器
    pub fn new(inner: G, cache_manager: Arc<CacheManager>) -> Self {
        Self {
            inner,
            cache_manager,
            cache_key: None,
            compiled: None,
            cache_hit: false,
            query_updated: false,
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// 缓存键，首次计算后固定
    pub fn cache_key(&mut self) -> &str {
        let inner = &self.inner;
        let cache_manager = &self.cache_manager;
        self.cache_key.get_or_insert_with(|| {
            cache_manager.generate_condition_cache_key(
                inner.database_type(),
                inner.search_condition(),
                inner.field_mappings(),
            )
        })
    }

    /// 本次结果是否来自缓存
    pub fn is_cache_hit(&self) -> bool {
        self.cache_hit
    }

    async fn ensure_compiled(&mut self) -> QuickSearchResult<&CompiledCondition> {
        if self.compiled.is_none() {
            let compiled = self.load_or_compile().await?;
            self.compiled = Some(compiled);
        }
        self.compiled
            .as_ref()
            .ok_or_else(|| crate::quick_error!(bad_method_call, "条件尚未编译"))
    }

    async fn load_or_compile(&mut self) -> QuickSearchResult<CompiledCondition> {
        let key = self.cache_key().to_string();

        // 先检查缓存
        match self.cache_manager.get_compiled(&key).await {
            Ok(Some(cached)) => {
                debug!("条件缓存命中: key={}", key);
                self.cache_hit = true;
                return Ok(cached);
            }
            Ok(None) => {
                debug!("条件缓存未命中: key={}", key);
            }
            Err(e) => {
                warn!("读取条件缓存失败: {}, 继续编译", e);
            }
        }

        // 缓存未命中或读取失败，委托内部生成器编译；主条件片段可单独复用
        let where_clause = match self.load_primary_fragment().await? {
            Some(primary) => self.inner.where_clause_with_primary(primary, "").await?,
            None => self.inner.where_clause("").await?,
        };
        let compiled = CompiledCondition {
            where_clause,
            parameters: self.inner.parameters()?.clone(),
        };

        if let Err(e) = self.cache_manager.store_compiled(&key, &compiled).await {
            warn!("写入条件缓存失败: {}", e);
        }

        Ok(compiled)
    }

    /// 读取或编译主条件片段，非空片段以独立键写入缓存
    async fn load_primary_fragment(&mut self) -> QuickSearchResult<Option<CompiledCondition>> {
        let Some(key) = self.cache_manager.generate_primary_cache_key(
            self.inner.database_type(),
            self.inner.search_condition(),
            self.inner.field_mappings(),
        ) else {
            return Ok(None);
        };

        match self.cache_manager.get_compiled(&key).await {
            Ok(Some(fragment)) => {
                debug!("主条件缓存命中: key={}", key);
                return Ok(Some(fragment));
            }
            Ok(None) => {
                debug!("主条件缓存未命中: key={}", key);
            }
            Err(e) => {
                warn!("读取主条件缓存失败: {}, 继续编译", e);
            }
        }

        let fragment = self.inner.primary_fragment().await?;
        if let Some(fragment) = &fragment {
            if let Err(e) = self.cache_manager.store_compiled(&key, fragment).await {
                warn!("写入主条件缓存失败: {}", e);
            }
        }
        Ok(fragment)
    }
}

#[async_trait]
impl<G: ConditionGenerator> ConditionGenerator for CachedConditionGenerator<G> {
    fn configure(&mut self, mapping: FieldMapping) -> QuickSearchResult<()> {
        if self.compiled.is_some() {
            return Err(crate::quick_error!(
                bad_method_call,
                format!("条件已生成，无法再配置字段 '{}'", mapping.field())
            ));
        }
        // 缓存键依赖映射声明，配置变化后需重新计算
        self.cache_key = None;
        self.inner.configure(mapping)
    }

    async fn where_clause(&mut self, prepend: &str) -> QuickSearchResult<String> {
        let compiled = self.ensure_compiled().await?;
        if compiled.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}{}", prepend, compiled.where_clause))
    }

    async fn update_query(&mut self, sink: &mut dyn QuerySink) -> QuickSearchResult<bool> {
        if self.query_updated {
            warn!(
                "查询对象已被更新过，忽略重复调用: 字段集={}",
                self.inner.search_condition().field_set().name()
            );
            return Ok(false);
        }

        self.ensure_compiled().await?.apply_to(sink);
        self.query_updated = true;
        Ok(true)
    }

    fn parameters(&self) -> QuickSearchResult<&ParameterTable> {
        self.compiled
            .as_ref()
            .map(|compiled| &compiled.parameters)
            .ok_or_else(|| crate::quick_error!(bad_method_call, "请先生成 WHERE 子句再获取参数"))
    }

    fn search_condition(&self) -> &SearchCondition {
        self.inner.search_condition()
    }

    fn field_mappings(&self) -> &[FieldMapping] {
        self.inner.field_mappings()
    }

    fn database_type(&self) -> DatabaseType {
        self.inner.database_type()
    }

    fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }
}
