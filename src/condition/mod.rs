//! 条件生成器模块
//!
//! 提供统一的条件生成接口，屏蔽编译与缓存实现的差异

use crate::cache::{CacheManager, CachedConditionGenerator};
use crate::error::QuickSearchResult;
use crate::generator::create_platform;
use crate::mapping::{FieldMapping, TableColumnResolver};
use crate::types::{DatabaseType, ParameterTable, SearchCondition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod query_builder;
mod sql_condition_generator;

pub use query_builder::{QuerySink, SortDirection, SqlQueryBuilder};
pub use sql_condition_generator::SqlConditionGenerator;

/// 编译结果快照，同时也是缓存中保存的内容
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledCondition {
    pub where_clause: String,
    pub parameters: ParameterTable,
}

impl CompiledCondition {
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_empty()
    }

    /// 将结果应用到查询对象
    pub(crate) fn apply_to(&self, sink: &mut dyn QuerySink) {
        if self.where_clause.is_empty() {
            return;
        }
        sink.append_where(&self.where_clause);
        for parameter in &self.parameters {
            sink.bind_parameter(&parameter.name, parameter.value.clone(), parameter.param_type);
        }
    }
}

/// 条件生成器trait
///
/// 生命周期是一次性的：首次生成 WHERE 子句后配置被冻结
#[async_trait]
pub trait ConditionGenerator: Send + Sync {
    /// 声明字段映射，生成之后调用返回 BadMethodCall
    fn configure(&mut self, mapping: FieldMapping) -> QuickSearchResult<()>;

    /// 获取 WHERE 子句，首次调用时编译。条件为空时返回空字符串，否则返回 `prepend + 表达式`
    async fn where_clause(&mut self, prepend: &str) -> QuickSearchResult<String>;

    /// 单独编译主条件片段，供缓存层按主条件复用
    ///
    /// 返回 `None` 表示没有主条件或实现不支持分段编译
    async fn primary_fragment(&mut self) -> QuickSearchResult<Option<CompiledCondition>> {
        Ok(None)
    }

    /// 使用已编译的主条件片段完成编译，主体条件的占位符序号接在片段之后
    ///
    /// 默认实现忽略片段并完整编译
    async fn where_clause_with_primary(
        &mut self,
        primary: CompiledCondition,
        prepend: &str,
    ) -> QuickSearchResult<String> {
        let _ = primary;
        self.where_clause(prepend).await
    }

    /// 将 WHERE 子句和参数应用到查询对象
    ///
    /// 重复调用会记录警告并返回 `Ok(false)`，不会重复追加
    async fn update_query(&mut self, sink: &mut dyn QuerySink) -> QuickSearchResult<bool>;

    /// 获取参数表，编译前调用返回 BadMethodCall
    fn parameters(&self) -> QuickSearchResult<&ParameterTable>;

    fn search_condition(&self) -> &SearchCondition;

    /// 已声明的字段映射（按声明顺序）
    fn field_mappings(&self) -> &[FieldMapping];

    fn database_type(&self) -> DatabaseType;

    /// 是否已经生成
    fn is_compiled(&self) -> bool;
}

/// 根据数据库类型创建条件生成器
///
/// `default_alias` 用于未写表别名的字段映射
pub fn create_condition_generator(
    condition: SearchCondition,
    db_type: DatabaseType,
    default_alias: Option<&str>,
) -> Box<dyn ConditionGenerator> {
    Box::new(build_sql_generator(condition, db_type, default_alias))
}

/// 根据数据库类型和缓存管理器创建带缓存的条件生成器
pub fn create_condition_generator_with_cache(
    condition: SearchCondition,
    db_type: DatabaseType,
    default_alias: Option<&str>,
    cache_manager: Arc<CacheManager>,
) -> Box<dyn ConditionGenerator> {
    let base_generator = build_sql_generator(condition, db_type, default_alias);
    Box::new(CachedConditionGenerator::new(base_generator, cache_manager))
}

fn build_sql_generator(
    condition: SearchCondition,
    db_type: DatabaseType,
    default_alias: Option<&str>,
) -> SqlConditionGenerator {
    let mut resolver = TableColumnResolver::new(db_type);
    if let Some(alias) = default_alias {
        resolver = resolver.with_default_alias(alias);
    }
    SqlConditionGenerator::new(condition, create_platform(db_type), Arc::new(resolver))
}
