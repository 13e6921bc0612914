//! SQL 条件生成器
//!
//! 解析字段映射、编译主条件与主体条件，并将结果应用到查询对象

use super::{CompiledCondition, ConditionGenerator, QuerySink};
use crate::error::QuickSearchResult;
use crate::generator::{create_platform, CompileState, QueryGenerator, QueryPlatform};
use crate::mapping::{ColumnResolver, FieldConfigBuilder, FieldMapping, ResolvedFields, TableColumnResolver};
use crate::types::{DatabaseType, ParameterTable, SearchCondition};
use async_trait::async_trait;
use rat_logger::{debug, warn};
use std::sync::Arc;

/// 字段配置状态：构建中、已解析锁定或编译失败
#[derive(Debug)]
enum FieldState {
    Configuring(FieldConfigBuilder),
    Resolved(ResolvedFields),
    /// 编译失败后实例不可再用
    Failed(String),
}

/// SQL 条件生成器
pub struct SqlConditionGenerator {
    condition: SearchCondition,
    platform: Box<dyn QueryPlatform>,
    resolver: Arc<dyn ColumnResolver>,
    fields: FieldState,
    compiled: Option<CompiledCondition>,
    query_updated: bool,
}

impl SqlConditionGenerator {
    /// 创建新的条件生成器
    pub fn new(
        condition: SearchCondition,
        platform: Box<dyn QueryPlatform>,
        resolver: Arc<dyn ColumnResolver>,
    ) -> Self {
        let builder = FieldConfigBuilder::new(Arc::clone(condition.field_set()));
        Self {
            condition,
            platform,
            resolver,
            fields: FieldState::Configuring(builder),
            compiled: None,
            query_updated: false,
        }
    }

    /// 使用默认列解析器创建条件生成器
    pub fn for_database(condition: SearchCondition, db_type: DatabaseType) -> Self {
        Self::new(
            condition,
            create_platform(db_type),
            Arc::new(TableColumnResolver::new(db_type)),
        )
    }

    /// 链式声明字段映射
    pub fn with_mapping(mut self, mapping: FieldMapping) -> QuickSearchResult<Self> {
        self.configure(mapping)?;
        Ok(self)
    }

    /// 编译（仅执行一次）并返回结果
    pub fn compile(&mut self) -> QuickSearchResult<&CompiledCondition> {
        self.compile_with(None)
    }

    /// 编译，可传入已编译的主条件片段代替重新编译主条件
    fn compile_with(&mut self, primary: Option<CompiledCondition>) -> QuickSearchResult<&CompiledCondition> {
        if self.compiled.is_none() {
            let result = self.run_compile(primary);
            let compiled = self.fail_on_error(result)?;
            self.compiled = Some(compiled);
        }
        self.compiled
            .as_ref()
            .ok_or_else(|| crate::quick_error!(bad_method_call, "条件尚未编译"))
    }

    /// 编译失败后进入终止状态，之后的配置与编译调用都会被拒绝
    fn fail_on_error<T>(&mut self, result: QuickSearchResult<T>) -> QuickSearchResult<T> {
        if let Err(e) = &result {
            if !matches!(self.fields, FieldState::Failed(_)) {
                warn!(
                    "条件编译失败，生成器不可再用: 字段集={}, 错误={}",
                    self.condition.field_set().name(),
                    e
                );
                self.fields = FieldState::Failed(e.to_string());
            }
        }
        result
    }

    /// 首次使用时解析字段映射，解析后映射被锁定
    fn resolve_fields(&mut self) -> QuickSearchResult<()> {
        match &self.fields {
            FieldState::Configuring(builder) => {
                let resolved = builder.clone().resolve(self.resolver.as_ref())?;
                self.fields = FieldState::Resolved(resolved);
                Ok(())
            }
            FieldState::Resolved(_) => Ok(()),
            FieldState::Failed(reason) => Err(crate::quick_error!(
                bad_method_call,
                format!("条件编译已失败，请使用新的实例: {}", reason)
            )),
        }
    }

    fn query_generator(&self) -> QuickSearchResult<QueryGenerator<'_>> {
        match &self.fields {
            FieldState::Resolved(resolved) => Ok(QueryGenerator::new(
                self.condition.field_set(),
                resolved,
                self.platform.as_ref(),
            )),
            _ => Err(crate::quick_error!(bad_method_call, "字段映射尚未解析")),
        }
    }

    /// 单独编译主条件，使用独立的编译状态
    fn run_compile_primary(&mut self) -> QuickSearchResult<Option<CompiledCondition>> {
        if self.condition.primary_condition().is_none() {
            return Ok(None);
        }
        self.resolve_fields()?;

        let generator = self.query_generator()?;
        let mut state = CompileState::new();
        let where_clause = match self.condition.primary_condition() {
            Some(primary) => generator.compile(primary.values_group(), &mut state)?,
            None => String::new(),
        };
        debug!(
            "主条件编译完成: 字段集={}, 参数数量={}",
            self.condition.field_set().name(),
            state.parameters().len()
        );
        Ok(Some(CompiledCondition {
            where_clause,
            parameters: state.into_parameters(),
        }))
    }

    fn run_compile(&mut self, primary: Option<CompiledCondition>) -> QuickSearchResult<CompiledCondition> {
        self.resolve_fields()?;
        let generator = self.query_generator()?;

        // 主条件先编译，占位符序号排在主体条件之前
        let (primary, mut state) = match (self.condition.primary_condition(), primary) {
            (Some(_), Some(fragment)) => (
                fragment.where_clause,
                CompileState::with_parameters(fragment.parameters),
            ),
            (Some(primary), None) => {
                let mut state = CompileState::new();
                let where_clause = generator.compile(primary.values_group(), &mut state)?;
                (where_clause, state)
            }
            (None, _) => (String::new(), CompileState::new()),
        };
        let main = generator.compile(self.condition.values_group(), &mut state)?;

        let where_clause = match (primary.is_empty(), main.is_empty()) {
            (true, _) => main,
            (false, true) => format!("({})", primary),
            (false, false) => format!("{} AND {}", primary, main),
        };

        debug!(
            "条件编译完成: 字段集={}, 参数数量={}",
            self.condition.field_set().name(),
            state.parameters().len()
        );

        Ok(CompiledCondition {
            where_clause,
            parameters: state.into_parameters(),
        })
    }
}

#[async_trait]
impl ConditionGenerator for SqlConditionGenerator {
    fn configure(&mut self, mapping: FieldMapping) -> QuickSearchResult<()> {
        match &mut self.fields {
            FieldState::Configuring(builder) if self.compiled.is_none() => builder.configure(mapping),
            FieldState::Failed(reason) => Err(crate::quick_error!(
                bad_method_call,
                format!("条件编译已失败，无法再配置字段 '{}': {}", mapping.field(), reason)
            )),
            _ => Err(crate::quick_error!(
                bad_method_call,
                format!("条件已生成，无法再配置字段 '{}'", mapping.field())
            )),
        }
    }

    async fn where_clause(&mut self, prepend: &str) -> QuickSearchResult<String> {
        let compiled = self.compile()?;
        if compiled.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}{}", prepend, compiled.where_clause))
    }

    async fn primary_fragment(&mut self) -> QuickSearchResult<Option<CompiledCondition>> {
        if self.compiled.is_some() {
            return Err(crate::quick_error!(bad_method_call, "条件已生成，无法再单独编译主条件"));
        }
        let result = self.run_compile_primary();
        self.fail_on_error(result)
    }

    async fn where_clause_with_primary(
        &mut self,
        primary: CompiledCondition,
        prepend: &str,
    ) -> QuickSearchResult<String> {
        let compiled = self.compile_with(Some(primary))?;
        if compiled.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}{}", prepend, compiled.where_clause))
    }

    async fn update_query(&mut self, sink: &mut dyn QuerySink) -> QuickSearchResult<bool> {
        if self.query_updated {
            warn!(
                "查询对象已被更新过，忽略重复调用: 字段集={}",
                self.condition.field_set().name()
            );
            return Ok(false);
        }

        self.compile()?.apply_to(sink);
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
        &self.condition
    }

    fn field_mappings(&self) -> &[FieldMapping] {
        match &self.fields {
            FieldState::Configuring(builder) => builder.mappings(),
            FieldState::Resolved(resolved) => resolved.mappings(),
            FieldState::Failed(_) => &[],
        }
    }

    fn database_type(&self) -> DatabaseType {
        self.platform.database_type()
    }

    fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }
}
