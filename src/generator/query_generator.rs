//! 条件树编译器
//!
//! 递归遍历 `ValuesGroup`，为每个字段生成包含/排除子表达式，按组逻辑操作符组合，
//! 子组之间以 OR 组合。字面量默认注册为命名参数，由转换器决定是否内嵌

use crate::conversion::{render_template, ConversionHints, ConvertedValue};
use crate::error::QuickSearchResult;
use crate::generator::platform::{escape_like, QueryPlatform};
use crate::mapping::{QueryField, ResolvedFields};
use crate::types::{
    Compare, DataValue, FieldSet, ParameterTable, ParameterType, PatternMatch, PatternMatchType,
    Range, ValuesBag, ValuesGroup,
};
use std::collections::HashMap;

/// 单次编译的运行状态
///
/// 持有参数表、每个字段的占位符序号以及 (字段, 策略) -> 列表达式 的缓存。
/// 主条件与主体条件共享同一个状态，因此占位符不会重复
#[derive(Debug, Default)]
pub struct CompileState {
    parameters: ParameterTable,
    positions: HashMap<String, usize>,
    columns: HashMap<(String, Option<i32>), String>,
}

impl CompileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有参数表继续编译，新占位符序号接在已有序号之后
    pub fn with_parameters(parameters: ParameterTable) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for parameter in &parameters {
            let Some((base, index)) = parameter.name.rsplit_once('_') else {
                continue;
            };
            if let Ok(index) = index.parse::<usize>() {
                let next = positions.entry(base.to_string()).or_insert(0);
                *next = (*next).max(index + 1);
            }
        }
        Self {
            parameters,
            positions,
            columns: HashMap::new(),
        }
    }

    /// 注册参数并返回表达式中使用的 `:name` 引用
    pub fn bind(&mut self, field: &str, value: DataValue, param_type: ParameterType) -> String {
        let base = sanitize_placeholder(field);
        let position = self.positions.entry(base.clone()).or_insert(0);
        let name = format!("{}_{}", base, position);
        *position += 1;

        self.parameters.insert(name.clone(), value, param_type);
        format!(":{}", name)
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn into_parameters(self) -> ParameterTable {
        self.parameters
    }
}

/// 占位符只保留字母数字和下划线
fn sanitize_placeholder(field: &str) -> String {
    let sanitized: String = field
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "field".to_string()
    } else {
        sanitized
    }
}

/// 将非空片段用连接符拼接，`always_wrap` 为 false 时仅在多于一个片段时加括号
fn implode(glue: &str, parts: Vec<String>, always_wrap: bool) -> String {
    let parts: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    match parts.len() {
        0 => String::new(),
        1 if !always_wrap => parts.into_iter().collect(),
        _ => format!("({})", parts.join(glue)),
    }
}

/// 条件树编译器
pub struct QueryGenerator<'a> {
    field_set: &'a FieldSet,
    fields: &'a ResolvedFields,
    platform: &'a dyn QueryPlatform,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(field_set: &'a FieldSet, fields: &'a ResolvedFields, platform: &'a dyn QueryPlatform) -> Self {
        Self {
            field_set,
            fields,
            platform,
        }
    }

    /// 编译条件组，空组返回空字符串
    pub fn compile(&self, group: &ValuesGroup, state: &mut CompileState) -> QuickSearchResult<String> {
        let mut field_parts = Vec::with_capacity(group.fields().len());
        for (name, bag) in group.fields() {
            if !self.field_set.has(name) {
                return Err(crate::quick_error!(unknown_field, name));
            }
            let Some(field) = self.fields.get(name) else {
                crate::debug_log!("字段 {} 未配置映射，跳过", name);
                continue;
            };
            field_parts.push(self.compile_field(field, bag, state)?);
        }

        let fields = implode(group.logical().as_sql(), field_parts, true);

        let mut group_parts = Vec::with_capacity(group.groups().len());
        for child in group.groups() {
            group_parts.push(self.compile(child, state)?);
        }
        let groups = implode(" OR ", group_parts, true);

        // 两部分各自已加括号，组合时不再包裹
        Ok(match (fields.is_empty(), groups.is_empty()) {
            (false, false) => format!("{} AND {}", fields, groups),
            (false, true) => fields,
            _ => groups,
        })
    }

    fn compile_field(&self, field: &QueryField, bag: &ValuesBag, state: &mut CompileState) -> QuickSearchResult<String> {
        let inclusive = self.inclusive_fragments(field, bag, state)?;
        let exclusive = self.exclusive_fragments(field, bag, state)?;

        let inclusive = implode(" OR ", inclusive, true);
        let expression = if inclusive.is_empty() {
            implode(" AND ", exclusive, true)
        } else {
            let mut parts = vec![inclusive];
            parts.extend(exclusive);
            implode(" AND ", parts, false)
        };

        crate::debug_log!("字段 {} 编译结果: {}", field.name(), expression);
        Ok(expression)
    }

    fn inclusive_fragments(
        &self,
        field: &QueryField,
        bag: &ValuesBag,
        state: &mut CompileState,
    ) -> QuickSearchResult<Vec<String>> {
        let mut fragments = Vec::new();

        for single in bag.simple_values() {
            let (column, strategy) = self.column_for(field, single.value(), state)?;
            let value = self.materialize(field, single.value(), strategy, &column, state)?;
            fragments.push(format!("{} = {}", column, value));
        }

        for range in bag.ranges() {
            fragments.push(self.range_fragment(field, range, false, state)?);
        }

        let mut compares = Vec::new();
        for compare in bag.comparisons().iter().filter(|c| !c.is_exclusive()) {
            compares.push(self.compare_fragment(field, compare, state)?);
        }
        fragments.push(implode(" AND ", compares, false));

        for pattern in bag.pattern_matchers().iter().filter(|p| !p.is_exclusive()) {
            fragments.push(self.pattern_fragment(field, pattern, state)?);
        }

        Ok(fragments)
    }

    fn exclusive_fragments(
        &self,
        field: &QueryField,
        bag: &ValuesBag,
        state: &mut CompileState,
    ) -> QuickSearchResult<Vec<String>> {
        let mut fragments = Vec::new();

        for single in bag.excluded_simple_values() {
            let (column, strategy) = self.column_for(field, single.value(), state)?;
            let value = self.materialize(field, single.value(), strategy, &column, state)?;
            fragments.push(format!("{} <> {}", column, value));
        }

        for range in bag.excluded_ranges() {
            fragments.push(self.range_fragment(field, range, true, state)?);
        }

        for compare in bag.comparisons().iter().filter(|c| c.is_exclusive()) {
            fragments.push(self.compare_fragment(field, compare, state)?);
        }

        for pattern in bag.pattern_matchers().iter().filter(|p| p.is_exclusive()) {
            fragments.push(self.pattern_fragment(field, pattern, state)?);
        }

        Ok(fragments)
    }

    /// 区间片段
    ///
    /// 包含区间: `(col >= lo AND col <= hi)`，开区间端点使用 `>`/`<`；
    /// 排除区间取其逻辑补: `(col < lo OR col > hi)`，开区间端点使用 `<=`/`>=`
    fn range_fragment(
        &self,
        field: &QueryField,
        range: &Range,
        excluded: bool,
        state: &mut CompileState,
    ) -> QuickSearchResult<String> {
        // 区间两端使用下界的策略，保证同一区间只对应一个列表达式
        let (column, strategy) = self.column_for(field, range.lower(), state)?;
        let lower = self.materialize(field, range.lower(), strategy, &column, state)?;
        let upper = self.materialize(field, range.upper(), strategy, &column, state)?;

        let fragment = if excluded {
            let lower_op = if range.is_lower_inclusive() { "<" } else { "<=" };
            let upper_op = if range.is_upper_inclusive() { ">" } else { ">=" };
            format!("({} {} {} OR {} {} {})", column, lower_op, lower, column, upper_op, upper)
        } else {
            let lower_op = if range.is_lower_inclusive() { ">=" } else { ">" };
            let upper_op = if range.is_upper_inclusive() { "<=" } else { "<" };
            format!("({} {} {} AND {} {} {})", column, lower_op, lower, column, upper_op, upper)
        };
        Ok(fragment)
    }

    fn compare_fragment(
        &self,
        field: &QueryField,
        compare: &Compare,
        state: &mut CompileState,
    ) -> QuickSearchResult<String> {
        let (column, strategy) = self.column_for(field, compare.value(), state)?;
        let value = self.materialize(field, compare.value(), strategy, &column, state)?;
        Ok(format!("{} {} {}", column, compare.operator().as_str(), value))
    }

    /// 模式匹配片段
    ///
    /// 通配符放入绑定值中，用户输入中的 `%` `_` `\` 会被转义。模式值不经过值转换器
    fn pattern_fragment(
        &self,
        field: &QueryField,
        pattern: &PatternMatch,
        state: &mut CompileState,
    ) -> QuickSearchResult<String> {
        let (column, _) = self.column_for(field, &DataValue::String(pattern.value().to_string()), state)?;
        let negate = pattern.is_exclusive();
        let case_insensitive = pattern.is_case_insensitive();

        let fragment = match pattern.match_type().base() {
            PatternMatchType::Regex => {
                let placeholder = state.bind(
                    field.name(),
                    DataValue::String(pattern.value().to_string()),
                    ParameterType::String,
                );
                if case_insensitive && !self.platform.native_case_insensitive_regex() {
                    self.platform.regex_predicate(
                        &self.platform.lower(&column),
                        &self.platform.lower(&placeholder),
                        false,
                        negate,
                    )
                } else {
                    self.platform.regex_predicate(&column, &placeholder, case_insensitive, negate)
                }
            }
            base => {
                let escaped = escape_like(pattern.value());
                let value = match base {
                    PatternMatchType::Contains => format!("%{}%", escaped),
                    PatternMatchType::StartsWith => format!("{}%", escaped),
                    PatternMatchType::EndsWith => format!("%{}", escaped),
                    _ => escaped,
                };
                let placeholder = state.bind(field.name(), DataValue::String(value), ParameterType::String);
                if case_insensitive {
                    self.platform.like_predicate(
                        &self.platform.lower(&column),
                        &self.platform.lower(&placeholder),
                        negate,
                    )
                } else {
                    self.platform.like_predicate(&column, &placeholder, negate)
                }
            }
        };
        Ok(fragment)
    }

    /// 选择转换策略：先询问值转换器，再询问列转换器
    fn conversion_strategy(&self, field: &QueryField, value: &DataValue) -> Option<i32> {
        let descriptor = field.descriptor();
        let hints = ConversionHints::new(descriptor, self.platform.database_type());
        field
            .value_conversion()
            .and_then(|c| c.conversion_strategy(value, descriptor.options(), &hints))
            .or_else(|| {
                field
                    .field_conversion()
                    .and_then(|c| c.conversion_strategy(value, descriptor.options(), &hints))
            })
    }

    /// 获取 (字段, 策略) 对应的列表达式，结果在本次编译内缓存
    fn column_for(
        &self,
        field: &QueryField,
        value: &DataValue,
        state: &mut CompileState,
    ) -> QuickSearchResult<(String, Option<i32>)> {
        let strategy = self.conversion_strategy(field, value);
        let key = (field.name().to_string(), strategy);
        if let Some(column) = state.columns.get(&key) {
            return Ok((column.clone(), strategy));
        }

        let column = match field.field_conversion() {
            Some(conversion) => {
                let descriptor = field.descriptor();
                let hints = ConversionHints::new(descriptor, self.platform.database_type())
                    .with_column(field.column())
                    .with_strategy(strategy);
                conversion.convert_sql_field(field.column(), descriptor.options(), &hints)?
            }
            None => field.column().to_string(),
        };

        state.columns.insert(key, column.clone());
        Ok((column, strategy))
    }

    /// 将值物化为占位符引用或内嵌字面量
    fn materialize(
        &self,
        field: &QueryField,
        value: &DataValue,
        strategy: Option<i32>,
        column: &str,
        state: &mut CompileState,
    ) -> QuickSearchResult<String> {
        let Some(conversion) = field.value_conversion() else {
            return Ok(state.bind(field.name(), value.clone(), field.db_type()));
        };

        let descriptor = field.descriptor();
        let hints = ConversionHints::new(descriptor, self.platform.database_type())
            .with_column(column)
            .with_strategy(strategy);

        let input = if conversion.requires_base_conversion(descriptor.options(), &hints) {
            self.platform.base_convert(value)
        } else {
            value.clone()
        };

        let embed = conversion.value_requires_embedding();
        let mut token = |converted: DataValue| {
            if embed {
                self.platform.quote_literal(&converted)
            } else {
                let param_type = ParameterType::infer(&converted);
                state.bind(field.name(), converted, param_type)
            }
        };

        let rendered = match conversion.convert_value(&input, descriptor.options(), &hints)? {
            ConvertedValue::Value(converted) => token(converted),
            ConvertedValue::Expression { template, value } => render_template(&template, &token(value)),
        };
        Ok(rendered)
    }
}
