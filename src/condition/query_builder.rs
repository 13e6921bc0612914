//! SQL查询构建器模块
//!
//! 作为条件生成器的参数接收端，组装完整的 SELECT 语句

use crate::error::QuickSearchResult;
use crate::security::DatabaseSecurityValidator;
use crate::types::{DataValue, DatabaseType, ParameterTable, ParameterType};
use serde::{Deserialize, Serialize};

/// 查询对象接口
///
/// 条件生成器通过它追加 WHERE 表达式并绑定参数
pub trait QuerySink: Send {
    fn append_where(&mut self, expression: &str);

    fn bind_parameter(&mut self, name: &str, value: DataValue, param_type: ParameterType);
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
struct OrderClause {
    field: String,
    direction: SortDirection,
}

/// SQL查询构建器
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    table: String,
    fields: Vec<String>,
    where_clauses: Vec<String>,
    parameters: ParameterTable,
    order_by: Vec<OrderClause>,
    limit: Option<u64>,
    offset: Option<u64>,
    db_type: DatabaseType,
    security_validator: DatabaseSecurityValidator,
}

impl SqlQueryBuilder {
    /// 创建新的查询构建器
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            table: String::new(),
            fields: Vec::new(),
            where_clauses: Vec::new(),
            parameters: ParameterTable::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            db_type,
            security_validator: DatabaseSecurityValidator::new(db_type),
        }
    }

    /// 设置查询字段
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 设置表名，可带别名（`users u`）
    pub fn from(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// 添加ORDER BY子句
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderClause {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// 设置LIMIT
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 设置OFFSET
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn where_clauses(&self) -> &[String] {
        &self.where_clauses
    }

    /// 构建使用命名占位符的 SQL 语句
    pub fn build(&self) -> QuickSearchResult<(String, ParameterTable)> {
        let table = self.table_reference()?;

        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", fields, table);

        // 多个 WHERE 片段各自加括号后以 AND 组合
        match self.where_clauses.len() {
            0 => {}
            1 => sql.push_str(&format!(" WHERE {}", self.where_clauses[0])),
            _ => {
                let wrapped: Vec<String> = self
                    .where_clauses
                    .iter()
                    .map(|clause| format!("({})", clause))
                    .collect();
                sql.push_str(&format!(" WHERE {}", wrapped.join(" AND ")));
            }
        }

        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|o| {
                    let direction = match o.direction {
                        SortDirection::Asc => "ASC",
                        SortDirection::Desc => "DESC",
                    };
                    format!("{} {}", o.field, direction)
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", order_clauses.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok((sql, self.parameters.clone()))
    }

    /// 构建使用位置占位符的 SQL 语句
    ///
    /// `:name` 被改写为 `?`（MySQL/SQLite）或 `$n`（PostgreSQL），字符串字面量内部不做改写
    pub fn build_positional(&self) -> QuickSearchResult<(String, Vec<DataValue>)> {
        let (sql, parameters) = self.build()?;

        let chars: Vec<char> = sql.chars().collect();
        let mut output = String::with_capacity(sql.len());
        let mut values = Vec::with_capacity(parameters.len());
        let mut in_literal = false;
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '\'' {
                in_literal = !in_literal;
                output.push(ch);
                i += 1;
                continue;
            }

            if in_literal || ch != ':' {
                output.push(ch);
                i += 1;
                continue;
            }

            // PostgreSQL 类型转换 `::type`
            if chars.get(i + 1) == Some(&':') {
                output.push_str("::");
                i += 2;
                continue;
            }

            let start = i + 1;
            let mut end = start;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            if end == start {
                output.push(ch);
                i += 1;
                continue;
            }

            let name: String = chars[start..end].iter().collect();
            let parameter = parameters.get(&name).ok_or_else(|| {
                crate::quick_error!(bad_method_call, format!("参数 '{}' 未绑定", name))
            })?;
            values.push(parameter.value.clone());
            output.push_str(&self.get_placeholder(values.len()));
            i = end;
        }

        Ok((output, values))
    }

    fn table_reference(&self) -> QuickSearchResult<String> {
        let mut parts = self.table.split_whitespace();
        let Some(table) = parts.next() else {
            return Err(crate::quick_error!(validation, "table", "表名不能为空"));
        };
        let table = self.security_validator.get_safe_table_identifier(table)?;
        match (parts.next(), parts.next()) {
            (None, _) => Ok(table),
            (Some(alias), None) => {
                self.security_validator.validate_identifier("表别名", alias)?;
                Ok(format!("{} {}", table, self.security_validator.quote(alias)))
            }
            _ => Err(crate::quick_error!(
                validation,
                "table",
                format!("无法解析表名: {}", self.table)
            )),
        }
    }

    /// 获取单个占位符
    fn get_placeholder(&self, index: usize) -> String {
        match self.db_type {
            DatabaseType::PostgreSQL => format!("${}", index),
            DatabaseType::MySQL | DatabaseType::SQLite => "?".to_string(),
        }
    }
}

impl QuerySink for SqlQueryBuilder {
    fn append_where(&mut self, expression: &str) {
        if !expression.trim().is_empty() {
            self.where_clauses.push(expression.to_string());
        }
    }

    fn bind_parameter(&mut self, name: &str, value: DataValue, param_type: ParameterType) {
        self.parameters.insert(name, value, param_type);
    }
}
