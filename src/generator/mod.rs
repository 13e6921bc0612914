//! 查询生成模块
//!
//! 条件树编译器与 SQL 方言平台

pub mod platform;
pub mod query_generator;

pub use platform::{create_platform, escape_like, MysqlPlatform, PostgresPlatform, QueryPlatform, SqlitePlatform};
pub use query_generator::{CompileState, QueryGenerator};
