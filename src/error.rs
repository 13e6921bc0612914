//! 错误类型定义模块
//!
//! 定义搜索条件引擎统一的错误类型，错误消息通过 i18n 模块本地化

use thiserror::Error;

/// 搜索条件引擎错误类型
#[derive(Error, Debug)]
pub enum QuickSearchError {
    /// 条件引用了字段集中不存在的字段
    #[error("{message}")]
    UnknownField { field: String, message: String },

    /// 字段映射配置错误（无法确定列或类型）
    #[error("{message}")]
    ConfigError { message: String },

    /// API 调用顺序错误（例如编译后再配置）
    #[error("{message}")]
    BadMethodCall { message: String },

    /// 值转换失败
    #[error("{message}")]
    TransformationFailed { field: String, message: String },

    /// 标识符或输入验证失败
    #[error("{field}: {message}")]
    ValidationError { field: String, message: String },

    /// 序列化失败
    #[error("{message}")]
    SerializationError { message: String },

    /// 缓存操作失败
    #[error("{message}")]
    CacheError { message: String },

    /// 不支持的数据库类型
    #[error("{message}")]
    UnsupportedDatabase { db_type: String, message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 搜索条件引擎结果类型
pub type QuickSearchResult<T> = Result<T, QuickSearchError>;

impl From<serde_json::Error> for QuickSearchError {
    fn from(e: serde_json::Error) -> Self {
        crate::quick_error!(serialization, e.to_string())
    }
}

/// 快速构造错误的宏
///
/// 消息文本通过 `i18n::tf` 本地化
#[macro_export]
macro_rules! quick_error {
    (unknown_field, $field:expr) => {{
        let field: String = ($field).to_string();
        $crate::error::QuickSearchError::UnknownField {
            message: $crate::i18n::tf("error.unknown_field", &[("field", field.as_str())]),
            field,
        }
    }};
    (config, $msg:expr) => {{
        let message: String = ($msg).to_string();
        $crate::error::QuickSearchError::ConfigError {
            message: $crate::i18n::tf("error.config", &[("message", message.as_str())]),
        }
    }};
    (bad_method_call, $msg:expr) => {{
        let message: String = ($msg).to_string();
        $crate::error::QuickSearchError::BadMethodCall {
            message: $crate::i18n::tf("error.bad_method_call", &[("message", message.as_str())]),
        }
    }};
    (transformation, $field:expr, $msg:expr) => {{
        let field: String = ($field).to_string();
        let message: String = ($msg).to_string();
        $crate::error::QuickSearchError::TransformationFailed {
            message: $crate::i18n::tf(
                "error.transformation",
                &[("field", field.as_str()), ("message", message.as_str())],
            ),
            field,
        }
    }};
    (validation, $field:expr, $msg:expr) => {
        $crate::error::QuickSearchError::ValidationError {
            field: ($field).to_string(),
            message: ($msg).to_string(),
        }
    };
    (serialization, $msg:expr) => {{
        let message: String = ($msg).to_string();
        $crate::error::QuickSearchError::SerializationError {
            message: $crate::i18n::tf("error.serialization", &[("message", message.as_str())]),
        }
    }};
    (cache, $msg:expr) => {{
        let message: String = ($msg).to_string();
        $crate::error::QuickSearchError::CacheError {
            message: $crate::i18n::tf("error.cache", &[("message", message.as_str())]),
        }
    }};
    (unsupported_db, $db_type:expr) => {{
        let db_type: String = ($db_type).to_string();
        $crate::error::QuickSearchError::UnsupportedDatabase {
            message: $crate::i18n::tf("error.unsupported_database", &[("db_type", db_type.as_str())]),
            db_type,
        }
    }};
}
