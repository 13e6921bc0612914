//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        let entries: [(&str, [&str; 3]); 7] = [
            (
                "error.unknown_field",
                [
                    "字段集中不存在字段 '{field}'",
                    "Field '{field}' is not registered in the field set",
                    "フィールドセットにフィールド '{field}' が存在しません",
                ],
            ),
            (
                "error.config",
                [
                    "配置错误: {message}",
                    "Configuration error: {message}",
                    "設定エラー: {message}",
                ],
            ),
            (
                "error.bad_method_call",
                [
                    "调用顺序错误: {message}",
                    "Bad method call: {message}",
                    "不正なメソッド呼び出し: {message}",
                ],
            ),
            (
                "error.transformation",
                [
                    "字段 '{field}' 的值转换失败: {message}",
                    "Value transformation failed for field '{field}': {message}",
                    "フィールド '{field}' の値変換が失敗しました: {message}",
                ],
            ),
            (
                "error.serialization",
                [
                    "数据序列化失败: {message}",
                    "Data serialization failed: {message}",
                    "データシリアライズが失敗しました: {message}",
                ],
            ),
            (
                "error.cache",
                [
                    "缓存操作失败: {message}",
                    "Cache operation failed: {message}",
                    "キャッシュ操作が失敗しました: {message}",
                ],
            ),
            (
                "error.unsupported_database",
                [
                    "不支持的数据库类型: {db_type}",
                    "Unsupported database type: {db_type}",
                    "サポートされていないデータベースタイプ: {db_type}",
                ],
            ),
        ];

        for (key, [zh, en, ja]) in entries {
            let mut messages = HashMap::new();
            messages.insert("zh-CN".to_string(), zh.to_string());
            messages.insert("en-US".to_string(), en.to_string());
            messages.insert("ja-JP".to_string(), ja.to_string());
            translations.insert(key.to_string(), messages);
        }

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
