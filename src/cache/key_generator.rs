//! 缓存键生成模块
//!
//! 条件树与字段映射的规范化编码。每个值都带显式类型标签并以长度前缀分隔，
//! 编码结果经 SHA-256 摘要后作为缓存键的一部分。

use crate::mapping::FieldMapping;
use crate::types::{
    CacheConfig, DataValue, DatabaseType, PatternMatch, Range, SearchCondition, SingleValue, ValuesBag,
    ValuesGroup,
};
use rat_logger::debug;
use sha2::{Digest, Sha256};

/// 规范编码版本，编码格式变化时递增
pub const CANONICAL_ENCODING_VERSION: u8 = 1;

// 类型标签
const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_UINT: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_BYTES: u8 = 0x06;
const TAG_DATE: u8 = 0x07;
const TAG_DATETIME: u8 = 0x08;
const TAG_DATETIME_UTC: u8 = 0x09;
const TAG_UUID: u8 = 0x0a;
const TAG_NONE: u8 = 0x0b;

// 结构标签
const TAG_GROUP: u8 = 0x20;
const TAG_FIELD: u8 = 0x21;
const TAG_SIMPLE: u8 = 0x22;
const TAG_EXCLUDED_SIMPLE: u8 = 0x23;
const TAG_RANGE: u8 = 0x24;
const TAG_EXCLUDED_RANGE: u8 = 0x25;
const TAG_COMPARE: u8 = 0x26;
const TAG_PATTERN: u8 = 0x27;
const TAG_MAPPING: u8 = 0x28;
const TAG_END: u8 = 0x2f;

/// 规范编码器，直接写入摘要状态
struct CanonicalEncoder {
    hasher: Sha256,
}

impl CanonicalEncoder {
    fn new() -> Self {
        let mut hasher = Sha256::new();
        hasher.update([CANONICAL_ENCODING_VERSION]);
        Self { hasher }
    }

    fn tag(&mut self, tag: u8) {
        self.hasher.update([tag]);
    }

    fn len(&mut self, len: usize) {
        self.hasher.update((len as u64).to_be_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.len(bytes.len());
        self.hasher.update(bytes);
    }

    fn str(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    fn bool(&mut self, b: bool) {
        self.hasher.update([b as u8]);
    }

    fn value(&mut self, value: &DataValue) {
        match value {
            DataValue::Null => self.tag(TAG_NULL),
            DataValue::Bool(b) => {
                self.tag(TAG_BOOL);
                self.bool(*b);
            }
            DataValue::Int(i) => {
                self.tag(TAG_INT);
                self.hasher.update(i.to_be_bytes());
            }
            DataValue::UInt(u) => {
                self.tag(TAG_UINT);
                self.hasher.update(u.to_be_bytes());
            }
            DataValue::Float(f) => {
                self.tag(TAG_FLOAT);
                self.hasher.update(f.to_bits().to_be_bytes());
            }
            DataValue::String(s) => {
                self.tag(TAG_STRING);
                self.str(s);
            }
            DataValue::Bytes(bytes) => {
                self.tag(TAG_BYTES);
                self.bytes(bytes);
            }
            DataValue::Date(d) => {
                self.tag(TAG_DATE);
                self.str(&d.format("%Y-%m-%d").to_string());
            }
            DataValue::DateTime(dt) => {
                self.tag(TAG_DATETIME);
                self.str(&dt.to_rfc3339());
            }
            DataValue::DateTimeUTC(dt) => {
                self.tag(TAG_DATETIME_UTC);
                self.str(&dt.to_rfc3339());
            }
            DataValue::Uuid(uuid) => {
                self.tag(TAG_UUID);
                self.hasher.update(uuid.as_bytes());
            }
        }
    }

    fn optional_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.tag(TAG_STRING);
                self.str(s);
            }
            None => self.tag(TAG_NONE),
        }
    }

    /// 编码公共头：数据库类型与字段集名称
    fn header(&mut self, db_type: DatabaseType, field_set: &str) {
        self.str(db_type.as_str());
        self.str(field_set);
    }

    /// 字段映射按字段名排序后编码，与声明顺序无关
    fn mappings(&mut self, mappings: &[FieldMapping]) {
        let mut sorted: Vec<&FieldMapping> = mappings.iter().collect();
        sorted.sort_by(|a, b| a.field().cmp(b.field()));

        self.len(sorted.len());
        for mapping in sorted {
            self.tag(TAG_MAPPING);
            self.str(mapping.field());
            self.str(mapping.target());
            self.optional_str(mapping.declared_db_type().map(|t| t.as_str()));
            self.optional_str(mapping.declared_value_conversion().map(|c| c.conversion_id()));
            self.optional_str(mapping.declared_field_conversion().map(|c| c.conversion_id()));
        }
    }

    /// 条件树按插入顺序编码；展示值不参与
    fn group(&mut self, group: &ValuesGroup) {
        self.tag(TAG_GROUP);
        self.len(group.fields().len());
        for (name, bag) in group.fields() {
            self.tag(TAG_FIELD);
            self.str(name);
            self.bag(bag);
        }
        self.len(group.groups().len());
        for child in group.groups() {
            self.group(child);
        }
        self.str(group.logical().as_sql().trim());
        self.tag(TAG_END);
    }

    fn bag(&mut self, bag: &ValuesBag) {
        self.singles(TAG_SIMPLE, bag.simple_values());
        self.singles(TAG_EXCLUDED_SIMPLE, bag.excluded_simple_values());
        self.ranges(TAG_RANGE, bag.ranges());
        self.ranges(TAG_EXCLUDED_RANGE, bag.excluded_ranges());

        self.tag(TAG_COMPARE);
        self.len(bag.comparisons().len());
        for compare in bag.comparisons() {
            self.str(compare.operator().as_str());
            self.value(compare.value());
        }

        self.patterns(bag.pattern_matchers());
    }

    fn singles(&mut self, tag: u8, values: &[SingleValue]) {
        self.tag(tag);
        self.len(values.len());
        for value in values {
            self.value(value.value());
        }
    }

    fn ranges(&mut self, tag: u8, ranges: &[Range]) {
        self.tag(tag);
        self.len(ranges.len());
        for range in ranges {
            self.value(range.lower());
            self.value(range.upper());
            self.bool(range.is_lower_inclusive());
            self.bool(range.is_upper_inclusive());
        }
    }

    fn patterns(&mut self, patterns: &[PatternMatch]) {
        self.tag(TAG_PATTERN);
        self.len(patterns.len());
        for pattern in patterns {
            self.str(pattern.match_type().as_str());
            self.bool(pattern.is_case_insensitive());
            self.str(pattern.value());
        }
    }

    fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// 计算条件树的规范摘要
pub fn hash_values_group(
    db_type: DatabaseType,
    field_set: &str,
    mappings: &[FieldMapping],
    group: &ValuesGroup,
) -> String {
    let mut encoder = CanonicalEncoder::new();
    encoder.header(db_type, field_set);
    encoder.mappings(mappings);
    encoder.group(group);
    encoder.finish()
}

/// 条件缓存键生成器
#[derive(Debug, Clone)]
pub struct CacheKeyGenerator {
    prefix: String,
    version: String,
}

impl CacheKeyGenerator {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.key_prefix.clone(), config.version.clone())
    }

    /// 生成条件缓存键
    ///
    /// 格式：`{prefix}:{version}:condition:{field_set}:{main_hash}:{primary_hash|none}`
    pub fn generate_condition_cache_key(
        &self,
        db_type: DatabaseType,
        condition: &SearchCondition,
        mappings: &[FieldMapping],
    ) -> String {
        let field_set = condition.field_set().name();
        let main_hash = hash_values_group(db_type, field_set, mappings, condition.values_group());
        let primary_hash = condition
            .primary_condition()
            .map(|primary| hash_values_group(db_type, field_set, mappings, primary.values_group()))
            .unwrap_or_else(|| "none".to_string());

        let key = format!(
            "{}:{}:condition:{}:{}:{}",
            self.prefix, self.version, field_set, main_hash, primary_hash
        );
        debug!("生成条件缓存键: 字段集={}, key={}", field_set, key);
        key
    }

    /// 生成主条件片段的缓存键，没有主条件时返回 `None`
    ///
    /// 格式：`{prefix}:{version}:primary:{field_set}:{primary_hash}`，与主体条件无关，
    /// 不同主体条件可共享同一主条件片段
    pub fn generate_primary_cache_key(
        &self,
        db_type: DatabaseType,
        condition: &SearchCondition,
        mappings: &[FieldMapping],
    ) -> Option<String> {
        let primary = condition.primary_condition()?;
        let field_set = condition.field_set().name();
        let primary_hash = hash_values_group(db_type, field_set, mappings, primary.values_group());
        Some(format!(
            "{}:{}:primary:{}:{}",
            self.prefix, self.version, field_set, primary_hash
        ))
    }
}
