use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通用数据值类型 - 搜索值的跨数据库标量表示
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 无符号整数
    UInt(u64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 字节数组
    Bytes(Vec<u8>),
    /// 日期（不含时间）
    Date(NaiveDate),
    /// 日期时间
    DateTime(DateTime<FixedOffset>),
    /// UTC日期时间
    DateTimeUTC(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::UInt(u) => write!(f, "{}", u),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Bytes(bytes) => write!(f, "{}", BASE64.encode(bytes)),
            DataValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DataValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            DataValue::DateTimeUTC(dt) => write!(f, "{}", dt.to_rfc3339()),
            DataValue::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug 带上类型名，便于区分 Int(1) 与 String("1")
        write!(f, "{}({})", self.type_name(), self)
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::UInt(_) => "unsigned_integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
            DataValue::Bytes(_) => "bytes",
            DataValue::Date(_) => "date",
            DataValue::DateTime(_) => "datetime",
            DataValue::DateTimeUTC(_) => "datetime",
            DataValue::Uuid(_) => "uuid",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 以整数读取（仅限整数类型）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            DataValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// 以字符串切片读取
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 以日期读取，日期时间类型会截断为日期部分
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DataValue::Date(d) => Some(*d),
            DataValue::DateTime(dt) => Some(dt.date_naive()),
            DataValue::DateTimeUTC(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    /// 是否为日期或日期时间类型
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataValue::Date(_) | DataValue::DateTime(_) | DataValue::DateTimeUTC(_)
        )
    }

    /// 转换为 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::UInt(u) => serde_json::Value::Number(serde_json::Number::from(*u)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            // 其余类型统一使用字符串表示
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<u64> for DataValue {
    fn from(value: u64) -> Self {
        DataValue::UInt(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(value: Vec<u8>) -> Self {
        DataValue::Bytes(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(value: DateTime<Utc>) -> Self {
        DataValue::DateTimeUTC(value)
    }
}

impl From<DateTime<FixedOffset>> for DataValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        DataValue::DateTime(value)
    }
}

impl From<Uuid> for DataValue {
    fn from(value: Uuid) -> Self {
        DataValue::Uuid(value)
    }
}

impl<T> From<Option<T>> for DataValue
where
    T: Into<DataValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_type_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(DataValue::from(date).to_string(), "2024-02-29");
        assert_eq!(DataValue::from(date).type_name(), "date");
        assert_eq!(DataValue::from(vec![1u8, 2, 3]).to_string(), "AQID");
        assert_eq!(format!("{:?}", DataValue::Int(1)), "integer(1)");
    }

    #[test]
    fn test_serde_keeps_variant() {
        let original = DataValue::String("42".to_string());
        let json = serde_json::to_string(&original).unwrap();
        let restored: DataValue = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_ne!(restored, DataValue::Int(42));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(DataValue::UInt(7).as_i64(), Some(7));
        assert_eq!(DataValue::String("x".into()).as_i64(), None);
        assert!(DataValue::from(Option::<i64>::None).is_null());
        assert!(DataValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).is_temporal());
    }
}
