use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::level::Level;

/// 字段值，支持多种类型
#[derive(Debug, Clone)]
pub enum FieldValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Null,
    /// 时长，按 encoder 配置的 duration encoder 输出
    Duration(Duration),
    /// 错误信息
    Error(String),
    /// 任意 JSON 兼容的数据（包括序列化后的自定义结构体）
    Json(Value),
}

impl FieldValue {
    /// 从任意实现了 Serialize 的结构体创建字段值
    ///
    /// # 示例
    ///
    /// ```ignore
    /// #[derive(Serialize)]
    /// struct User {
    ///     id: i64,
    ///     name: String,
    /// }
    ///
    /// let value = FieldValue::from_struct(User { id: 1, name: "alice".into() });
    /// ```
    pub fn from_struct<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => FieldValue::Json(v),
            Err(_) => FieldValue::Null,
        }
    }

    /// 从错误创建字段值
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        FieldValue::Error(err.to_string())
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => serializer.serialize_str(s),
            FieldValue::I64(n) => serializer.serialize_i64(*n),
            FieldValue::U64(n) => serializer.serialize_u64(*n),
            FieldValue::F64(n) => serializer.serialize_f64(*n),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Duration(d) => serializer.serialize_u64(d.as_nanos() as u64),
            FieldValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => write!(f, "{}", s),
            FieldValue::I64(n) => write!(f, "{}", n),
            FieldValue::U64(n) => write!(f, "{}", n),
            FieldValue::F64(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::I64(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::I64(n as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::U64(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::U64(n as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(n: usize) -> Self {
        FieldValue::U64(n as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::F64(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Json(v)
    }
}

/// 结构化字段
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 调用位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    /// 完整路径，例如 `/src/app/server.rs:42`
    pub fn full_path(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// 只保留最后一级目录和文件名，例如 `app/server.rs:42`
    pub fn trimmed_path(&self) -> String {
        let file = self.file.replace('\\', "/");
        let mut parts = file.rsplitn(3, '/');
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            Some(dir) => format!("{}/{}:{}", dir, name, self.line),
            None => format!("{}:{}", name, self.line),
        }
    }
}

impl From<&std::panic::Location<'_>> for Caller {
    fn from(location: &std::panic::Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

/// 一条日志记录（不含字段，字段随 Entry 一起传给 encoder）
#[derive(Debug, Clone)]
pub struct Entry {
    /// 日志级别
    pub level: Level,
    /// 时间
    pub time: DateTime<Local>,
    /// logger 名称
    pub logger_name: Option<String>,
    /// 日志消息
    pub message: String,
    /// 调用位置
    pub caller: Option<Caller>,
    /// 调用栈
    pub stack: Option<String>,
}

impl Entry {
    /// 创建新的日志记录
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Local::now(),
            logger_name: None,
            message: message.into(),
            caller: None,
            stack: None,
        }
    }

    /// 设置调用位置
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_new() {
        let field = Field::new("user_id", 12345);
        assert_eq!(field.key, "user_id");
        assert!(matches!(field.value, FieldValue::I64(12345)));

        let field = Field::new("name", "alice");
        assert!(matches!(field.value, FieldValue::String(_)));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::String("hello".to_string()).to_string(), "hello");
        assert_eq!(FieldValue::U64(100).to_string(), "100");
        assert_eq!(FieldValue::Bool(false).to_string(), "false");
        assert_eq!(FieldValue::Null.to_string(), "null");
        assert_eq!(
            FieldValue::Duration(Duration::from_millis(1500)).to_string(),
            "1.5s"
        );
    }

    #[test]
    fn test_field_value_from_struct() {
        #[derive(Serialize)]
        struct RequestInfo {
            endpoint: String,
            duration_ms: u64,
        }

        let value = FieldValue::from_struct(RequestInfo {
            endpoint: "/api/users".to_string(),
            duration_ms: 123,
        });
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["endpoint"], "/api/users");
        assert_eq!(json["duration_ms"], 123);
    }

    #[test]
    fn test_caller_paths() {
        let caller = Caller {
            file: "src/writer/console_writer.rs".to_string(),
            line: 42,
        };
        assert_eq!(caller.full_path(), "src/writer/console_writer.rs:42");
        assert_eq!(caller.trimmed_path(), "writer/console_writer.rs:42");

        let caller = Caller {
            file: "main.rs".to_string(),
            line: 7,
        };
        assert_eq!(caller.trimmed_path(), "main.rs:7");
    }
}
