//! 结构化日志记录

use std::borrow::Cow;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::Level;

/// 调用位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

/// 短格式：只保留最后一级目录和文件名，如 `src/main.rs:42`
impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = self.file;
        let short = match file.rfind(['/', '\\']) {
            Some(last) => match file[..last].rfind(['/', '\\']) {
                Some(prev) => &file[prev + 1..],
                None => file,
            },
            None => file,
        };
        write!(f, "{}:{}", short, self.line)
    }
}

/// 单条日志记录
///
/// 字段不属于记录本身，随记录一起以 `&[Field]` 传递。
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub time: DateTime<Local>,
    pub caller: Option<Caller>,
}

impl<'a> Record<'a> {
    /// 以当前时间创建记录
    pub fn new(level: Level, message: &'a str) -> Self {
        Self {
            level,
            message,
            time: Local::now(),
            caller: None,
        }
    }

    pub fn with_caller(mut self, caller: Option<Caller>) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_time(mut self, time: DateTime<Local>) -> Self {
        self.time = time;
        self
    }
}

/// 字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Duration(Duration),
    /// 错误信息文本
    Error(String),
    /// 任意可序列化的值
    Json(serde_json::Value),
    /// 构造时序列化失败，编码时报错
    Invalid(String),
}

/// 键值字段
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Str(value.into()))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn i64(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, FieldValue::I64(value))
    }

    pub fn u64(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, FieldValue::U64(value))
    }

    pub fn f64(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, FieldValue::F64(value))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    pub fn error(key: impl Into<Cow<'static, str>>, err: &dyn std::error::Error) -> Self {
        Self::new(key, FieldValue::Error(err.to_string()))
    }

    /// 立即序列化任意值；失败时保留原因，留待编码阶段报告
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        let value = match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(e) => FieldValue::Invalid(e.to_string()),
        };
        Self::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_caller_short_display() {
        assert_eq!(Caller::new("src/logger/mod.rs", 12).to_string(), "logger/mod.rs:12");
        assert_eq!(Caller::new("main.rs", 3).to_string(), "main.rs:3");
        assert_eq!(Caller::new("src/lib.rs", 7).to_string(), "src/lib.rs:7");
    }

    #[test]
    fn test_field_any() {
        let field = Field::any("ids", &vec![1, 2, 3]);
        assert_eq!(field.value, FieldValue::Json(serde_json::json!([1, 2, 3])));

        // 非字符串键的 map 无法转换为 JSON
        let mut bad = HashMap::new();
        bad.insert((1, 2), 3);
        let field = Field::any("bad", &bad);
        assert!(matches!(field.value, FieldValue::Invalid(_)));
    }
}
