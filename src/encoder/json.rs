//! JSON 编码器 - 每条记录一行 JSON 对象

use std::io::Write;

use crate::config::EncoderConfig;
use crate::encoder::{Encoder, write_time};
use crate::error::EncodeError;
use crate::record::{Field, FieldValue, Record};

/// JSON 编码器
///
/// 输出顺序：级别、时间、调用位置、消息、固化字段、调用字段。
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
    /// 已编码的固化字段，形如 `"a":1,"b":"x"`
    context: Vec<u8>,
    /// 固化字段中第一个无法编码的字段
    context_error: Option<(String, String)>,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            context: Vec::new(),
            context_error: None,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl Encoder for JsonEncoder {
    fn encode_entry(&self, record: &Record<'_>, fields: &[Field]) -> Result<Vec<u8>, EncodeError> {
        if let Some((key, reason)) = &self.context_error {
            return Err(EncodeError::Field {
                key: key.clone(),
                reason: reason.clone(),
            });
        }

        let config = &self.config;
        let mut buf = Vec::with_capacity(128 + record.message.len() + self.context.len());
        let mut first = true;
        buf.push(b'{');

        if !config.level_key.is_empty() {
            write_key(&mut buf, &mut first, &config.level_key)?;
            serde_json::to_writer(&mut buf, config.level_style.render(record.level))?;
        }
        if !config.time_key.is_empty() {
            write_key(&mut buf, &mut first, &config.time_key)?;
            write_time(&mut buf, &record.time, config.time_format, true)?;
        }
        if let (Some(caller), false) = (record.caller, config.caller_key.is_empty()) {
            write_key(&mut buf, &mut first, &config.caller_key)?;
            serde_json::to_writer(&mut buf, &caller.to_string())?;
        }
        if !config.message_key.is_empty() {
            write_key(&mut buf, &mut first, &config.message_key)?;
            serde_json::to_writer(&mut buf, record.message)?;
        }

        if !self.context.is_empty() {
            if !first {
                buf.push(b',');
            }
            buf.extend_from_slice(&self.context);
            first = false;
        }
        for field in fields {
            write_key(&mut buf, &mut first, &field.key)?;
            write_value(&mut buf, field)?;
        }

        buf.push(b'}');
        buf.extend_from_slice(config.line_ending.as_bytes());
        Ok(buf)
    }

    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn add_field(&mut self, field: &Field) {
        if self.context_error.is_some() {
            return;
        }
        let mut first = self.context.is_empty();
        let mark = self.context.len();
        let result = write_key(&mut self.context, &mut first, &field.key)
            .and_then(|_| write_value(&mut self.context, field));
        if let Err(e) = result {
            self.context.truncate(mark);
            self.context_error = Some((field.key.to_string(), field_reason(e)));
        }
    }
}

fn field_reason(err: EncodeError) -> String {
    match err {
        EncodeError::Field { reason, .. } => reason,
        other => other.to_string(),
    }
}

fn write_key(buf: &mut Vec<u8>, first: &mut bool, key: &str) -> Result<(), EncodeError> {
    if !*first {
        buf.push(b',');
    }
    *first = false;
    serde_json::to_writer(&mut *buf, key)?;
    buf.push(b':');
    Ok(())
}

/// 写出字段值
pub(crate) fn write_value(buf: &mut Vec<u8>, field: &Field) -> Result<(), EncodeError> {
    match &field.value {
        FieldValue::Str(s) | FieldValue::Error(s) => serde_json::to_writer(&mut *buf, s)?,
        FieldValue::Bool(b) => buf.extend_from_slice(if *b { b"true" } else { b"false" }),
        FieldValue::I64(n) => write!(buf, "{}", n)?,
        FieldValue::U64(n) => write!(buf, "{}", n)?,
        FieldValue::F64(n) => serde_json::to_writer(&mut *buf, n)?,
        FieldValue::Duration(d) => serde_json::to_writer(&mut *buf, &format!("{:?}", d))?,
        FieldValue::Json(value) => serde_json::to_writer(&mut *buf, value)?,
        FieldValue::Invalid(reason) => {
            return Err(EncodeError::Field {
                key: field.key.to_string(),
                reason: reason.clone(),
            });
        }
    }
    Ok(())
}

/// 将字段写为一个 JSON 对象，供文本编码器使用
pub(crate) fn write_fields_object(
    buf: &mut Vec<u8>,
    context: &[Field],
    fields: &[Field],
) -> Result<(), EncodeError> {
    let mut first = true;
    buf.push(b'{');
    for field in context.iter().chain(fields) {
        write_key(buf, &mut first, &field.key)?;
        write_value(buf, field)?;
    }
    buf.push(b'}');
    Ok(())
}
