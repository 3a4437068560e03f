//! 终端文本编码器
//!
//! 输出形如 `时间\t级别\t调用位置\t消息\t{字段}`，可选按级别着色。

use crate::config::{ColorConfig, EncoderConfig};
use crate::encoder::json::write_fields_object;
use crate::encoder::{Encoder, write_time};
use crate::error::EncodeError;
use crate::record::{Field, Record};

const RESET: &str = "\x1b[0m";

/// 终端文本编码器
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
    color: Option<ColorConfig>,
    context: Vec<Field>,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            color: None,
            context: Vec::new(),
        }
    }

    /// 启用颜色输出
    pub fn with_color(mut self, color: ColorConfig) -> Self {
        self.color = Some(color);
        self
    }

    fn push_part(&self, buf: &mut Vec<u8>, color: Option<&str>, text: &[u8]) {
        if !buf.is_empty() {
            buf.push(b'\t');
        }
        match color {
            Some(code) => {
                buf.extend_from_slice(code.as_bytes());
                buf.extend_from_slice(text);
                buf.extend_from_slice(RESET.as_bytes());
            }
            None => buf.extend_from_slice(text),
        }
    }
}

impl Default for ConsoleEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl Encoder for ConsoleEncoder {
    fn encode_entry(&self, record: &Record<'_>, fields: &[Field]) -> Result<Vec<u8>, EncodeError> {
        let config = &self.config;
        let color = self.color.as_ref();
        let mut buf = Vec::with_capacity(96 + record.message.len());

        if !config.time_key.is_empty() {
            let mut time = Vec::with_capacity(32);
            write_time(&mut time, &record.time, config.time_format, false)?;
            self.push_part(&mut buf, color.map(|c| c.timestamp.as_str()), &time);
        }
        if !config.level_key.is_empty() {
            let level = config.level_style.render(record.level);
            self.push_part(&mut buf, color.map(|c| c.for_level(record.level)), level.as_bytes());
        }
        if let (Some(caller), false) = (record.caller, config.caller_key.is_empty()) {
            let caller = caller.to_string();
            self.push_part(&mut buf, color.map(|c| c.caller.as_str()), caller.as_bytes());
        }
        if !config.message_key.is_empty() {
            self.push_part(&mut buf, color.map(|c| c.message.as_str()), record.message.as_bytes());
        }
        if !self.context.is_empty() || !fields.is_empty() {
            let mut object = Vec::with_capacity(64);
            write_fields_object(&mut object, &self.context, fields)?;
            self.push_part(&mut buf, None, &object);
        }

        buf.extend_from_slice(config.line_ending.as_bytes());
        Ok(buf)
    }

    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn add_field(&mut self, field: &Field) {
        self.context.push(field.clone());
    }
}
