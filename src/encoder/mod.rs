//! 记录编码器

use std::io::Write;

use chrono::{DateTime, Local, SecondsFormat};

use crate::config::TimeFormat;
use crate::error::EncodeError;
use crate::record::{Field, Record};

pub mod console;
pub mod json;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

/// 编码器 trait
///
/// `encode_entry` 只读取自身状态，在私有缓冲区上工作，可被多个线程同时调用。
/// `add_field` 只在 `clone_encoder` 得到的副本上调用，用于固化上下文字段。
pub trait Encoder: Send + Sync {
    /// 将记录和字段编码为一条完整输出
    fn encode_entry(&self, record: &Record<'_>, fields: &[Field]) -> Result<Vec<u8>, EncodeError>;

    /// 深拷贝；在副本上固化的字段不会影响原编码器
    fn clone_encoder(&self) -> Box<dyn Encoder>;

    /// 固化一个上下文字段，之后每条记录都会携带
    fn add_field(&mut self, field: &Field);
}

/// 写出时间戳，字符串格式带引号
pub(crate) fn write_time(
    buf: &mut Vec<u8>,
    time: &DateTime<Local>,
    format: TimeFormat,
    quoted: bool,
) -> Result<(), EncodeError> {
    match format {
        TimeFormat::Iso8601 => {
            let text = time.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string();
            write_text(buf, &text, quoted)?;
        }
        TimeFormat::Rfc3339 => {
            let text = time.to_rfc3339_opts(SecondsFormat::Secs, false);
            write_text(buf, &text, quoted)?;
        }
        TimeFormat::EpochMillis => write!(buf, "{}", time.timestamp_millis())?,
        TimeFormat::EpochSeconds => write!(buf, "{}", time.timestamp())?,
    }
    Ok(())
}

fn write_text(buf: &mut Vec<u8>, text: &str, quoted: bool) -> Result<(), EncodeError> {
    if quoted {
        serde_json::to_writer(&mut *buf, text)?;
    } else {
        buf.extend_from_slice(text.as_bytes());
    }
    Ok(())
}
