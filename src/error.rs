//! 错误类型

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Level;

/// 本 crate 的 Result 类型
pub type Result<T> = std::result::Result<T, LogError>;

/// 日志处理过程中可能出现的错误
#[derive(Debug, Error)]
pub enum LogError {
    /// 该级别没有注册输出
    #[error("no sink registered for level {0}")]
    NoSinkForLevel(Level),

    /// 编码失败，记录未写出
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// 输出写入失败
    #[error("sink write failed: {0}")]
    SinkWrite(#[source] io::Error),

    /// 输出同步失败（数据已写入）
    #[error("sink sync failed: {0}")]
    SinkSync(#[source] io::Error),

    /// 打开输出失败
    #[error("failed to open sink {}: {source}", .path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 分发器已关闭
    #[error("dispatcher is closed")]
    DispatcherClosed,

    /// 配置无效
    #[error("{0}")]
    InvalidConfig(String),

    #[error(transparent)]
    SetLogger(#[from] SetLoggerError),
}

/// 默认日志器重复设置
#[derive(Debug, Error)]
#[error("failed to set logger")]
pub struct SetLoggerError(pub(crate) ());

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON 序列化失败
    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// 字段值无法编码
    #[error("field {key:?} could not be encoded: {reason}")]
    Field { key: String, reason: String },

    #[error("io error while encoding: {0}")]
    Io(#[from] io::Error),
}
