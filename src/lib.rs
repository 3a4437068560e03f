//! rat_routelog - 按级别路由的结构化日志核心
//!
//! 每条记录经编码器编码后写入该级别对应的输出；异步模式下，普通级别的日志
//! 通过对象池复用的消息和有界队列交给后台线程写出，调用方只在队列满时阻塞。
//!
//! ```no_run
//! use std::sync::Arc;
//! use rat_routelog::{Field, Level, LogOper, LoggerBuilder, WriterMode};
//! use rat_routelog::sink::TermSink;
//!
//! let logger = LoggerBuilder::new()
//!     .with_mode(WriterMode::Async)
//!     .with_level(Level::Debug)
//!     .with_sink_for_levels(&Level::ALL, Arc::new(TermSink::stdout()))
//!     .build()
//!     .unwrap();
//!
//! let request = logger.with_fields(&[Field::string("request_id", "r-42")]);
//! rat_routelog::info!(request, "accepted {} bytes", 512; Field::u64("bytes", 512)).unwrap();
//! logger.shutdown().unwrap();
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod logger;
pub mod record;
pub mod sink;

// 重新导出主要类型
pub use config::{Level, LoggerConfig, WriterMode};
pub use core::{AtomicLevel, Core, LevelCore, LevelEnabler, NopCore, SinkTable};
pub use dispatch::{Dispatcher, DispatcherStats, MessagePool};
pub use encoder::{ConsoleEncoder, Encoder, JsonEncoder};
pub use error::{EncodeError, LogError, Result, SetLoggerError};
pub use logger::{
    AsyncLogger, LogOper, Logger, LoggerBuilder, SyncLogger, default_logger, new_all_logger,
    new_logger, set_default_logger,
};
pub use record::{Caller, Field, FieldValue, Record};
pub use sink::Sink;

// 日志宏：第一个参数为日志器，消息支持 format 参数，分号后为字段，自动记录调用位置。
// 级别未开启时不会格式化消息，也不会构造字段。
//
//     info!(logger, "user {} logged in", id; Field::string("ip", ip))

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Debug, $($arg)+));
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Info, $($arg)+));
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Warn, $($arg)+));
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Error, $($arg)+));
}

#[macro_export]
macro_rules! dpanic {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::DPanic, $($arg)+));
}

/// Panic 级别：记录后 panic
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Panic, $($arg)+));
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => ($crate::log!($logger, $crate::Level::Fatal, $($arg)+));
}

/// 以指定级别记录日志；DPanic 及以上级别总会交给日志器处理
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(; $($field:expr),* $(,)?)?) => {
        $crate::__private_log!(
            $logger,
            $level,
            $crate::__private_message(::core::format_args!($fmt $(, $arg)*)),
            [$($($field),*)?]
        )
    };
    ($logger:expr, $level:expr, $msg:expr $(; $($field:expr),* $(,)?)?) => {
        $crate::__private_log!($logger, $level, $msg, [$($($field),*)?])
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __private_log {
    ($logger:expr, $level:expr, $message:expr, [$($field:expr),*]) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if level >= $crate::Level::DPanic || $crate::LogOper::enabled(logger, level) {
            $crate::LogOper::log(
                logger,
                level,
                ::core::option::Option::Some($crate::Caller::new(file!(), line!())),
                ::core::convert::AsRef::<str>::as_ref(&$message),
                &[$($field),*],
            )
        } else {
            $crate::Result::Ok(())
        }
    }};
}

/// 没有参数的格式串直接借用，不分配
#[doc(hidden)]
pub fn __private_message(args: std::fmt::Arguments<'_>) -> std::borrow::Cow<'static, str> {
    match args.as_str() {
        Some(text) => std::borrow::Cow::Borrowed(text),
        None => std::borrow::Cow::Owned(args.to_string()),
    }
}
