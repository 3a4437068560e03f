//! 日志器门面
//!
//! 三种日志器提供同一组操作：
//! - [`SyncLogger`]：所有级别都在调用线程写出
//! - [`AsyncLogger`]：Debug / Info / Warn / Error 入队异步写出，DPanic / Panic / Fatal 直接写出
//! - [`Logger::All`]：行为与异步相同，由 [`LoggerBuilder::build_all`] 单独构造
//!
//! 库代码应显式持有并传递 [`Logger`]；[`set_default_logger`] 只供程序入口使用。

use once_cell::sync::OnceCell;

use crate::config::{Level, WriterMode};
use crate::core::{AtomicLevel, SinkTable};
use crate::dispatch::DispatcherStats;
use crate::error::{LogError, Result, SetLoggerError};
use crate::record::{Caller, Field};

pub mod async_logger;
pub mod builder;
pub mod sync;

pub use async_logger::AsyncLogger;
pub use builder::LoggerBuilder;
pub use sync::{FatalHook, SyncLogger, exit_process};

/// 日志操作 trait
pub trait LogOper: Send + Sync {
    /// 级别是否开启；为 false 时调用方应跳过字段构造等工作
    fn enabled(&self, level: Level) -> bool;

    /// 记录一条日志
    ///
    /// Panic 级别记录后 panic，Fatal 级别记录后调用终止函数，
    /// 与级别是否开启、写入是否成功无关。
    fn log(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()>;

    /// 返回固化了字段的新日志器，共享输出、级别和分发器
    fn with_fields(&self, fields: &[Field]) -> Self
    where
        Self: Sized;

    fn sync(&self) -> Result<()>;

    fn debug(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Debug, None, message, fields)
    }

    fn info(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Info, None, message, fields)
    }

    fn warn(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Warn, None, message, fields)
    }

    fn error(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Error, None, message, fields)
    }

    fn dpanic(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::DPanic, None, message, fields)
    }

    fn panic(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Panic, None, message, fields)
    }

    fn fatal(&self, message: &str, fields: &[Field]) -> Result<()> {
        self.log(Level::Fatal, None, message, fields)
    }
}

/// 日志器，构造时确定模式
#[derive(Clone)]
pub enum Logger {
    Sync(SyncLogger),
    Async(AsyncLogger),
    All(AsyncLogger),
}

impl Logger {
    /// 模式名称
    pub fn kind(&self) -> &'static str {
        match self {
            Logger::Sync(_) => "sync",
            Logger::Async(_) => "async",
            Logger::All(_) => "all",
        }
    }

    pub fn is_async(&self) -> bool {
        !matches!(self, Logger::Sync(_))
    }

    fn sync_logger(&self) -> &SyncLogger {
        match self {
            Logger::Sync(logger) => logger,
            Logger::Async(logger) | Logger::All(logger) => logger.inner(),
        }
    }

    /// 共享的级别句柄（由构建器创建时存在）
    pub fn level_handle(&self) -> Option<&AtomicLevel> {
        self.sync_logger().level_handle()
    }

    /// 通过共享句柄调整级别，没有句柄时返回 false
    pub fn set_level(&self, level: Level) -> bool {
        match self.level_handle() {
            Some(handle) => {
                handle.set_level(level);
                true
            }
            None => false,
        }
    }

    /// 异步分发统计，同步日志器返回 None
    pub fn stats(&self) -> Option<DispatcherStats> {
        match self {
            Logger::Sync(_) => None,
            Logger::Async(logger) | Logger::All(logger) => Some(logger.stats()),
        }
    }

    /// 停止异步分发器；同步日志器无操作
    pub fn shutdown(&self) -> Result<()> {
        match self {
            Logger::Sync(_) => Ok(()),
            Logger::Async(logger) | Logger::All(logger) => logger.shutdown(),
        }
    }
}

impl LogOper for Logger {
    fn enabled(&self, level: Level) -> bool {
        match self {
            Logger::Sync(logger) => logger.enabled(level),
            Logger::Async(logger) | Logger::All(logger) => logger.enabled(level),
        }
    }

    fn log(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()> {
        match self {
            Logger::Sync(logger) => logger.log(level, caller, message, fields),
            Logger::Async(logger) | Logger::All(logger) => logger.log(level, caller, message, fields),
        }
    }

    fn with_fields(&self, fields: &[Field]) -> Self {
        match self {
            Logger::Sync(logger) => Logger::Sync(logger.with_fields(fields)),
            Logger::Async(logger) => Logger::Async(logger.with_fields(fields)),
            Logger::All(logger) => Logger::All(logger.with_fields(fields)),
        }
    }

    fn sync(&self) -> Result<()> {
        match self {
            Logger::Sync(logger) => logger.sync(),
            Logger::Async(logger) | Logger::All(logger) => logger.sync(),
        }
    }
}

/// 按写入模式创建日志器，默认 JSON 编码、Info 级别
pub fn new_logger(mode: WriterMode, sinks: SinkTable) -> Result<Logger> {
    LoggerBuilder::new().with_mode(mode).with_sinks(sinks).build()
}

/// 创建全功能日志器（普通级别异步写出）
pub fn new_all_logger(sinks: SinkTable) -> Result<Logger> {
    LoggerBuilder::new().with_sinks(sinks).build_all()
}

/// 进程默认日志器
static DEFAULT_LOGGER: OnceCell<Logger> = OnceCell::new();

/// 设置进程默认日志器，只能设置一次
pub fn set_default_logger(logger: Logger) -> std::result::Result<(), SetLoggerError> {
    DEFAULT_LOGGER.set(logger).map_err(|_| SetLoggerError(()))
}

/// 获取进程默认日志器
pub fn default_logger() -> Option<&'static Logger> {
    DEFAULT_LOGGER.get()
}

/// 获取进程默认日志器，未设置时返回错误
pub fn try_default_logger() -> Result<&'static Logger> {
    DEFAULT_LOGGER
        .get()
        .ok_or_else(|| LogError::InvalidConfig("默认日志器尚未设置".to_string()))
}
