//! 日志构建器

use std::path::Path;
use std::sync::Arc;

use crate::config::{Level, LoggerConfig, WriterMode};
use crate::core::{AtomicLevel, LevelCore, SinkTable};
use crate::dispatch::{Dispatcher, MessagePool};
use crate::encoder::{Encoder, JsonEncoder};
use crate::error::{LogError, Result};
use crate::logger::{AsyncLogger, FatalHook, Logger, SyncLogger, set_default_logger};
use crate::sink::{FileSink, Sink, TermSink};

/// 日志构建器
pub struct LoggerBuilder {
    config: LoggerConfig,
    sinks: SinkTable,
    encoder: Option<Box<dyn Encoder>>,
    level: Option<AtomicLevel>,
    fatal_hook: Option<FatalHook>,
    pool: Option<Arc<MessagePool>>,
    /// 链式调用中第一个出错的步骤，在 build 时返回
    deferred_error: Option<LogError>,
}

impl LoggerBuilder {
    /// 创建新的日志构建器
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            sinks: SinkTable::new(),
            encoder: None,
            level: None,
            fatal_hook: None,
            pool: None,
            deferred_error: None,
        }
    }

    /// 使用完整配置
    pub fn with_config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// 使用外部创建的共享级别，忽略配置中的级别
    pub fn with_atomic_level(mut self, level: AtomicLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_mode(mut self, mode: WriterMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// 启用开发模式（DPanic 触发 panic）
    pub fn with_development(mut self, enabled: bool) -> Self {
        self.config.development = enabled;
        self
    }

    /// 设置写入后立即同步的最低级别
    pub fn with_flush_level(mut self, level: Level) -> Self {
        self.config.core.flush_level = level;
        self
    }

    /// 设置异步队列容量
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.dispatcher.queue_capacity = capacity;
        self
    }

    /// 使用自定义编码器，默认按配置创建 JSON 编码器
    pub fn with_encoder<E: Encoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// 为单个级别注册输出
    pub fn with_sink(mut self, level: Level, sink: Arc<dyn Sink>) -> Self {
        self.sinks.insert(level, sink);
        self
    }

    /// 多个级别共用一个输出
    pub fn with_sink_for_levels(mut self, levels: &[Level], sink: Arc<dyn Sink>) -> Self {
        for level in levels {
            self.sinks.insert(*level, Arc::clone(&sink));
        }
        self
    }

    /// 替换整个输出表
    pub fn with_sinks(mut self, sinks: SinkTable) -> Self {
        self.sinks = sinks;
        self
    }

    /// 所有级别输出到标准输出
    pub fn add_terminal(self) -> Self {
        let sink: Arc<dyn Sink> = Arc::new(TermSink::stdout());
        self.with_sink_for_levels(&Level::ALL, sink)
    }

    /// 为级别添加文件输出
    pub fn add_file(mut self, levels: &[Level], path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match FileSink::open(path) {
            Ok(sink) => {
                let sink: Arc<dyn Sink> = Arc::new(sink);
                self = self.with_sink_for_levels(levels, sink);
            }
            Err(source) => {
                if self.deferred_error.is_none() {
                    self.deferred_error = Some(LogError::SinkOpen {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
        self
    }

    /// Fatal 级别记录后调用的终止函数，默认退出进程
    pub fn with_fatal_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.fatal_hook = Some(Arc::new(hook));
        self
    }

    /// 异步分发使用的对象池，默认全局池
    pub fn with_pool(mut self, pool: Arc<MessagePool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// 按配置的写入模式构建日志器
    pub fn build(self) -> Result<Logger> {
        let mode = self.config.mode;
        let (sync, dispatcher) = self.assemble(mode != WriterMode::Sync)?;
        Ok(match dispatcher {
            Some(dispatcher) => Logger::Async(AsyncLogger::new(sync, dispatcher)),
            None => Logger::Sync(sync),
        })
    }

    /// 构建全功能日志器，不受写入模式影响
    pub fn build_all(self) -> Result<Logger> {
        let (sync, dispatcher) = self.assemble(true)?;
        let dispatcher = dispatcher.ok_or(LogError::DispatcherClosed)?;
        Ok(Logger::All(AsyncLogger::new(sync, dispatcher)))
    }

    /// 构建并设置为进程默认日志器
    pub fn init(self) -> Result<()> {
        let logger = self.build()?;
        set_default_logger(logger)?;
        Ok(())
    }

    fn assemble(self, with_dispatcher: bool) -> Result<(SyncLogger, Option<Arc<Dispatcher>>)> {
        if let Some(e) = self.deferred_error {
            return Err(e);
        }
        self.config.validate()?;

        // 验证是否有输出
        if self.sinks.is_empty() {
            return Err(LogError::InvalidConfig(
                "配置错误: 必须至少为一个级别添加输出".to_string(),
            ));
        }

        let level = self
            .level
            .unwrap_or_else(|| AtomicLevel::new(self.config.level));
        let encoder = self
            .encoder
            .unwrap_or_else(|| -> Box<dyn Encoder> {
                Box::new(JsonEncoder::new(self.config.encoder.clone()))
            });

        let core = LevelCore::new(encoder, self.sinks, Arc::new(level.clone()))
            .with_flush_level(self.config.core.flush_level);

        let mut sync = SyncLogger::new(Arc::new(core))
            .with_development(self.config.development)
            .with_level_handle(level);
        if let Some(hook) = self.fatal_hook {
            sync = sync.with_fatal_hook(hook);
        }

        let dispatcher = if with_dispatcher {
            let pool = self.pool.unwrap_or_else(MessagePool::global);
            Some(Arc::new(Dispatcher::with_pool(self.config.dispatcher, pool)?))
        } else {
            None
        };

        Ok((sync, dispatcher))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
