//! 异步日志器 - 普通级别交给分发器，DPanic / Panic / Fatal 排空队列后直接写出

use std::sync::Arc;

use crate::config::Level;
use crate::dispatch::{Dispatcher, DispatcherStats, Emit};
use crate::error::{LogError, Result};
use crate::logger::{LogOper, SyncLogger};
use crate::record::{Caller, Field};

/// 异步日志器
#[derive(Clone)]
pub struct AsyncLogger {
    inner: Arc<SyncLogger>,
    /// 与 `inner` 指向同一对象，作为分发器的写入目标
    target: Arc<dyn Emit>,
    dispatcher: Arc<Dispatcher>,
}

impl AsyncLogger {
    pub fn new(inner: SyncLogger, dispatcher: Arc<Dispatcher>) -> Self {
        let inner = Arc::new(inner);
        let target: Arc<dyn Emit> = inner.clone();
        Self {
            inner,
            target,
            dispatcher,
        }
    }

    pub fn inner(&self) -> &SyncLogger {
        &self.inner
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn stats(&self) -> DispatcherStats {
        self.dispatcher.stats()
    }

    /// 停止分发器，队列中的消息写完后返回
    pub fn shutdown(&self) -> Result<()> {
        self.dispatcher.shutdown()
    }
}

impl LogOper for AsyncLogger {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn log(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()> {
        if level >= Level::DPanic {
            // 先写完队列中更早的记录，保证顺序，并且 Fatal 退出前不丢失
            match self.dispatcher.flush() {
                Ok(()) | Err(LogError::DispatcherClosed) => {}
                Err(e) => eprintln!("[logger] {} 级别写出前排空队列失败: {}", level, e),
            }
            return self.inner.log(level, caller, message, fields);
        }
        if !self.inner.enabled(level) {
            return Ok(());
        }
        self.dispatcher.enqueue(&self.target, level, caller, message, fields)
    }

    fn with_fields(&self, fields: &[Field]) -> Self {
        Self::new(self.inner.with_fields(fields), Arc::clone(&self.dispatcher))
    }

    /// 等待已入队的消息写完，再同步核心
    fn sync(&self) -> Result<()> {
        self.dispatcher.flush()?;
        self.inner.sync()
    }
}
