//! 同步日志器 - 调用线程直接编码并写出

use std::sync::Arc;

use crate::config::Level;
use crate::core::{AtomicLevel, Core};
use crate::dispatch::Emit;
use crate::error::Result;
use crate::logger::LogOper;
use crate::record::{Caller, Field, Record};

/// Fatal 级别记录后调用的终止函数，参数为日志消息
pub type FatalHook = Arc<dyn Fn(&str) + Send + Sync>;

/// 默认终止函数：以状态码 1 退出进程
pub fn exit_process() -> FatalHook {
    Arc::new(|_message: &str| std::process::exit(1))
}

/// 同步日志器
#[derive(Clone)]
pub struct SyncLogger {
    core: Arc<dyn Core>,
    development: bool,
    fatal_hook: FatalHook,
    level: Option<AtomicLevel>,
}

impl SyncLogger {
    pub fn new(core: Arc<dyn Core>) -> Self {
        Self {
            core,
            development: false,
            fatal_hook: exit_process(),
            level: None,
        }
    }

    /// 开发模式下 DPanic 记录后触发 panic
    pub fn with_development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    pub fn with_fatal_hook(mut self, hook: FatalHook) -> Self {
        self.fatal_hook = hook;
        self
    }

    /// 关联共享级别，便于通过日志器调整
    pub fn with_level_handle(mut self, level: AtomicLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn core(&self) -> &Arc<dyn Core> {
        &self.core
    }

    pub fn level_handle(&self) -> Option<&AtomicLevel> {
        self.level.as_ref()
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    /// 只写出，不执行 panic / 退出
    pub(crate) fn write_entry(
        &self,
        level: Level,
        caller: Option<Caller>,
        message: &str,
        fields: &[Field],
    ) -> Result<()> {
        if !self.core.check(level) {
            return Ok(());
        }
        let record = Record::new(level, message).with_caller(caller);
        self.core.write(&record, fields)
    }

    /// 写出之后的收尾：Panic 触发 panic，Fatal 调用终止函数
    pub(crate) fn finish(&self, level: Level, message: &str, result: Result<()>) -> Result<()> {
        let terminal = match level {
            Level::DPanic => self.development,
            Level::Panic | Level::Fatal => true,
            _ => false,
        };
        if !terminal {
            return result;
        }

        // 调用方拿不到写入结果，先打印出来
        if let Err(e) = &result {
            eprintln!("[logger] {} 级别日志写入失败: {}", level, e);
        }
        match level {
            Level::Fatal => {
                if let Err(e) = self.core.sync_sinks() {
                    eprintln!("[logger] 退出前同步输出失败: {}", e);
                }
                (self.fatal_hook)(message);
                result
            }
            _ => panic!("{}", message),
        }
    }
}

impl LogOper for SyncLogger {
    fn enabled(&self, level: Level) -> bool {
        self.core.check(level)
    }

    fn log(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()> {
        let result = self.write_entry(level, caller, message, fields);
        self.finish(level, message, result)
    }

    fn with_fields(&self, fields: &[Field]) -> Self {
        Self {
            core: self.core.with_fields(fields),
            development: self.development,
            fatal_hook: Arc::clone(&self.fatal_hook),
            level: self.level.clone(),
        }
    }

    fn sync(&self) -> Result<()> {
        self.core.sync()
    }
}

/// 后台线程调用的写入入口，只处理普通级别
impl Emit for SyncLogger {
    fn emit(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()> {
        self.write_entry(level, caller, message, fields)
    }
}
