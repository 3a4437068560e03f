//! 日志核心模块 - 按级别路由的编码与写出

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::Level;
use crate::encoder::Encoder;
use crate::error::{LogError, Result};
use crate::record::{Field, Record};
use crate::sink::Sink;

/// 级别开关 trait
pub trait LevelEnabler: Send + Sync {
    fn enabled(&self, level: Level) -> bool;
}

/// 固定的最低级别
impl LevelEnabler for Level {
    fn enabled(&self, level: Level) -> bool {
        level >= *self
    }
}

/// 可共享、可运行时修改的最低级别
///
/// 克隆共享同一个原子变量，修改对所有持有者立即可见。
#[derive(Debug, Clone)]
pub struct AtomicLevel(Arc<AtomicU8>);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self(Arc::new(AtomicU8::new(level as u8)))
    }

    /// 获取当前最低级别
    pub fn level(&self) -> Level {
        Level::from_index(self.0.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// 设置最低级别
    pub fn set_level(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl LevelEnabler for AtomicLevel {
    fn enabled(&self, level: Level) -> bool {
        level as u8 >= self.0.load(Ordering::Relaxed)
    }
}

/// 级别到输出的映射
#[derive(Clone, Default)]
pub struct SinkTable {
    sinks: [Option<Arc<dyn Sink>>; Level::COUNT],
}

impl SinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为级别注册输出，返回被替换的旧输出
    pub fn insert(&mut self, level: Level, sink: Arc<dyn Sink>) -> Option<Arc<dyn Sink>> {
        self.sinks[level.index()].replace(sink)
    }

    pub fn with(mut self, level: Level, sink: Arc<dyn Sink>) -> Self {
        self.insert(level, sink);
        self
    }

    /// 所有级别共用同一个输出
    pub fn with_all(mut self, sink: Arc<dyn Sink>) -> Self {
        for level in Level::ALL {
            self.insert(level, Arc::clone(&sink));
        }
        self
    }

    pub fn get(&self, level: Level) -> Option<&Arc<dyn Sink>> {
        self.sinks[level.index()].as_ref()
    }

    pub fn contains(&self, level: Level) -> bool {
        self.sinks[level.index()].is_some()
    }

    /// 已注册输出的级别
    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        Level::ALL.into_iter().filter(|level| self.contains(*level))
    }

    pub fn is_empty(&self) -> bool {
        self.levels().next().is_none()
    }

    /// 去重后的输出，多个级别共用的输出只出现一次
    pub fn distinct(&self) -> Vec<&Arc<dyn Sink>> {
        let mut seen: Vec<&Arc<dyn Sink>> = Vec::with_capacity(Level::COUNT);
        for sink in self.sinks.iter().flatten() {
            if !seen.iter().any(|s| Arc::ptr_eq(s, sink)) {
                seen.push(sink);
            }
        }
        seen
    }
}

impl FromIterator<(Level, Arc<dyn Sink>)> for SinkTable {
    fn from_iter<I: IntoIterator<Item = (Level, Arc<dyn Sink>)>>(iter: I) -> Self {
        let mut table = SinkTable::new();
        for (level, sink) in iter {
            table.insert(level, sink);
        }
        table
    }
}

/// 处理单元 trait
pub trait Core: Send + Sync {
    /// 级别是否开启；每条日志都会调用，不能分配内存
    fn enabled(&self, level: Level) -> bool;

    /// 返回固化了字段的新核心，自身不变
    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Core>;

    /// 编码前的检查，返回 false 时调用方应跳过所有后续工作
    fn check(&self, level: Level) -> bool {
        self.enabled(level)
    }

    /// 编码并写出记录
    fn write(&self, record: &Record<'_>, fields: &[Field]) -> Result<()>;

    fn sync(&self) -> Result<()>;

    /// 同步所有已注册的输出，进程终止前调用
    fn sync_sinks(&self) -> Result<()> {
        Ok(())
    }
}

/// 按级别路由的核心
///
/// 构造后不可变；`with_fields` 只复制编码器，输出表和级别开关共享。
#[derive(Clone)]
pub struct LevelCore {
    encoder: Arc<dyn Encoder>,
    sinks: Arc<SinkTable>,
    enabler: Arc<dyn LevelEnabler>,
    flush_level: Level,
}

impl LevelCore {
    /// 创建核心，默认 Error 及以上级别写入后立即同步
    pub fn new(encoder: Box<dyn Encoder>, sinks: SinkTable, enabler: Arc<dyn LevelEnabler>) -> Self {
        Self {
            encoder: Arc::from(encoder),
            sinks: Arc::new(sinks),
            enabler,
            flush_level: Level::Error,
        }
    }

    /// 设置写入后立即同步的最低级别
    pub fn with_flush_level(mut self, level: Level) -> Self {
        self.flush_level = level;
        self
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level
    }

    pub fn sinks(&self) -> &Arc<SinkTable> {
        &self.sinks
    }

    /// 固化字段，返回具体类型
    pub fn with_fields_core(&self, fields: &[Field]) -> LevelCore {
        let mut encoder = self.encoder.clone_encoder();
        for field in fields {
            encoder.add_field(field);
        }
        LevelCore {
            encoder: Arc::from(encoder),
            sinks: Arc::clone(&self.sinks),
            enabler: Arc::clone(&self.enabler),
            flush_level: self.flush_level,
        }
    }
}

impl Core for LevelCore {
    fn enabled(&self, level: Level) -> bool {
        self.enabler.enabled(level)
    }

    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(self.with_fields_core(fields))
    }

    fn write(&self, record: &Record<'_>, fields: &[Field]) -> Result<()> {
        let sink = self
            .sinks
            .get(record.level)
            .ok_or(LogError::NoSinkForLevel(record.level))?;

        let buf = self.encoder.encode_entry(record, fields)?;

        let written = sink.write(&buf).map_err(LogError::SinkWrite)?;
        if written < buf.len() {
            return Err(LogError::SinkWrite(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, buf.len()),
            )));
        }

        if record.level >= self.flush_level {
            sink.sync().map_err(LogError::SinkSync)?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }

    /// 逐个同步，返回第一个错误
    fn sync_sinks(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.sinks.distinct() {
            if let Err(e) = sink.sync() {
                if first_error.is_none() {
                    first_error = Some(LogError::SinkSync(e));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// 空核心 - 任何级别都不开启，写入直接丢弃
#[derive(Debug, Clone, Copy, Default)]
pub struct NopCore;

impl Core for NopCore {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn with_fields(&self, _fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(NopCore)
    }

    fn write(&self, _record: &Record<'_>, _fields: &[Field]) -> Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
