//! 待写消息对象池
//!
//! 消息只能按值在 取出 → 填充 → 入队 → 工作线程 → 归还 之间移动，
//! 同一时刻只有一个持有者，归还后的消息不可能再被旧持有者访问。

use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use once_cell::sync::Lazy;

use crate::config::Level;
use crate::dispatch::Emit;
use crate::error::Result;
use crate::record::{Caller, Field};

/// 新消息文本缓冲区的初始容量（字节）
pub const DEFAULT_MESSAGE_CAPACITY: usize = 200;
/// 新消息字段缓冲区的初始容量（个）
pub const DEFAULT_FIELD_CAPACITY: usize = 2;
/// 全局池最多保留的空闲消息数
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

static GLOBAL_POOL: Lazy<Arc<MessagePool>> =
    Lazy::new(|| Arc::new(MessagePool::with_capacity(DEFAULT_POOL_CAPACITY)));

/// 绑定的写入目标：由哪个日志器以哪个级别执行
#[derive(Clone)]
pub struct BoundWrite {
    pub target: Arc<dyn Emit>,
    pub level: Level,
}

/// 一次异步日志调用的待写数据
pub struct PendingMessage {
    message: String,
    fields: Vec<Field>,
    caller: Option<Caller>,
    bound: Option<BoundWrite>,
}

impl PendingMessage {
    fn new() -> Self {
        Self {
            message: String::with_capacity(DEFAULT_MESSAGE_CAPACITY),
            fields: Vec::with_capacity(DEFAULT_FIELD_CAPACITY),
            caller: None,
            bound: None,
        }
    }

    /// 复制消息和字段并绑定写入目标
    pub fn fill(
        &mut self,
        bound: BoundWrite,
        caller: Option<Caller>,
        message: &str,
        fields: &[Field],
    ) {
        self.message.push_str(message);
        self.fields.extend_from_slice(fields);
        self.caller = caller;
        self.bound = Some(bound);
    }

    /// 执行绑定的写入；未绑定时什么也不做
    pub fn invoke(&self) -> Result<()> {
        match &self.bound {
            Some(bound) => bound.target.emit(bound.level, self.caller, &self.message, &self.fields),
            None => Ok(()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn level(&self) -> Option<Level> {
        self.bound.as_ref().map(|bound| bound.level)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn message_capacity(&self) -> usize {
        self.message.capacity()
    }

    pub fn field_capacity(&self) -> usize {
        self.fields.capacity()
    }

    /// 清空内容但保留已分配的容量
    fn clear(&mut self) {
        self.message.clear();
        self.fields.clear();
        self.caller = None;
        self.bound = None;
    }
}

/// 并发安全的消息池
pub struct MessagePool {
    free: ArrayQueue<PendingMessage>,
}

impl MessagePool {
    /// 创建最多保留 `capacity` 条空闲消息的池
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// 进程级共享池
    pub fn global() -> Arc<MessagePool> {
        Arc::clone(&GLOBAL_POOL)
    }

    /// 取出一条空消息，池空时新建；从不阻塞
    pub fn acquire(&self) -> PendingMessage {
        self.free.pop().unwrap_or_else(PendingMessage::new)
    }

    /// 清空并归还消息；池满时直接丢弃
    pub fn release(&self, mut message: PendingMessage) {
        message.clear();
        let _ = self.free.push(message);
    }

    /// 当前空闲消息数
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl Default for MessagePool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }
}
