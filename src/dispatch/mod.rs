//! 异步分发 - 有界队列 + 单个后台工作线程
//!
//! 生产者把消息放入有界队列，队列满时阻塞（背压），不丢弃也不无限缓冲。
//! 工作线程按 FIFO 顺序逐条执行绑定的写入，完成后把消息还给对象池。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, SendError, Sender, bounded};
use parking_lot::{Mutex, RwLock};

use crate::config::{DispatcherConfig, Level};
use crate::error::{LogError, Result};
use crate::record::{Caller, Field};

pub mod pool;

pub use pool::{BoundWrite, MessagePool, PendingMessage};

/// 写入目标 trait - 由工作线程在后台调用
pub trait Emit: Send + Sync {
    fn emit(&self, level: Level, caller: Option<Caller>, message: &str, fields: &[Field]) -> Result<()>;
}

/// 分发命令
enum DispatchCommand {
    /// 写入一条消息
    Write(PendingMessage),
    /// 之前的命令全部处理完后回复
    Flush(Sender<()>),
}

/// 分发统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// 成功入队的消息数
    pub enqueued: u64,
    /// 写入成功的消息数
    pub written: u64,
    /// 写入失败的消息数
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// 异步分发器
///
/// 关闭只能由持有者调用 [`Dispatcher::shutdown`] 或在 drop 时完成；
/// 关闭会先写完队列中已有的消息再退出工作线程。
pub struct Dispatcher {
    sender: RwLock<Option<Sender<DispatchCommand>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    pool: Arc<MessagePool>,
    counters: Arc<Counters>,
    capacity: usize,
}

impl Dispatcher {
    /// 使用全局对象池创建分发器
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        Self::with_pool(config, MessagePool::global())
    }

    /// 使用指定对象池创建分发器
    pub fn with_pool(config: DispatcherConfig, pool: Arc<MessagePool>) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = bounded(config.queue_capacity);
        let counters = Arc::new(Counters::default());
        let worker_pool = Arc::clone(&pool);
        let worker_counters = Arc::clone(&counters);

        let worker = thread::spawn(move || {
            Self::worker_thread(receiver, worker_pool, worker_counters);
        });

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            pool,
            counters,
            capacity: config.queue_capacity,
        })
    }

    /// 工作线程：通道关闭且积压消息全部处理完后退出
    fn worker_thread(receiver: Receiver<DispatchCommand>, pool: Arc<MessagePool>, counters: Arc<Counters>) {
        while let Ok(command) = receiver.recv() {
            match command {
                DispatchCommand::Write(message) => {
                    match message.invoke() {
                        Ok(()) => {
                            counters.written.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            counters.failed.fetch_add(1, Ordering::Relaxed);
                            eprintln!("[dispatcher] 异步写入失败: {}", e);
                        }
                    }
                    // 写入返回后才归还
                    pool.release(message);
                }
                DispatchCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    }

    /// 复制消息和字段，绑定写入目标后入队；队列满时阻塞
    pub fn enqueue(
        &self,
        target: &Arc<dyn Emit>,
        level: Level,
        caller: Option<Caller>,
        message: &str,
        fields: &[Field],
    ) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(LogError::DispatcherClosed)?;

        let mut pending = self.pool.acquire();
        let bound = BoundWrite {
            target: Arc::clone(target),
            level,
        };
        pending.fill(bound, caller, message, fields);

        match sender.send(DispatchCommand::Write(pending)) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(SendError(command)) => {
                if let DispatchCommand::Write(pending) = command {
                    self.pool.release(pending);
                }
                Err(LogError::DispatcherClosed)
            }
        }
    }

    /// 等待此前入队的消息全部写完
    pub fn flush(&self) -> Result<()> {
        let (ack, done) = bounded(1);
        {
            let guard = self.sender.read();
            let sender = guard.as_ref().ok_or(LogError::DispatcherClosed)?;
            sender
                .send(DispatchCommand::Flush(ack))
                .map_err(|_| LogError::DispatcherClosed)?;
        }
        done.recv().map_err(|_| LogError::DispatcherClosed)
    }

    /// 关闭队列，写完积压消息后等待工作线程退出；重复关闭返回错误
    pub fn shutdown(&self) -> Result<()> {
        let sender = self.sender.write().take();
        let Some(sender) = sender else {
            return Err(LogError::DispatcherClosed);
        };
        drop(sender);

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                eprintln!("[dispatcher] 工作线程异常退出");
            }
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// 队列容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前排队中的命令数
    pub fn queued(&self) -> usize {
        self.sender.read().as_ref().map_or(0, |sender| sender.len())
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
