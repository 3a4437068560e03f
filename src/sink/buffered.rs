//! 缓冲输出 - 写入进入有界通道，由后台线程交给内层输出

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::sink::Sink;

enum BufferCommand {
    Write(Vec<u8>),
    /// 处理完之前的写入后同步内层输出并回复结果
    Sync(Sender<io::Result<()>>),
}

/// 后台缓冲输出
///
/// 调用方传入的数据会被复制，写入返回时数据可能尚未落地；
/// 后台写入失败没有调用方可以返回，只打印到 stderr 并计数。
pub struct BufferedSink {
    sender: Option<Sender<BufferCommand>>,
    worker: Option<thread::JoinHandle<()>>,
    failed: Arc<AtomicU64>,
}

impl BufferedSink {
    /// 创建缓冲输出，`capacity` 为通道中最多积压的写入条数
    pub fn new(inner: Arc<dyn Sink>, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        let failed = Arc::new(AtomicU64::new(0));
        let worker_failed = Arc::clone(&failed);

        let worker = thread::spawn(move || {
            Self::worker_thread(inner, receiver, worker_failed);
        });

        Self {
            sender: Some(sender),
            worker: Some(worker),
            failed,
        }
    }

    fn worker_thread(inner: Arc<dyn Sink>, receiver: Receiver<BufferCommand>, failed: Arc<AtomicU64>) {
        while let Ok(command) = receiver.recv() {
            match command {
                BufferCommand::Write(data) => {
                    if let Err(e) = inner.write(&data) {
                        failed.fetch_add(1, Ordering::Relaxed);
                        eprintln!("[buffered] 后台写入失败: {}", e);
                    }
                }
                BufferCommand::Sync(reply) => {
                    let _ = reply.send(inner.sync());
                }
            }
        }

        if let Err(e) = inner.sync() {
            eprintln!("[buffered] 关闭时同步失败: {}", e);
        }
    }

    /// 后台写入失败次数
    pub fn failed_writes(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn send(&self, command: BufferCommand) -> io::Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "buffered sink is closed"))?;
        sender
            .send(command)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "buffered sink worker exited"))
    }
}

impl Sink for BufferedSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.send(BufferCommand::Write(buf.to_vec()))?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        let (reply, result) = bounded(1);
        self.send(BufferCommand::Sync(reply))?;
        result
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "buffered sink worker exited"))?
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        // 关闭通道，后台线程写完积压数据后退出
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_buffered_sink_forwards_in_order() {
        let memory = Arc::new(MemorySink::new());
        let sink = BufferedSink::new(memory.clone(), 4);

        for i in 0..20 {
            sink.write(format!("line {}\n", i).as_bytes()).unwrap();
        }
        sink.sync().unwrap();

        let lines = memory.lines();
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[0], "line 0\n");
        assert_eq!(lines[19], "line 19\n");
        assert_eq!(memory.sync_count(), 1);
    }

    #[test]
    fn test_buffered_sink_counts_failures() {
        let memory = Arc::new(MemorySink::new());
        memory.set_failing(true);
        let sink = BufferedSink::new(memory.clone(), 2);

        // 写入本身成功，失败发生在后台
        assert!(sink.write(b"lost\n").is_ok());
        sink.sync().unwrap();
        assert_eq!(sink.failed_writes(), 1);
        assert_eq!(memory.write_count(), 0);
    }

    #[test]
    fn test_buffered_sink_drains_on_drop() {
        let memory = Arc::new(MemorySink::new());
        {
            let sink = BufferedSink::new(memory.clone(), 64);
            for _ in 0..10 {
                sink.write(b"x\n").unwrap();
            }
        }
        assert_eq!(memory.write_count(), 10);
    }
}
