//! 内存输出 - 保存每一次写入，便于测试和嵌入使用

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::sink::Sink;

/// 内存输出
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<Vec<u8>>>,
    syncs: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有写入，按到达顺序
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().clone()
    }

    /// 所有写入按 UTF-8 解码后的文本
    pub fn lines(&self) -> Vec<String> {
        self.writes
            .lock()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    /// 设为失败模式后，写入返回 IO 错误且不保存数据
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.writes.lock().clear();
        self.syncs.store(0, Ordering::SeqCst);
    }
}

impl Sink for MemorySink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "memory sink is failing"));
        }
        self.writes.lock().push(buf.to_vec());
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
