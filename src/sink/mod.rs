//! 日志输出模块

use std::io;

/// 输出 trait
///
/// 可能被多个核心和后台线程同时使用，实现必须自行处理并发。
pub trait Sink: Send + Sync {
    /// 写入一条已编码的日志
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// 将缓冲数据落地，默认无操作
    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

pub mod buffered;
pub mod file;
pub mod memory;
pub mod term;

pub use buffered::BufferedSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use term::TermSink;
