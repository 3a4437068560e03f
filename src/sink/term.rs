//! 终端输出

use std::io::{self, LineWriter, Write};

use parking_lot::Mutex;

use crate::sink::Sink;

/// 终端输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStream {
    Stdout,
    Stderr,
}

/// 终端输出 - 按行缓冲，遇到换行即写出
pub struct TermSink {
    stream: TermStream,
    out: Mutex<LineWriter<Box<dyn Write + Send>>>,
}

impl TermSink {
    pub fn stdout() -> Self {
        Self::new(TermStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(TermStream::Stderr)
    }

    pub fn new(stream: TermStream) -> Self {
        let inner: Box<dyn Write + Send> = match stream {
            TermStream::Stdout => Box::new(io::stdout()),
            TermStream::Stderr => Box::new(io::stderr()),
        };
        Self {
            stream,
            out: Mutex::new(LineWriter::new(inner)),
        }
    }

    pub fn stream(&self) -> TermStream {
        self.stream
    }
}

impl Sink for TermSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self.out.lock();
        out.write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.out.lock().flush()
    }
}

impl Drop for TermSink {
    fn drop(&mut self) {
        if let Err(e) = self.out.get_mut().flush() {
            eprintln!("[term] 最终刷新失败: {}", e);
        }
    }
}
