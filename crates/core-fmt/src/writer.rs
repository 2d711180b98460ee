//! Writer hierarchy: counting, builder-backed and buffered console writers.
//!
//! The writer interface itself is the context's [`LogWriter`] trait so the
//! formatter can print straight to whatever the context's `log` points at.

use parking_lot::ReentrantMutex;

use core_collections::TextBuilder;
use core_memory::context::LogHandle;

pub use core_memory::context::LogWriter as Writer;

/// Discards bytes and counts them. Used to pre-size `sprint` output.
#[derive(Debug, Default)]
pub struct CountingWriter {
    pub count: i64,
}

impl CountingWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Writer for CountingWriter {
    fn write(&mut self, bytes: &[u8]) {
        self.count += bytes.len() as i64;
    }
}

/// Appends into an owned [`TextBuilder`].
#[derive(Default)]
pub struct BuilderWriter {
    pub builder: TextBuilder,
}

impl BuilderWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_text(&self) -> core_collections::Text {
        self.builder.to_text()
    }
}

impl Writer for BuilderWriter {
    fn write(&mut self, bytes: &[u8]) {
        self.builder.add_bytes(bytes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

pub const CONSOLE_BUFFER_SIZE: usize = 1024;

static STDOUT_LOCK: ReentrantMutex<()> = ReentrantMutex::new(());
static STDERR_LOCK: ReentrantMutex<()> = ReentrantMutex::new(());

/// Buffered console writer: 1 KiB per stream, one OS write per flush, and a
/// per-stream recursive mutex around the flush (on by default).
pub struct ConsoleWriter {
    stream: ConsoleStream,
    buffer: [u8; CONSOLE_BUFFER_SIZE],
    len: usize,
    pub lock_mutex: bool,
}

impl ConsoleWriter {
    pub fn new(stream: ConsoleStream) -> Self {
        ConsoleWriter {
            stream,
            buffer: [0; CONSOLE_BUFFER_SIZE],
            len: 0,
            lock_mutex: true,
        }
    }

    fn handle(&self) -> LogHandle {
        match self.stream {
            ConsoleStream::Stdout => LogHandle::Stdout,
            ConsoleStream::Stderr => LogHandle::Stderr,
        }
    }

    fn mutex(&self) -> &'static ReentrantMutex<()> {
        match self.stream {
            ConsoleStream::Stdout => &STDOUT_LOCK,
            ConsoleStream::Stderr => &STDERR_LOCK,
        }
    }
}

impl Writer for ConsoleWriter {
    fn write(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let room = CONSOLE_BUFFER_SIZE - self.len;
            if room == 0 {
                self.flush();
                continue;
            }
            let take = room.min(bytes.len());
            self.buffer[self.len..self.len + take].copy_from_slice(&bytes[..take]);
            self.len += take;
            bytes = &bytes[take..];
        }
    }

    fn flush(&mut self) {
        if self.len == 0 {
            return;
        }
        let guard = self.lock_mutex.then(|| self.mutex().lock());
        self.handle().write(&self.buffer[..self.len]);
        self.len = 0;
        drop(guard);
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_writer_counts() {
        let mut w = CountingWriter::new();
        w.write(b"hello");
        w.write(b", world");
        assert_eq!(w.count, 12);
        w.flush();
        assert_eq!(w.count, 12);
    }

    #[test]
    fn builder_writer_accumulates() {
        let mut w = BuilderWriter::new();
        w.write(b"abc");
        w.write("Д".as_bytes());
        assert_eq!(w.to_text(), "abcД");
    }

    #[test]
    fn console_writer_buffers_until_flush() {
        // Write more than one buffer's worth; it must not lose anything or
        // deadlock on the recursive mutex.
        let mut w = ConsoleWriter::new(ConsoleStream::Stderr);
        let _outer = STDERR_LOCK.lock(); // reentrant: flush under our lock is fine
        for _ in 0..3 {
            w.write(&[b'.'; 700]);
        }
        w.flush();
        assert_eq!(w.len, 0);
    }
}
