//! Thread-safe line writers

use crate::core::Result;
use parking_lot::Mutex;
use std::io::Write;

/// Destination for fully encoded log lines
///
/// `write_line` receives one complete line including its trailing newline.
/// Implementations must make each call atomic with respect to other calls.
pub trait LineSink: Send + Sync {
    fn write_line(&self, line: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;
}

/// Serializes writes to an inner writer behind a single mutex
///
/// # Example
///
/// ```
/// use context_logger::renderers::{LineSink, SyncWriter};
///
/// let writer = SyncWriter::new(Vec::new());
/// writer.write_line(b"hello\n").unwrap();
/// assert_eq!(writer.with_inner(|buf| buf.clone()), b"hello\n");
/// ```
pub struct SyncWriter<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> SyncWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Run `f` with exclusive access to the inner writer
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl SyncWriter<Vec<u8>> {
    /// Buffered output decoded as UTF-8, lossily
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }
}

impl<W: Write + Send> LineSink for SyncWriter<W> {
    fn write_line(&self, line: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.write_all(line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.inner.lock().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct FailWriter;

    impl Write for FailWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "Failed writing"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_not_interleaved() {
        let writer = Arc::new(SyncWriter::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let writer = Arc::clone(&writer);
                thread::spawn(move || {
                    for i in 0..100 {
                        let line = format!("thread={} line={} padding=xxxxxxxxxxxxxxxx\n", t, i);
                        writer.write_line(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = writer.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 800);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("thread=") && l.ends_with("padding=xxxxxxxxxxxxxxxx")));
    }

    #[test]
    fn test_write_error_propagates() {
        let writer = SyncWriter::new(FailWriter);
        let err = writer.write_line(b"x\n").unwrap_err();
        assert!(err.to_string().contains("Failed writing"));
    }
}
