// src/output/buffer.rs

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;

use super::OutputSink;

/// In-memory sink. Clones share the same buffer, so a caller can hand one
/// clone to a handler and read everything back through another.
#[derive(Debug, Clone, Default)]
pub struct BufferedSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Return everything written so far and clear the buffer.
    pub fn fetch(&self) -> String {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let out = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        out
    }
}

impl OutputSink for BufferedSink {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_buffer_in_write_order() {
        let sink = BufferedSink::new();
        let writer = sink.clone();

        writer.write_line("Executing: echo foo").unwrap();
        writer.write(b"foo").unwrap();
        writer.write(b"\n").unwrap();

        assert_eq!(sink.contents(), "Executing: echo foo\nfoo\n");
        assert_eq!(sink.fetch(), "Executing: echo foo\nfoo\n");
        assert_eq!(sink.fetch(), "");
    }
}
