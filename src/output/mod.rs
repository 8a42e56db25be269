// src/output/mod.rs

//! Append-only output sink shared by the executor (raw process output) and
//! the handler (status lines).
//!
//! Writes must land in exactly the order they are produced, so every
//! implementation writes through immediately instead of batching.

use std::fmt::Debug;
use std::io::Write;

use anyhow::{Context, Result};

pub mod buffer;

pub use buffer::BufferedSink;

/// Abstract output interface.
pub trait OutputSink: Send + Sync + Debug {
    /// Write raw bytes exactly as received from a process.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Write a formatted status line followed by a newline.
    fn write_line(&self, line: &str) -> Result<()>;
}

/// Sink that writes to the process's stdout, flushing after every write so
/// child output shows up live.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(bytes).context("writing process output to stdout")?;
        out.flush().context("flushing stdout")?;
        Ok(())
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").context("writing status line to stdout")?;
        out.flush().context("flushing stdout")?;
        Ok(())
    }
}
