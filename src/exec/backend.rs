// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The executor talks to a `ProcessBackend` instead of `tokio::process`
//! directly. This makes it easy to swap in a scripted backend in tests while
//! keeping the production implementation in [`shell`].
//!
//! - [`ShellBackend`] is the default implementation used by `cmdchain`. It
//!   runs the command text through the platform shell.
//! - Tests can provide their own `ProcessBackend` that, for example, records
//!   which commands were run and replays canned output.
//!
//! [`shell`]: super::shell
//! [`ShellBackend`]: super::ShellBackend

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Live view of the running process handed to output observers.
#[derive(Debug, Clone)]
pub struct ProcessState<'a> {
    command: &'a str,
    timeout: Option<Duration>,
    pid: Option<u32>,
    started: Instant,
}

impl<'a> ProcessState<'a> {
    pub fn new(command: &'a str, timeout: Option<Duration>, pid: Option<u32>) -> Self {
        Self {
            command,
            timeout,
            pid,
            started: Instant::now(),
        }
    }

    /// The exact command line handed to the shell.
    pub fn command_line(&self) -> &str {
        self.command
    }

    /// The timeout being enforced for this process, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// How a process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    /// Exited with a non-zero status (`-1` when killed by a signal).
    Failed(i32),
    /// Killed after exceeding its timeout.
    TimedOut,
    /// Could not be spawned or awaited at all.
    SpawnFailed(String),
}

impl ProcessOutcome {
    pub fn is_successful(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }
}

/// Called once per raw output chunk, in the order chunks are read.
pub type ChunkHandler<'a> = dyn FnMut(&ProcessState<'_>, &[u8]) + Send + 'a;

/// Trait abstracting how a single command line is run.
///
/// Production code uses [`super::ShellBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send {
    /// Run `command` to completion, enforcing `timeout` when present
    /// (`None` means run until the process exits on its own).
    ///
    /// Every output chunk must be passed to `on_chunk` as soon as it is
    /// available. Failures are reported through the returned outcome, never
    /// as a panic.
    fn run<'a>(
        &'a mut self,
        command: &'a str,
        timeout: Option<Duration>,
        on_chunk: &'a mut ChunkHandler<'_>,
    ) -> Pin<Box<dyn Future<Output = ProcessOutcome> + Send + 'a>>;
}
