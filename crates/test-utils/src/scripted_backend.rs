use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdchain::exec::{ChunkHandler, ProcessBackend, ProcessOutcome, ProcessState};

/// What a scripted command prints and how it ends.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub chunks: Vec<Vec<u8>>,
    pub outcome: ProcessOutcome,
}

/// One call the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub command: String,
    pub timeout: Option<Duration>,
}

/// A fake backend that:
/// - records every command line (and timeout) it was asked to run
/// - replays canned output chunks and outcomes per command line
/// - treats unscripted commands as silent successes
///
/// Clones share state, so keep one clone for assertions and hand another to
/// the handler.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<HashMap<String, ScriptedRun>>>,
    runs: Arc<Mutex<Vec<RecordedRun>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, command: &str, chunks: &[&str], outcome: ProcessOutcome) -> Self {
        let run = ScriptedRun {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            outcome,
        };
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), run);
        self
    }

    /// Script a success; an empty `output` produces no chunks at all.
    pub fn succeed(self, command: &str, output: &str) -> Self {
        if output.is_empty() {
            self.script(command, &[], ProcessOutcome::Success)
        } else {
            self.script(command, &[output], ProcessOutcome::Success)
        }
    }

    pub fn fail(self, command: &str, exit_code: i32) -> Self {
        self.script(command, &[], ProcessOutcome::Failed(exit_code))
    }

    pub fn time_out(self, command: &str) -> Self {
        self.script(command, &[], ProcessOutcome::TimedOut)
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn commands_run(&self) -> Vec<String> {
        self.runs().into_iter().map(|r| r.command).collect()
    }
}

impl ProcessBackend for ScriptedBackend {
    fn run<'a>(
        &'a mut self,
        command: &'a str,
        timeout: Option<Duration>,
        on_chunk: &'a mut ChunkHandler<'_>,
    ) -> Pin<Box<dyn Future<Output = ProcessOutcome> + Send + 'a>> {
        Box::pin(async move {
            self.runs.lock().unwrap().push(RecordedRun {
                command: command.to_string(),
                timeout,
            });

            let scripted = self
                .script
                .lock()
                .unwrap()
                .get(command)
                .cloned()
                .unwrap_or(ScriptedRun {
                    chunks: Vec::new(),
                    outcome: ProcessOutcome::Success,
                });

            let state = ProcessState::new(command, timeout, None);
            for chunk in &scripted.chunks {
                on_chunk(&state, chunk);
            }
            scripted.outcome
        })
    }
}
