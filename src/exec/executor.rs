// src/exec/executor.rs

//! Runs one [`Command`] through a [`ProcessBackend`] and classifies the
//! outcome.

use tracing::{debug, info, warn};

use crate::command::{Command, CommandCollection};
use crate::errors::Result;
use crate::output::OutputSink;

use super::backend::{ProcessBackend, ProcessState};

/// Observer invoked once per output chunk with the live process state and
/// the command being run. It is called after the chunk reached the sink.
pub type ExecuteCallback<'a> = dyn FnMut(&ProcessState<'_>, &Command) + Send + 'a;

/// Executes a single command and decides whether its failure is fatal.
///
/// Skippable failures are recorded in the `skipped` collection the executor
/// was built with. Required failures are only reported through the return
/// value; recording them is the caller's job.
pub struct CommandExecutor<'a> {
    backend: &'a mut dyn ProcessBackend,
    sink: &'a dyn OutputSink,
    skipped: &'a mut CommandCollection,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(
        backend: &'a mut dyn ProcessBackend,
        sink: &'a dyn OutputSink,
        skipped: &'a mut CommandCollection,
    ) -> Self {
        Self {
            backend,
            sink,
            skipped,
        }
    }

    /// Run `command` once.
    ///
    /// Returns `Ok(true)` if the run may continue (success, or a skippable
    /// failure), `Ok(false)` if a required command failed. `Err` is only
    /// returned when output could not be written to the sink.
    pub async fn execute(
        &mut self,
        command: &Command,
        mut callback: Option<&mut ExecuteCallback<'_>>,
    ) -> Result<bool> {
        let sink = self.sink;
        let mut sink_error = None;

        let outcome = {
            let mut on_chunk = |state: &ProcessState<'_>, chunk: &[u8]| {
                if sink_error.is_none() {
                    if let Err(e) = sink.write(chunk) {
                        sink_error = Some(e);
                    }
                }
                if let Some(cb) = callback.as_deref_mut() {
                    cb(state, command);
                }
            };

            self.backend
                .run(command.command(), command.timeout(), &mut on_chunk)
                .await
        };

        if let Some(e) = sink_error {
            return Err(e.into());
        }

        if outcome.is_successful() {
            debug!(cmd = %command, "command succeeded");
            return Ok(true);
        }

        if command.is_required() {
            warn!(cmd = %command, ?outcome, "required command failed");
            return Ok(false);
        }

        info!(cmd = %command, ?outcome, "skippable command failed; continuing");
        self.skipped.add(command.clone());
        Ok(true)
    }
}
