// src/handler/command_handler.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::command::{CollectionManager, Command, CommandCollection, CommandId};
use crate::errors::{HandlerError, Result};
use crate::exec::{CommandExecutor, ExecuteCallback, ProcessBackend, ShellBackend};
use crate::output::OutputSink;
use crate::types::{CollectionKind, MergeMode, RunState};

use super::cache::CommandCache;
use super::merge::merge_command;
use super::messages::{status_line, MessageHandler};

/// Sequential command orchestrator.
///
/// Commands are queued with [`add`](Self::add) and friends; the handler's
/// prefix and default timeout are applied once, at the moment a command is
/// queued. [`execute`](Self::execute) then runs the queue in order:
///
/// - a failing *required* command is recorded in `error` and halts the run,
/// - a failing *skippable* command is recorded in `skipped` and the run goes
///   on,
/// - every command that didn't halt the run is cached and left out of later
///   runs until the cache is reset.
///
/// Failures never surface as `Err`; inspect [`has_error`](Self::has_error)
/// and [`has_skipped`](Self::has_skipped) after the call instead.
pub struct CommandHandler {
    prefix: String,
    default_timeout: Option<Duration>,
    collections: CollectionManager,
    state: RunState,
    next_id: u64,
    backend: Box<dyn ProcessBackend>,
    sink: Arc<dyn OutputSink>,
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("prefix", &self.prefix)
            .field("default_timeout", &self.default_timeout)
            .field("collections", &self.collections)
            .field("state", &self.state)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    /// Handler that runs commands through the platform shell.
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self::with_backend(ShellBackend::new(), sink)
    }

    pub fn with_backend(backend: impl ProcessBackend + 'static, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            prefix: String::new(),
            default_timeout: None,
            collections: CollectionManager::new(),
            state: RunState::Idle,
            next_id: 0,
            backend: Box::new(backend),
            sink,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Only affects commands queued afterwards.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    /// Default timeout backfilled into commands that don't carry one.
    pub fn timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Only affects commands queued afterwards.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.default_timeout = timeout;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn output(&self) -> &Arc<dyn OutputSink> {
        &self.sink
    }

    /// Every queued command, in queue order.
    pub fn commands(&self) -> &[Command] {
        self.collections
            .get(CollectionKind::All)
            .map(CommandCollection::as_slice)
            .unwrap_or(&[])
    }

    /// Read-only access to one of the collections, if it was ever used.
    pub fn collection(&self, kind: CollectionKind) -> Option<&CommandCollection> {
        self.collections.get(kind)
    }

    /// Queue a required command.
    pub fn add(&mut self, text: impl Into<String>) -> Result<&mut Self> {
        self.add_command(Command::new(text))
    }

    /// Queue a command whose failure doesn't halt the run.
    pub fn add_skippable(&mut self, text: impl Into<String>) -> Result<&mut Self> {
        self.add_command(Command::skippable(text))
    }

    /// Queue a command, prefixing its text and backfilling the default
    /// timeout if it has none.
    pub fn add_command(&mut self, mut command: Command) -> Result<&mut Self> {
        if command.command().trim().is_empty() {
            return Err(HandlerError::EmptyCommand);
        }

        command.set_command(format!("{}{}", self.prefix, command.command()));
        if command.timeout().is_none() {
            command.set_timeout(self.default_timeout);
        }

        self.enqueue(command);
        Ok(self)
    }

    pub fn add_commands<I>(&mut self, commands: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.add_command(command)?;
        }
        Ok(self)
    }

    /// Queue several required commands.
    pub fn add_collection<I, S>(&mut self, texts: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_commands(texts.into_iter().map(Command::new))
    }

    /// Queue several skippable commands.
    pub fn add_skippable_collection<I, S>(&mut self, texts: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_commands(texts.into_iter().map(Command::skippable))
    }

    /// Append copies of every command queued in `donor`.
    ///
    /// `prefix_mode` and `timeout_mode` decide whether this handler's prefix
    /// and default timeout override the donor's (see [`MergeMode`]). The
    /// donor is left untouched, and this handler's own prefix is not applied
    /// a second time.
    pub fn add_handler(
        &mut self,
        donor: &CommandHandler,
        prefix_mode: MergeMode,
        timeout_mode: MergeMode,
    ) -> &mut Self {
        if donor.commands().is_empty() {
            debug!("donor handler has no commands; nothing to merge");
            return self;
        }

        let receiver: &CommandHandler = self;
        let merged: Vec<_> = donor
            .commands()
            .iter()
            .map(|c| merge_command(receiver, donor, c, prefix_mode, timeout_mode))
            .collect();

        info!(
            count = merged.len(),
            ?prefix_mode,
            ?timeout_mode,
            "merging commands from another handler"
        );

        for command in merged {
            self.enqueue(command);
        }
        self
    }

    fn enqueue(&mut self, mut command: Command) {
        command.set_id(CommandId(self.next_id));
        self.next_id += 1;

        debug!(
            cmd = %command,
            required = command.is_required(),
            timeout = ?command.timeout(),
            "queued command"
        );
        self.collections
            .collection_mut(CollectionKind::All)
            .add(command);
    }

    /// Run every queued command that isn't cached yet, one at a time.
    ///
    /// With `use_cache = false` the cache and the skipped record are cleared
    /// first, so everything runs again. The error record is always cleared.
    /// `callback` is invoked once per output chunk with the live process
    /// state and the command being run.
    ///
    /// Only output failures are returned as `Err`. A run interrupted that way
    /// ends in [`RunState::Halted`]; the command being run is neither cached
    /// nor recorded as an error.
    pub async fn execute(
        &mut self,
        callback: Option<&mut ExecuteCallback<'_>>,
        use_cache: bool,
    ) -> Result<&mut Self> {
        // The previous fatal command was never cached, so it runs again.
        self.collections
            .collection_mut(CollectionKind::Error)
            .reset();

        if use_cache {
            self.show_cached_messages()?;
        } else {
            CommandCache::new(&mut self.collections).reset();
            self.collections
                .collection_mut(CollectionKind::Skipped)
                .reset();
        }

        let executable = CommandCache::new(&mut self.collections).executable();
        info!(count = executable.len(), use_cache, "executing commands");
        self.state = RunState::Running;

        match self.run_queue(executable, callback).await {
            Ok(state) => {
                self.state = state;
                Ok(self)
            }
            Err(err) => {
                warn!(error = %err, "output failed; halting run");
                self.state = RunState::Halted;
                Err(err)
            }
        }
    }

    async fn run_queue(
        &mut self,
        executable: Vec<Command>,
        mut callback: Option<&mut ExecuteCallback<'_>>,
    ) -> Result<RunState> {
        for command in executable {
            self.sink.write_line(&status_line("Executing", &command))?;

            let keep_going = {
                let mut executor = CommandExecutor::new(
                    &mut *self.backend,
                    self.sink.as_ref(),
                    self.collections.collection_mut(CollectionKind::Skipped),
                );
                executor.execute(&command, callback.as_deref_mut()).await?
            };

            if !keep_going {
                warn!(cmd = %command, "required command failed; halting run");
                self.collections
                    .collection_mut(CollectionKind::Error)
                    .add(command);
                return Ok(RunState::Halted);
            }

            CommandCache::new(&mut self.collections).cache(command);
        }

        info!("all commands executed");
        Ok(RunState::Completed)
    }

    /// Forget which commands already succeeded.
    pub fn reset_cache(&mut self) -> &mut Self {
        CommandCache::new(&mut self.collections).reset();
        self
    }

    pub fn has_skipped(&self) -> bool {
        self.messages().has_command_in_collection(CollectionKind::Skipped)
    }

    pub fn has_error(&self) -> bool {
        self.messages().has_command_in_collection(CollectionKind::Error)
    }

    pub fn has_command_in_collection(&self, kind: CollectionKind) -> bool {
        self.messages().has_command_in_collection(kind)
    }

    /// Write `"Skipped: <command>"` for every skipped command.
    pub fn show_skipped_messages(&self) -> Result<()> {
        self.show_messages(CollectionKind::Skipped)
    }

    /// Write `"Error: <command>"` for every failed required command.
    pub fn show_error_messages(&self) -> Result<()> {
        self.show_messages(CollectionKind::Error)
    }

    /// Write `"Cached: <command>"` for every cached command.
    pub fn show_cached_messages(&self) -> Result<()> {
        self.show_messages(CollectionKind::Cached)
    }

    pub fn show_messages(&self, kind: CollectionKind) -> Result<()> {
        self.messages().show_messages(kind)
    }

    fn messages(&self) -> MessageHandler<'_> {
        MessageHandler::new(self.sink.as_ref(), &self.collections)
    }
}
