// src/command/value.rs

use std::fmt;
use std::time::Duration;

/// Identity a command receives when it is queued into a handler.
///
/// Two commands with the same text queued twice are still two different
/// entries; cache membership is decided on this id, not on the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(pub(crate) u64);

impl CommandId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A single shell command plus its failure policy and optional timeout.
///
/// `required = false` makes the command skippable: its failure is recorded
/// but does not halt the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    required: bool,
    timeout: Option<Duration>,
    id: Option<CommandId>,
}

impl Command {
    /// A required command without its own timeout.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            required: true,
            timeout: None,
            id: None,
        }
    }

    /// A skippable command without its own timeout.
    pub fn skippable(text: impl Into<String>) -> Self {
        Self::new(text).with_required(false)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn command(&self) -> &str {
        &self.text
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_skippable(&self) -> bool {
        !self.required
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Queue identity, `None` until the command enters a handler.
    pub fn id(&self) -> Option<CommandId> {
        self.id
    }

    pub fn set_command(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) fn set_id(&mut self, id: CommandId) {
        self.id = Some(id);
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Command::new(text)
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Command::new(text)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
