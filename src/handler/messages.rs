// src/handler/messages.rs

use crate::command::{CollectionManager, Command};
use crate::errors::Result;
use crate::output::OutputSink;
use crate::types::CollectionKind;

/// Format a `"<LABEL>: <command>"` status line.
pub fn status_line(label: &str, command: &Command) -> String {
    format!("{label}: {}", command.command())
}

/// Writes one status line per command of a collection.
pub struct MessageHandler<'a> {
    sink: &'a dyn OutputSink,
    collections: &'a CollectionManager,
}

impl<'a> MessageHandler<'a> {
    pub fn new(sink: &'a dyn OutputSink, collections: &'a CollectionManager) -> Self {
        Self { sink, collections }
    }

    /// Write `"<LABEL>: <command>"` for every entry of `kind`, if any.
    pub fn show_messages(&self, kind: CollectionKind) -> Result<()> {
        let Some(collection) = self.collections.get(kind) else {
            return Ok(());
        };

        for command in collection {
            self.sink.write_line(&status_line(kind.label(), command))?;
        }
        Ok(())
    }

    /// `true` if `kind` exists and holds at least one command. Never creates
    /// the collection.
    pub fn has_command_in_collection(&self, kind: CollectionKind) -> bool {
        self.collections.get(kind).is_some_and(|c| !c.is_empty())
    }
}
