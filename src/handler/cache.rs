// src/handler/cache.rs

//! Success cache sitting in front of execution.
//!
//! Cached commands completed successfully in an earlier `execute` call and
//! are left out of the executable set until the cache is reset. The cache is
//! in-memory only and lives as long as its handler.

use tracing::debug;

use crate::command::{CollectionManager, Command, CommandCollection};
use crate::types::CollectionKind;

/// View over a handler's collections that knows about `all` and `cached`.
#[derive(Debug)]
pub struct CommandCache<'a> {
    collections: &'a mut CollectionManager,
}

impl<'a> CommandCache<'a> {
    pub fn new(collections: &'a mut CollectionManager) -> Self {
        Self { collections }
    }

    pub fn commands(&mut self) -> &CommandCollection {
        self.collections.collection(CollectionKind::All)
    }

    pub fn cached(&mut self) -> &CommandCollection {
        self.collections.collection(CollectionKind::Cached)
    }

    /// Commands that still need to run: all minus cached, in queue order.
    pub fn executable(&mut self) -> Vec<Command> {
        let cached: Vec<_> = self.cached().iter().filter_map(Command::id).collect();

        self.commands()
            .iter()
            .filter(|c| c.id().is_none_or(|id| !cached.contains(&id)))
            .cloned()
            .collect()
    }

    pub fn cache(&mut self, command: Command) {
        debug!(cmd = %command, "caching successful command");
        self.collections
            .collection_mut(CollectionKind::Cached)
            .add(command);
    }

    /// Forget every cached success; the next run executes everything.
    pub fn reset(&mut self) {
        debug!("resetting command cache");
        self.collections
            .collection_mut(CollectionKind::Cached)
            .reset();
    }
}
