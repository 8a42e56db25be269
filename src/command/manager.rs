// src/command/manager.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::command::CommandCollection;
use crate::types::CollectionKind;

/// Get-or-create registry of a handler's collections.
///
/// A kind maps to at most one collection for the manager's lifetime; callers
/// never need a separate "ensure exists" step.
#[derive(Debug, Default)]
pub struct CollectionManager {
    collections: BTreeMap<CollectionKind, CommandCollection>,
}

impl CollectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the collection for `kind`, creating an empty one on first use.
    pub fn collection(&mut self, kind: CollectionKind) -> &CommandCollection {
        self.collection_mut(kind)
    }

    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut CommandCollection {
        self.collections.entry(kind).or_insert_with(|| {
            debug!(collection = %kind, "creating collection");
            CommandCollection::new(kind)
        })
    }

    /// Read-only lookup that does not allocate.
    pub fn get(&self, kind: CollectionKind) -> Option<&CommandCollection> {
        self.collections.get(&kind)
    }

    /// `true` only if `kind` was accessed before.
    pub fn has_collection(&self, kind: CollectionKind) -> bool {
        self.collections.contains_key(&kind)
    }
}
