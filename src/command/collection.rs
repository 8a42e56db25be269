// src/command/collection.rs

use std::slice;

use crate::command::{Command, CommandId};
use crate::types::CollectionKind;

/// Named, ordered sequence of commands.
///
/// Insertion order is preserved and nothing is deduplicated. A collection is
/// never dropped by its owner, only emptied with [`CommandCollection::reset`].
#[derive(Debug, Clone)]
pub struct CommandCollection {
    kind: CollectionKind,
    commands: Vec<Command>,
}

impl CommandCollection {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            commands: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn add(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn count(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn contains_id(&self, id: CommandId) -> bool {
        self.commands.iter().any(|c| c.id() == Some(id))
    }
}

impl<'a> IntoIterator for &'a CommandCollection {
    type Item = &'a Command;
    type IntoIter = slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
