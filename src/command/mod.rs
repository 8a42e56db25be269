// src/command/mod.rs

//! Command data model.
//!
//! - [`value`] holds the [`Command`] value itself.
//! - [`collection`] is a named, ordered sequence of commands.
//! - [`manager`] lazily creates one collection per [`CollectionKind`].
//!
//! [`CollectionKind`]: crate::types::CollectionKind

pub mod collection;
pub mod manager;
pub mod value;

pub use collection::CommandCollection;
pub use value::{Command, CommandId};
pub use manager::CollectionManager;
