// src/handler/mod.rs

//! Orchestration layer for cmdchain.
//!
//! This module ties together:
//! - the command collections (`all`, `skipped`, `error`, `cached`)
//! - the success cache in front of execution
//! - merging another handler's commands under prefix/timeout policies
//! - the sequential run loop that feeds commands to the executor
//!
//! The façade lives in [`command_handler`]; the pure merge rules are in
//! [`merge`].

pub mod cache;
pub mod command_handler;
pub mod merge;
pub mod messages;

pub use cache::CommandCache;
pub use command_handler::CommandHandler;
pub use merge::merge;
pub use messages::MessageHandler;
pub use crate::types::{CollectionKind, MergeMode, RunState};
