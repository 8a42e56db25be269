// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running command lines, using
//! `tokio::process::Command`, and turning the process outcome into the
//! continue/halt verdict the handler acts on.
//!
//! - [`backend`] provides the `ProcessBackend` trait plus the live
//!   `ProcessState` observers receive.
//! - [`shell`] is the production `ShellBackend`.
//! - [`executor`] holds `CommandExecutor`, which applies the
//!   required/skippable policy to a single run.

pub mod backend;
pub mod executor;
pub mod shell;

pub use backend::{ChunkHandler, ProcessBackend, ProcessOutcome, ProcessState};
pub use executor::{CommandExecutor, ExecuteCallback};
pub use shell::ShellBackend;
