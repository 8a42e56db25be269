// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Command failures are *not* errors: they are recorded in the handler's
//! `skipped` / `error` collections. Everything here is about configuration,
//! the add boundary, and output/IO problems.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Command text must not be empty")]
    EmptyCommand,

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Include cycle detected: {0}")]
    IncludeCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HandlerError>;
