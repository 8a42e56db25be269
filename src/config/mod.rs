// src/config/mod.rs

//! Configuration loading and validation for cmdchain.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Parse timeouts (`duration.rs`).
//! - Load a config file and its includes from disk (`loader.rs`).
//! - Validate basic invariants like include acyclicity (`validate.rs`).
//! - Turn a loaded tree into a ready-to-run handler (`build.rs`).

pub mod build;
pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::build_handler;
pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_tree};
pub use model::{
    CommandConfig, ConfigFile, ConfigTree, DurationValue, HandlerSettings, IncludeConfig,
    LoadedFile, RawConfigFile, RawHandlerSection,
};
