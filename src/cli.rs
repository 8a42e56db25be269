// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `cmdchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdchain",
    version,
    about = "Run a list of shell commands in order, halting on required failures.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Cmdchain.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved command list, but don't execute
    /// any commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore `[handler].use_cache` and run every command.
    #[arg(long)]
    pub no_cache: bool,

    /// Attach command output to a pseudo-terminal instead of pipes (unix),
    /// for programs that only stream when writing to a terminal.
    #[arg(long)]
    pub pty: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
