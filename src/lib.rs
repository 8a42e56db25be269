// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod handler;
pub mod logging;
pub mod output;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{build_handler, load_tree};
use crate::exec::ShellBackend;
use crate::output::{OutputSink, StdoutSink};

pub use crate::command::{Command, CommandCollection};
pub use crate::handler::{CommandHandler, MergeMode};
pub use crate::types::{CollectionKind, RunState};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (root file + includes)
/// - the command handler with the shell backend
/// - execution and the final skipped/error report
///
/// Returns the state the run ended in; `RunState::Halted` means a required
/// command failed.
pub async fn run(args: CliArgs) -> Result<RunState> {
    let config_path = args.config.as_path();
    let tree = load_tree(config_path)?;

    let sink: Arc<dyn OutputSink> = Arc::new(StdoutSink);
    let backend = ShellBackend::new().with_pty(args.pty);
    let mut handler = build_handler(&tree, backend, sink)?;

    if args.dry_run {
        print_dry_run(&handler);
        return Ok(RunState::Idle);
    }

    let use_cache = tree.root().config.handler.use_cache && !args.no_cache;
    info!(
        config = %config_path.display(),
        commands = handler.commands().len(),
        use_cache,
        "starting run"
    );

    handler.execute(None, use_cache).await?;

    handler.show_skipped_messages()?;
    handler.show_error_messages()?;

    info!(state = ?handler.state(), "run finished");
    Ok(handler.state())
}

/// Simple dry-run output: print the resolved commands in run order.
fn print_dry_run(handler: &CommandHandler) {
    println!("cmdchain dry-run");
    println!("  prefix = {:?}", handler.prefix());
    println!("  timeout = {:?}", handler.timeout());
    println!();

    println!("commands ({}):", handler.commands().len());
    for command in handler.commands() {
        println!("  - {}", command.command());
        if command.is_skippable() {
            println!("      skippable: true");
        }
        if let Some(timeout) = command.timeout() {
            println!("      timeout: {timeout:?}");
        }
    }

    debug!("dry-run complete (no execution)");
}
