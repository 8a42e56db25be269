// src/config/build.rs

use std::sync::Arc;

use tracing::debug;

use crate::config::model::ConfigTree;
use crate::errors::Result;
use crate::exec::{ProcessBackend, ShellBackend};
use crate::handler::CommandHandler;
use crate::output::OutputSink;

/// Build the handler described by `tree`.
///
/// Each file's own commands are queued first; its includes are then built
/// as separate handlers and merged in declaration order with the modes the
/// `[[include]]` entry asks for. Only the root handler uses `backend`;
/// donor handlers never execute anything.
pub fn build_handler(
    tree: &ConfigTree,
    backend: impl ProcessBackend + 'static,
    sink: Arc<dyn OutputSink>,
) -> Result<CommandHandler> {
    let handler = CommandHandler::with_backend(backend, sink.clone());
    populate(tree, 0, handler, &sink)
}

fn populate(
    tree: &ConfigTree,
    index: usize,
    mut handler: CommandHandler,
    sink: &Arc<dyn OutputSink>,
) -> Result<CommandHandler> {
    let file = &tree.files[index];
    let settings = &file.config.handler;

    handler
        .set_prefix(settings.prefix.clone())
        .set_timeout(settings.timeout);
    handler.add_commands(file.config.commands.iter().cloned())?;

    for (include, &child) in file.config.includes.iter().zip(file.includes.iter()) {
        debug!(
            from = %file.path.display(),
            include = %tree.files[child].path.display(),
            "merging included config"
        );
        let donor = populate(
            tree,
            child,
            CommandHandler::with_backend(ShellBackend::new(), sink.clone()),
            sink,
        )?;
        handler.add_handler(&donor, include.merge_prefix, include.merge_timeout);
    }

    Ok(handler)
}
