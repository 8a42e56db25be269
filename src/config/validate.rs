// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::command::Command;
use crate::config::model::{
    CommandConfig, ConfigFile, HandlerSettings, LoadedFile, RawConfigFile, RawHandlerSection,
};
use crate::errors::{HandlerError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HandlerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_work(&raw)?;
        let handler = validate_handler_section(&raw.handler)?;
        let commands = raw
            .commands
            .iter()
            .enumerate()
            .map(|(idx, c)| validate_command(idx, c))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile::new_unchecked(handler, commands, raw.includes))
    }
}

fn ensure_has_work(cfg: &RawConfigFile) -> Result<()> {
    if cfg.commands.is_empty() && cfg.includes.is_empty() {
        return Err(HandlerError::ConfigError(
            "config must contain at least one [[command]] or [[include]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_handler_section(section: &RawHandlerSection) -> Result<HandlerSettings> {
    let timeout = section
        .timeout
        .as_ref()
        .map(|t| t.to_duration())
        .transpose()?;

    Ok(HandlerSettings {
        prefix: section.prefix.clone(),
        timeout,
        use_cache: section.use_cache,
    })
}

fn validate_command(idx: usize, cfg: &CommandConfig) -> Result<Command> {
    if cfg.cmd.trim().is_empty() {
        return Err(HandlerError::ConfigError(format!(
            "command #{} has an empty `cmd`",
            idx + 1
        )));
    }

    let mut command = Command::new(cfg.cmd.clone()).with_required(!cfg.skippable);
    if let Some(timeout) = &cfg.timeout {
        command.set_timeout(Some(timeout.to_duration()?));
    }
    Ok(command)
}

/// Reject include graphs that loop back on themselves.
pub(crate) fn validate_includes(files: &[LoadedFile]) -> Result<()> {
    // Edge direction: includer -> included.
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    for (idx, file) in files.iter().enumerate() {
        graph.add_node(idx);
        for &included in file.includes.iter() {
            if included == idx {
                return Err(HandlerError::IncludeCycle(format!(
                    "'{}' includes itself",
                    file.path.display()
                )));
            }
            graph.add_edge(idx, included, ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let path = files[cycle.node_id()].path.display();
            Err(HandlerError::IncludeCycle(format!(
                "cycle detected in includes involving '{path}'"
            )))
        }
    }
}
