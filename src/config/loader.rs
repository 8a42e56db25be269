// src/config/loader.rs

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, ConfigTree, LoadedFile, RawConfigFile};
use crate::config::validate::validate_includes;
use crate::errors::{HandlerError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a single configuration file and validate it.
///
/// Includes are left as unresolved paths; use [`load_tree`] to follow them.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load a root config file plus everything it transitively includes.
///
/// Include paths are resolved relative to the including file. Each file is
/// loaded once even if it is included from several places; include cycles
/// are rejected.
pub fn load_tree(path: impl AsRef<Path>) -> Result<ConfigTree> {
    let root = canonical(path.as_ref(), None)?;

    let mut files: Vec<LoadedFile> = Vec::new();
    let mut index_of: HashMap<PathBuf, usize> = HashMap::new();
    let mut pending = VecDeque::new();

    index_of.insert(root.clone(), 0);
    files.push(load_file(root)?);
    pending.push_back(0);

    while let Some(idx) = pending.pop_front() {
        let base_dir = files[idx]
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let include_paths: Vec<PathBuf> = files[idx]
            .config
            .includes
            .iter()
            .map(|inc| base_dir.join(&inc.path))
            .collect();

        for include_path in include_paths {
            let resolved = canonical(&include_path, Some(&files[idx].path))?;

            let included = match index_of.get(&resolved) {
                Some(&existing) => existing,
                None => {
                    let new_idx = files.len();
                    debug!(path = %resolved.display(), "loading included config");
                    index_of.insert(resolved.clone(), new_idx);
                    files.push(load_file(resolved)?);
                    pending.push_back(new_idx);
                    new_idx
                }
            };
            files[idx].includes.push(included);
        }
    }

    validate_includes(&files)?;
    Ok(ConfigTree { files })
}

fn load_file(path: PathBuf) -> Result<LoadedFile> {
    let config = load_and_validate(&path).map_err(|e| match e {
        HandlerError::ConfigError(msg) => {
            HandlerError::ConfigError(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;

    Ok(LoadedFile {
        path,
        config,
        includes: Vec::new(),
    })
}

fn canonical(path: &Path, included_from: Option<&Path>) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| match included_from {
        Some(parent) => HandlerError::ConfigError(format!(
            "cannot resolve include '{}' from '{}': {e}",
            path.display(),
            parent.display()
        )),
        None => HandlerError::IoError(e),
    })
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Cmdchain.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Cmdchain.toml")
}
