// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::command::Command;
use crate::types::MergeMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [handler]
/// prefix = "php "
/// timeout = "30s"
///
/// [[command]]
/// cmd = "./migrate.php"
///
/// [[command]]
/// cmd = "./warm-cache.php"
/// skippable = true
/// timeout = 0.5
///
/// [[include]]
/// path = "assets.toml"
/// merge_prefix = "not_defined"
/// merge_timeout = "all"
/// ```
///
/// All sections are optional and have reasonable defaults, but a file must
/// contain at least one command or include to pass validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Handler-wide settings from `[handler]`.
    #[serde(default)]
    pub handler: RawHandlerSection,

    /// Commands from `[[command]]`, in file order.
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandConfig>,

    /// Other config files merged into this one, from `[[include]]`.
    #[serde(default, rename = "include")]
    pub includes: Vec<IncludeConfig>,
}

/// `[handler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHandlerSection {
    /// Prepended to every command of this file.
    #[serde(default)]
    pub prefix: String,

    /// Default timeout for commands that don't set their own.
    #[serde(default)]
    pub timeout: Option<DurationValue>,

    /// Whether repeated runs skip commands that already succeeded.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

impl Default for RawHandlerSection {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            timeout: None,
            use_cache: default_use_cache(),
        }
    }
}

/// `[[command]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// The command line, without the handler prefix.
    pub cmd: String,

    /// If true, a failure is recorded but does not halt the run.
    #[serde(default)]
    pub skippable: bool,

    /// Overrides `[handler].timeout` for this command.
    #[serde(default)]
    pub timeout: Option<DurationValue>,
}

/// `[[include]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludeConfig {
    /// Path of the included file, relative to the including file.
    pub path: PathBuf,

    /// How this file's prefix applies to the included commands.
    #[serde(default)]
    pub merge_prefix: MergeMode,

    /// How this file's default timeout applies to the included commands.
    #[serde(default)]
    pub merge_timeout: MergeMode,
}

/// A timeout as written in TOML: either a number of seconds (`0.5`) or a
/// string with a unit (`"250ms"`, `"3s"`, `"1m"`, `"2h"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

/// Validated `[handler]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSettings {
    pub prefix: String,
    pub timeout: Option<Duration>,
    pub use_cache: bool,
}

/// Validated configuration of a single file.
///
/// Build one through `ConfigFile::try_from(raw)` or the loader; includes are
/// still unresolved paths here.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub handler: HandlerSettings,
    pub commands: Vec<Command>,
    pub includes: Vec<IncludeConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        handler: HandlerSettings,
        commands: Vec<Command>,
        includes: Vec<IncludeConfig>,
    ) -> Self {
        Self {
            handler,
            commands,
            includes,
        }
    }
}

/// A root config file plus every file it (transitively) includes.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    pub(crate) files: Vec<LoadedFile>,
}

/// One file of a [`ConfigTree`]; `includes` are indices into the tree, in the
/// same order as `config.includes`.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub config: ConfigFile,
    pub includes: Vec<usize>,
}

impl ConfigTree {
    pub fn root(&self) -> &LoadedFile {
        &self.files[0]
    }

    pub fn files(&self) -> &[LoadedFile] {
        &self.files
    }
}
