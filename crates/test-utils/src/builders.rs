#![allow(dead_code)]

use cmdchain::config::{
    CommandConfig, ConfigFile, DurationValue, IncludeConfig, RawConfigFile, RawHandlerSection,
};
use cmdchain::MergeMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                handler: RawHandlerSection::default(),
                commands: Vec::new(),
                includes: Vec::new(),
            },
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.handler.prefix = prefix.to_string();
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.handler.timeout = Some(DurationValue::Text(timeout.to_string()));
        self
    }

    pub fn use_cache(mut self, val: bool) -> Self {
        self.config.handler.use_cache = val;
        self
    }

    pub fn with_command(mut self, command: CommandConfig) -> Self {
        self.config.commands.push(command);
        self
    }

    pub fn with_include(mut self, path: &str, merge_prefix: MergeMode, merge_timeout: MergeMode) -> Self {
        self.config.includes.push(IncludeConfig {
            path: path.into(),
            merge_prefix,
            merge_timeout,
        });
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandConfig`.
pub struct CommandConfigBuilder {
    command: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            command: CommandConfig {
                cmd: cmd.to_string(),
                skippable: false,
                timeout: None,
            },
        }
    }

    pub fn skippable(mut self, val: bool) -> Self {
        self.command.skippable = val;
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.command.timeout = Some(DurationValue::Text(timeout.to_string()));
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.command.timeout = Some(DurationValue::Seconds(secs));
        self
    }

    pub fn build(self) -> CommandConfig {
        self.command
    }
}
