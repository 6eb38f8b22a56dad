use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::plugin_loader::lib_filename;

/// Plugin used when neither the CLI nor the config file names one.
pub const DEFAULT_PLUGIN: &str = "red_plugin";

/// Directory searched for plugins by default.
pub const DEFAULT_PLUGIN_PATH: &str = "target/debug";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG: &str = "info";

/// Optional TOML config file. Every key may be omitted.
///
/// ```toml
/// plugin = "red_plugin"
/// plugin_path = "target/release"
/// log = "debug"
/// ```
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Plugin name without prefix or extension.
    pub plugin: Option<String>,
    /// Directory holding plugin libraries.
    pub plugin_path: Option<String>,
    /// `tracing` filter directive.
    pub log: Option<String>,
}

impl FileConfig {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses config text.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }
}

/// Effective settings: CLI over config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Plugin name without prefix or extension.
    pub plugin: String,
    /// Directory holding plugin libraries.
    pub plugin_path: PathBuf,
    /// `tracing` filter directive.
    pub log: String,
}

impl Settings {
    /// Merges CLI values over `file`.
    pub fn resolve(
        plugin: Option<String>,
        plugin_path: Option<String>,
        log: Option<String>,
        file: FileConfig,
    ) -> Self {
        Self {
            plugin: plugin
                .or(file.plugin)
                .unwrap_or_else(|| DEFAULT_PLUGIN.to_string()),
            plugin_path: PathBuf::from(
                plugin_path
                    .or(file.plugin_path)
                    .unwrap_or_else(|| DEFAULT_PLUGIN_PATH.to_string()),
            ),
            log: log
                .or(file.log)
                .unwrap_or_else(|| DEFAULT_LOG.to_string()),
        }
    }

    /// Full path of the plugin library for this platform.
    pub fn plugin_file(&self) -> PathBuf {
        self.plugin_path.join(lib_filename(&self.plugin))
    }
}
