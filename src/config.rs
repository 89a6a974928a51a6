//! Configuration: CLI args > Env vars > Config file > Defaults
//!
//! The config file is `libdoc-cache.toml`, found by walking up from the
//! current directory, with `~/.config/libdoc-cache/config.toml` as the global
//! fallback.
//!
//! ```toml
//! [runtime]
//! python = "/usr/bin/python3"
//! search_paths = ["resources/libraries"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "libdoc-cache.toml";

/// Complete configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibdocCacheConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Host interpreter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Python executable (name looked up in PATH, or a path)
    #[serde(default = "default_python")]
    pub python: String,

    /// Module search paths appended before the ones given on the command line
    #[serde(default)]
    pub search_paths: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            search_paths: Vec::new(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

impl LibdocCacheConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Discovers configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    // Fallback to global config
    let global_config = dirs::home_dir()?.join(".config/libdoc-cache/config.toml");
    global_config.is_file().then_some(global_config)
}

/// Loads configuration with auto-discovery support
///
/// Returns Ok(None) if no config is found (neither explicit nor discovered).
pub fn load_config_with_discovery(explicit_path: Option<&str>) -> Result<Option<LibdocCacheConfig>> {
    if let Some(config_path) = explicit_path {
        return Ok(Some(LibdocCacheConfig::from_file(config_path)?));
    }

    let current_dir = std::env::current_dir()
        .context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir) {
        Some(path) => {
            tracing::debug!(config = %path.display(), "using discovered config");
            Ok(Some(LibdocCacheConfig::from_file(&path)?))
        }
        None => Ok(None),
    }
}

/// Settings of one run after merging all sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub python: String,
    pub search_paths: Vec<PathBuf>,
}

impl RunSettings {
    /// Merge CLI values (env already applied by clap) over the config file
    ///
    /// Search paths accumulate: config file entries first, then CLI entries.
    pub fn merge(
        cli_python: Option<String>,
        cli_search_paths: Vec<String>,
        file_config: Option<LibdocCacheConfig>,
    ) -> Self {
        let file = file_config.unwrap_or_default();

        let search_paths = file
            .runtime
            .search_paths
            .into_iter()
            .chain(cli_search_paths)
            .map(PathBuf::from)
            .collect();

        Self {
            python: cli_python.unwrap_or(file.runtime.python),
            search_paths,
        }
    }
}
