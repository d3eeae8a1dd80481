//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Built-in preset.
    Preset,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::Preset => write!(f, "preset"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Resolved analysis config path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the analysis file (or None if not found).
    pub analysis: Option<PathBuf>,

    /// Source of the analysis config (for diagnostics).
    pub analysis_source: ConfigSource,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "SNC_CONFIG";
pub const ENV_CONFIG_DIR: &str = "SNC_CONFIG_DIR";

/// Standard config file names, tried in order.
const ANALYSIS_FILENAMES: &[&str] = &["analysis.toml", "analysis.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "snc";

/// Resolve the analysis configuration path.
///
/// 1. Explicit CLI path (if it exists)
/// 2. `SNC_CONFIG` (direct path)
/// 3. `SNC_CONFIG_DIR` + `analysis.toml` / `analysis.json`
/// 4. XDG config directory (`~/.config/snc/`)
/// 5. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();
    paths.analysis = resolve_single_config(cli_path, &mut paths.analysis_source);
    paths
}

fn resolve_single_config(cli_path: Option<&Path>, source: &mut ConfigSource) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        if path.exists() {
            *source = ConfigSource::CliArgument;
            return Some(path.to_path_buf());
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = first_existing(&PathBuf::from(config_dir)) {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = first_existing(&dir) {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    *source = ConfigSource::BuiltinDefault;
    None
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    ANALYSIS_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Get the XDG config directory for snc.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
