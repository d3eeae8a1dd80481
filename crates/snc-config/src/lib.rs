//! Analysis configuration loading and validation.
//!
//! This crate provides:
//! - Typed structs for analysis settings and scenario files
//! - Presets for common search efforts
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod analysis;
pub mod preset;
pub mod resolve;
pub mod scenario;
pub mod validate;

pub use analysis::{AnalysisConfig, OptMethod};
pub use preset::{get_preset, PresetName};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use scenario::{ArrivalSpec, ScenarioSpec, ServiceSpec, TopologyKind};
pub use validate::{validate_analysis, validate_scenario, ValidationError, ValidationResult};

use std::path::{Path, PathBuf};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// A loaded, validated analysis configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
}

/// Load the analysis configuration.
///
/// Precedence: explicit CLI file, then an explicit preset, then the file found
/// through `SNC_CONFIG`/`SNC_CONFIG_DIR`/XDG, then the built-in defaults. The
/// result is validated before it is returned.
pub fn load_analysis_config(
    cli_path: Option<&Path>,
    preset: Option<PresetName>,
) -> ValidationResult<LoadedConfig> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
    }

    let loaded = match (cli_path, preset) {
        (None, Some(name)) => LoadedConfig {
            config: get_preset(name),
            source: ConfigSource::Preset,
            path: None,
        },
        _ => {
            let paths = resolve_config(cli_path);
            match paths.analysis {
                Some(path) => LoadedConfig {
                    config: AnalysisConfig::from_file(&path)?,
                    source: paths.analysis_source,
                    path: Some(path),
                },
                None => LoadedConfig {
                    config: AnalysisConfig::default(),
                    source: ConfigSource::BuiltinDefault,
                    path: None,
                },
            }
        }
    };

    validate_analysis(&loaded.config)?;
    Ok(loaded)
}
