//! Configuration loading + resolution tests against real files.
//!
//! Covers:
//! - Resolution order (CLI > preset > env > config dir > XDG > defaults)
//! - JSON and TOML analysis files
//! - Invalid files surfacing as validation errors

use snc_config::analysis::OptMethod;
use snc_config::resolve::{resolve_config, ConfigSource};
use snc_config::{load_analysis_config, PresetName, ValidationError};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const ENV_KEYS: &[&str] = &["SNC_CONFIG", "SNC_CONFIG_DIR", "XDG_CONFIG_HOME"];

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}

/// Point every lookup at an empty scratch area.
fn isolate(temp: &TempDir) {
    env::remove_var("SNC_CONFIG");
    env::remove_var("SNC_CONFIG_DIR");
    env::set_var("XDG_CONFIG_HOME", temp.path().join("xdg"));
}

fn write_toml(path: &Path, methods: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(
        path,
        format!("schema_version = \"1.0.0\"\nmethods = [{methods}]\n"),
    )
    .expect("write toml");
}

#[test]
fn test_defaults_without_any_file() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let loaded = load_analysis_config(None, None).expect("defaults load");
        assert_eq!(loaded.source, ConfigSource::BuiltinDefault);
        assert!(loaded.path.is_none());
    });
}

#[test]
fn test_cli_over_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let cli = temp.path().join("cli").join("analysis.toml");
        let env_file = temp.path().join("env").join("analysis.toml");
        write_toml(&cli, "\"bfgs\"");
        write_toml(&env_file, "\"grid_search\"");
        env::set_var("SNC_CONFIG", &env_file);

        let loaded = load_analysis_config(Some(&cli), None).expect("cli load");
        assert_eq!(loaded.source, ConfigSource::CliArgument);
        assert_eq!(loaded.config.methods, vec![OptMethod::Bfgs]);
    });
}

#[test]
fn test_preset_over_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let env_file = temp.path().join("env").join("analysis.toml");
        write_toml(&env_file, "\"bfgs\"");
        env::set_var("SNC_CONFIG", &env_file);

        let loaded = load_analysis_config(None, Some(PresetName::Quick)).expect("preset load");
        assert_eq!(loaded.source, ConfigSource::Preset);
        assert_eq!(
            loaded.config.methods,
            vec![OptMethod::GridSearch, OptMethod::PatternSearch]
        );
    });
}

#[test]
fn test_env_over_config_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let env_file = temp.path().join("env").join("custom.toml");
        let dir = temp.path().join("dir");
        write_toml(&env_file, "\"nelder_mead\"");
        write_toml(&dir.join("analysis.toml"), "\"grid_search\"");
        env::set_var("SNC_CONFIG", &env_file);
        env::set_var("SNC_CONFIG_DIR", &dir);

        let paths = resolve_config(None);
        assert_eq!(paths.analysis_source, ConfigSource::Environment);
        assert_eq!(paths.analysis.as_deref(), Some(env_file.as_path()));
    });
}

#[test]
fn test_config_dir_json_fallback() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let dir = temp.path().join("dir");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(
            dir.join("analysis.json"),
            r#"{"schema_version":"1.0.0","methods":["simulated_annealing"],"lyapunov_mode":"strict"}"#,
        )
        .expect("write json");
        env::set_var("SNC_CONFIG_DIR", &dir);

        let loaded = load_analysis_config(None, None).expect("json load");
        assert_eq!(loaded.source, ConfigSource::Environment);
        assert_eq!(loaded.config.methods, vec![OptMethod::SimulatedAnnealing]);
        assert_eq!(loaded.config.lyapunov_mode, snc_common::LyapunovMode::Strict);
    });
}

#[test]
fn test_missing_cli_file_is_io_error() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let err = load_analysis_config(Some(&temp.path().join("nope.toml")), None)
            .expect_err("missing file must fail");
        assert!(matches!(err, ValidationError::IoError(_)));
    });
}

#[test]
fn test_semantically_invalid_file_rejected() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let path = temp.path().join("bad.toml");
        fs::write(
            &path,
            "schema_version = \"1.0.0\"\nmethods = [\"simulated_annealing\"]\n[annealing]\ncooling_factor = 1.5\n",
        )
        .expect("write");

        let err = load_analysis_config(Some(&path), None).expect_err("invalid must fail");
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    });
}

#[test]
fn test_empty_methods_rejected() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(ENV_KEYS);
        let temp = TempDir::new().expect("temp dir");
        isolate(&temp);

        let path = temp.path().join("empty.toml");
        write_toml(&path, "");
        let err = load_analysis_config(Some(&path), None).expect_err("empty must fail");
        assert!(matches!(err, ValidationError::SemanticError(_)));
    });
}
