//! Analysis configuration: which optimizers to run and how.
//!
//! Loaded from JSON or TOML (chosen by file extension). Every section has
//! defaults, so a file only needs to name what it changes.

use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use snc_common::LyapunovMode;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Optimization strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptMethod {
    GridSearch,
    PatternSearch,
    NelderMead,
    SimulatedAnnealing,
    Bfgs,
}

impl OptMethod {
    pub const ALL: &'static [OptMethod] = &[
        OptMethod::GridSearch,
        OptMethod::PatternSearch,
        OptMethod::NelderMead,
        OptMethod::SimulatedAnnealing,
        OptMethod::Bfgs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptMethod::GridSearch => "grid_search",
            OptMethod::PatternSearch => "pattern_search",
            OptMethod::NelderMead => "nelder_mead",
            OptMethod::SimulatedAnnealing => "simulated_annealing",
            OptMethod::Bfgs => "bfgs",
        }
    }

    /// Parse a method name; accepts the short aliases used on the command line.
    pub fn parse(s: &str) -> Option<OptMethod> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "grid_search" | "grid" | "gs" => Some(OptMethod::GridSearch),
            "pattern_search" | "pattern" | "ps" => Some(OptMethod::PatternSearch),
            "nelder_mead" | "nm" => Some(OptMethod::NelderMead),
            "simulated_annealing" | "annealing" | "sa" => Some(OptMethod::SimulatedAnnealing),
            "bfgs" => Some(OptMethod::Bfgs),
            _ => None,
        }
    }
}

impl fmt::Display for OptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OptMethod {
    type Err = snc_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptMethod::parse(s).ok_or_else(|| snc_common::Error::UnsupportedStrategy(s.to_string()))
    }
}

/// Inclusive grid range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSettings {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub theta: RangeSettings,
    pub l: RangeSettings,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            theta: RangeSettings {
                low: 0.1,
                high: 10.0,
                step: 0.1,
            },
            l: RangeSettings {
                low: 1.0,
                high: 4.0,
                step: 0.5,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    pub start_theta: f64,
    pub start_l: f64,
    pub delta: f64,
    pub delta_min: f64,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            start_theta: 0.5,
            start_l: 2.0,
            delta: 3.0,
            delta_min: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadSettings {
    pub start_theta: f64,
    pub start_l: f64,
    /// Relative edge length of the initial simplex.
    pub edge: f64,
    /// Stop once the standard deviation of the vertex values drops below this.
    pub sd_min: f64,
    /// Dimension-dependent coefficients instead of the standard ones.
    pub adaptive: bool,
    pub max_iterations: usize,
}

impl Default for NelderMeadSettings {
    fn default() -> Self {
        Self {
            start_theta: 0.5,
            start_l: 2.0,
            edge: 0.1,
            sd_min: 1e-8,
            adaptive: false,
            max_iterations: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingSettings {
    pub start_theta: f64,
    pub start_l: f64,
    pub temperature: f64,
    pub cooling_factor: f64,
    pub search_radius: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for AnnealingSettings {
    fn default() -> Self {
        Self {
            start_theta: 0.5,
            start_l: 2.0,
            temperature: 10.0,
            cooling_factor: 0.95,
            search_radius: 3.0,
            iterations: 1000,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfgsSettings {
    pub start_theta: f64,
    pub start_l: f64,
    /// Finite-difference step for the gradient.
    pub gradient_step: f64,
    /// Stop once the gradient max-norm drops below this.
    pub gtol: f64,
    pub max_iterations: usize,
}

impl Default for BfgsSettings {
    fn default() -> Self {
        Self {
            start_theta: 0.5,
            start_l: 2.0,
            gradient_step: 1e-6,
            gtol: 1e-5,
            max_iterations: 400,
        }
    }
}

/// Limits shared by every strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    pub max_evaluations: Option<u64>,
    pub time_limit_ms: Option<u64>,
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_version: String,

    pub description: Option<String>,

    pub lyapunov_mode: LyapunovMode,

    /// Number of Lyapunov parameters optimized next to theta (0 or 1).
    pub number_l: usize,

    pub methods: Vec<OptMethod>,

    pub grid: GridSettings,
    pub pattern: PatternSettings,
    pub nelder_mead: NelderMeadSettings,
    pub annealing: AnnealingSettings,
    pub bfgs: BfgsSettings,
    pub budget: BudgetSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            lyapunov_mode: LyapunovMode::default(),
            number_l: 0,
            methods: vec![
                OptMethod::GridSearch,
                OptMethod::PatternSearch,
                OptMethod::SimulatedAnnealing,
                OptMethod::Bfgs,
            ],
            grid: GridSettings::default(),
            pattern: PatternSettings::default(),
            nelder_mead: NelderMeadSettings::default(),
            annealing: AnnealingSettings::default(),
            bfgs: BfgsSettings::default(),
            budget: BudgetSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if is_toml(path) {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }
}

pub(crate) fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_aliases() {
        assert_eq!(OptMethod::parse("grid"), Some(OptMethod::GridSearch));
        assert_eq!(OptMethod::parse("Nelder-Mead"), Some(OptMethod::NelderMead));
        assert_eq!(OptMethod::parse("SA"), Some(OptMethod::SimulatedAnnealing));
        assert_eq!(OptMethod::parse("newton"), None);
    }

    #[test]
    fn unknown_method_is_unsupported_strategy() {
        let err = "newton".parse::<OptMethod>().unwrap_err();
        assert_eq!(err.code(), 31);
    }

    #[test]
    fn method_names_roundtrip() {
        for m in OptMethod::ALL {
            assert_eq!(OptMethod::parse(m.as_str()), Some(*m));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = AnalysisConfig::from_json_str(
            r#"{"schema_version":"1.0.0","methods":["bfgs"],"lyapunov_mode":"strict"}"#,
        )
        .unwrap();
        assert_eq!(cfg.methods, vec![OptMethod::Bfgs]);
        assert_eq!(cfg.lyapunov_mode, LyapunovMode::Strict);
        assert_eq!(cfg.pattern, PatternSettings::default());
    }

    #[test]
    fn toml_sections_parse() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
schema_version = "1.0.0"
methods = ["grid_search", "pattern_search"]
number_l = 1

[grid.theta]
low = 0.05
high = 10.0
step = 0.05

[budget]
max_evaluations = 5000
"#,
        )
        .unwrap();
        assert_eq!(cfg.number_l, 1);
        assert_eq!(cfg.grid.theta.step, 0.05);
        assert_eq!(cfg.grid.l, GridSettings::default().l);
        assert_eq!(cfg.budget.max_evaluations, Some(5000));
    }

    #[test]
    fn malformed_input_is_parse_error() {
        assert!(matches!(
            AnalysisConfig::from_json_str("{"),
            Err(ValidationError::ParseError(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("methods = ["),
            Err(ValidationError::ParseError(_))
        ));
    }
}
