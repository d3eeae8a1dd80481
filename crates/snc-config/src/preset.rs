//! Analysis presets trading search effort for bound tightness.
//!
//! - Quick: coarse grid and a single local search, tight budget
//! - Standard: the default method mix
//! - Thorough: all five strategies, fine grid, Lyapunov parameter searched

use crate::analysis::{AnalysisConfig, BudgetSettings, OptMethod, RangeSettings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available analysis presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Coarse grid plus pattern search, capped evaluations
    Quick,
    /// Grid, pattern search, annealing and BFGS over theta
    Standard,
    /// Every strategy, fine grid, theta and one Lyapunov parameter
    Thorough,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::Quick, PresetName::Standard, PresetName::Thorough];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Quick => "quick",
            PresetName::Standard => "standard",
            PresetName::Thorough => "thorough",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "quick" | "fast" => Some(PresetName::Quick),
            "standard" | "default" => Some(PresetName::Standard),
            "thorough" | "full" => Some(PresetName::Thorough),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Quick => "Coarse grid and pattern search with a 2000 evaluation cap",
            PresetName::Standard => "Grid, pattern search, annealing and BFGS over theta",
            PresetName::Thorough => {
                "All strategies on a fine grid, optimizing theta and one Lyapunov parameter"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the analysis configuration for a preset.
pub fn get_preset(name: PresetName) -> AnalysisConfig {
    match name {
        PresetName::Quick => quick_preset(),
        PresetName::Standard => standard_preset(),
        PresetName::Thorough => thorough_preset(),
    }
}

fn quick_preset() -> AnalysisConfig {
    let mut cfg = AnalysisConfig {
        description: Some(PresetName::Quick.description().to_string()),
        methods: vec![OptMethod::GridSearch, OptMethod::PatternSearch],
        budget: BudgetSettings {
            max_evaluations: Some(2000),
            time_limit_ms: None,
        },
        ..AnalysisConfig::default()
    };
    cfg.grid.theta = RangeSettings {
        low: 0.1,
        high: 10.0,
        step: 0.25,
    };
    cfg.pattern.delta_min = 0.05;
    cfg
}

fn standard_preset() -> AnalysisConfig {
    AnalysisConfig {
        description: Some(PresetName::Standard.description().to_string()),
        ..AnalysisConfig::default()
    }
}

fn thorough_preset() -> AnalysisConfig {
    let mut cfg = AnalysisConfig {
        description: Some(PresetName::Thorough.description().to_string()),
        number_l: 1,
        methods: OptMethod::ALL.to_vec(),
        budget: BudgetSettings {
            max_evaluations: Some(200_000),
            time_limit_ms: Some(60_000),
        },
        ..AnalysisConfig::default()
    };
    cfg.grid.theta = RangeSettings {
        low: 0.05,
        high: 20.0,
        step: 0.05,
    };
    cfg.annealing.iterations = 5000;
    cfg.nelder_mead.sd_min = 1e-10;
    cfg
}

/// Summary information about a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: String,
    pub methods: Vec<OptMethod>,
    pub number_l: usize,
}

impl PresetInfo {
    pub fn from_preset(name: PresetName) -> Self {
        let cfg = get_preset(name);
        Self {
            name,
            description: name.description().to_string(),
            methods: cfg.methods,
            number_l: cfg.number_l,
        }
    }
}

/// List all presets with their summaries.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_analysis;

    #[test]
    fn test_preset_name_parsing() {
        assert_eq!(PresetName::parse("quick"), Some(PresetName::Quick));
        assert_eq!(PresetName::parse("FAST"), Some(PresetName::Quick));
        assert_eq!(PresetName::parse("default"), Some(PresetName::Standard));
        assert_eq!(PresetName::parse("full"), Some(PresetName::Thorough));
        assert_eq!(PresetName::parse("exhaustive"), None);
    }

    #[test]
    fn from_str_unknown_error_lists_presets() {
        let err = "exhaustive".parse::<PresetName>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("quick"));
        assert!(msg.contains("thorough"));
    }

    #[test]
    fn every_preset_validates() {
        for name in PresetName::ALL {
            validate_analysis(&get_preset(*name))
                .unwrap_or_else(|e| panic!("preset {name} invalid: {e}"));
        }
    }

    #[test]
    fn presets_are_deterministic() {
        for name in PresetName::ALL {
            assert_eq!(get_preset(*name), get_preset(*name));
        }
    }

    #[test]
    fn thorough_searches_lyapunov() {
        let cfg = get_preset(PresetName::Thorough);
        assert_eq!(cfg.number_l, 1);
        assert_eq!(cfg.methods.len(), OptMethod::ALL.len());
    }

    #[test]
    fn list_presets_covers_all() {
        let infos = list_presets();
        assert_eq!(infos.len(), 3);
        assert!(infos.iter().all(|i| !i.methods.is_empty()));
    }

    #[test]
    fn preset_name_serde_lowercase() {
        let json = serde_json::to_string(&PresetName::Thorough).unwrap();
        assert_eq!(json, "\"thorough\"");
    }
}
