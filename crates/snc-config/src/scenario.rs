//! Scenario files: a topology with its arrivals, servers and target metric.

use crate::analysis::is_toml;
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use snc_common::PerformParameter;
use std::fmt;
use std::path::Path;

fn one() -> u32 {
    1
}

/// Arrival process description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrivalSpec {
    /// `n` flows with exponentially distributed per-slot increments.
    Exponential {
        lambda: f64,
        #[serde(default = "one")]
        n: u32,
    },
    /// `n` flows sending `rate` every slot.
    Deterministic {
        rate: f64,
        #[serde(default = "one")]
        n: u32,
    },
    /// `n` token-bucket regulated flows.
    TokenBucket {
        sigma_single: f64,
        rho_single: f64,
        #[serde(default = "one")]
        n: u32,
    },
}

/// Service process description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceSpec {
    ConstantRate { rate: f64 },
}

/// Network shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    SingleServer,
    FatCross,
    Tandem,
    SinkTree,
}

impl TopologyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::SingleServer => "single_server",
            TopologyKind::FatCross => "fat_cross",
            TopologyKind::Tandem => "tandem",
            TopologyKind::SinkTree => "sink_tree",
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete scenario: the flow of interest is `arrivals[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub topology: TopologyKind,
    pub arrivals: Vec<ArrivalSpec>,
    pub servers: Vec<ServiceSpec>,
    pub perform: PerformParameter,
}

impl ScenarioSpec {
    /// Load from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if is_toml(path) {
            toml::from_str(&content)
                .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Display name, falling back to the topology.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.topology.as_str().to_string())
    }
}
