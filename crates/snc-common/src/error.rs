//! Error types for SNC bound computation.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Infeasibility classification for the optimizer loop
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Stability Violation
//!   Reason: stability violated at theta=0.5: arrival rho 5.2 >= service rate 5
//!   Fix: Lower the arrival intensity, add service capacity, or search other theta values.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 11,
//!   "category": "model",
//!   "message": "stability violated at theta=0.5: ...",
//!   "infeasible_point": true,
//!   "suggested_action": "adjust_parameters"
//! }
//! ```

use serde::{Deserialize, Serialize};
use snc_math::NumericError;
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for SNC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid model: parameter outside its domain, unstable system.
    Model,
    /// Overflow, division by zero or domain failures in the bound algebra.
    Numeric,
    /// Configuration and setup errors (strategy, topology shape, search ranges).
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Numeric => write!(f, "numeric"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for agents to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Change model parameters (rates, flow counts, targets).
    AdjustParameters,
    /// Move the search region (theta range, start point).
    WidenSearch,
    /// Fix the configuration or scenario file.
    FixConfig,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::AdjustParameters => write!(f, "adjust_parameters"),
            SuggestedAction::WidenSearch => write!(f, "widen_search"),
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for SNC bound computation.
#[derive(Error, Debug)]
pub enum Error {
    // Model errors (10-19)
    #[error("parameter {parameter} = {value} out of bounds: {reason}")]
    ParameterOutOfBounds {
        parameter: String,
        value: f64,
        reason: String,
    },

    #[error(
        "stability violated at theta={theta}: arrival rho {arrival_rho} >= service rate {service_rate}"
    )]
    StabilityViolation {
        theta: f64,
        arrival_rho: f64,
        service_rate: f64,
    },

    // Numeric errors (20-29)
    #[error("numeric failure: {0}")]
    Numeric(#[from] NumericError),

    // Configuration errors (30-39)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported optimization strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("{topology} expects {expected}, got {arrivals} arrivals and {servers} servers")]
    ListLengthMismatch {
        topology: &'static str,
        expected: &'static str,
        arrivals: usize,
        servers: usize,
    },

    #[error("unsupported number of optimization parameters: {count} (expected 1 or 2)")]
    UnsupportedParameterCount { count: usize },

    #[error("invalid search configuration: {0}")]
    InvalidSearchConfig(String),

    // I/O errors (40-49)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for [`Error::ParameterOutOfBounds`].
    pub fn out_of_bounds(
        parameter: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        Error::ParameterOutOfBounds {
            parameter: parameter.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Model errors
    /// - 20-29: Numeric errors
    /// - 30-39: Configuration errors
    /// - 40-49: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::ParameterOutOfBounds { .. } => 10,
            Error::StabilityViolation { .. } => 11,
            Error::Numeric(NumericError::Overflow { .. }) => 20,
            Error::Numeric(NumericError::DivisionByZero { .. }) => 21,
            Error::Numeric(NumericError::Domain { .. }) => 22,
            Error::Config(_) => 30,
            Error::UnsupportedStrategy(_) => 31,
            Error::ListLengthMismatch { .. } => 32,
            Error::UnsupportedParameterCount { .. } => 33,
            Error::InvalidSearchConfig(_) => 34,
            Error::Io(_) => 40,
            Error::Json(_) => 41,
            Error::Toml(_) => 42,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ParameterOutOfBounds { .. } | Error::StabilityViolation { .. } => {
                ErrorCategory::Model
            }

            Error::Numeric(_) => ErrorCategory::Numeric,

            Error::Config(_)
            | Error::UnsupportedStrategy(_)
            | Error::ListLengthMismatch { .. }
            | Error::UnsupportedParameterCount { .. }
            | Error::InvalidSearchConfig(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) | Error::Toml(_) => ErrorCategory::Io,
        }
    }

    /// Whether the error only disqualifies the evaluated parameter point.
    ///
    /// Model and numeric errors raised while evaluating a bound mean "no
    /// guarantee at this θ"; the optimizer scores such points as `+∞`.
    /// Everything else is a setup failure and must propagate.
    pub fn is_infeasible_point(&self) -> bool {
        matches!(self.category(), ErrorCategory::Model | ErrorCategory::Numeric)
    }

    /// Returns the suggested action for agents.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::ParameterOutOfBounds { .. } => SuggestedAction::AdjustParameters,
            Error::StabilityViolation { .. } => SuggestedAction::AdjustParameters,
            Error::Numeric(_) => SuggestedAction::WidenSearch,

            Error::Config(_)
            | Error::UnsupportedStrategy(_)
            | Error::ListLengthMismatch { .. }
            | Error::UnsupportedParameterCount { .. }
            | Error::InvalidSearchConfig(_) => SuggestedAction::FixConfig,

            Error::Io(_) => SuggestedAction::ManualIntervention,
            Error::Json(_) | Error::Toml(_) => SuggestedAction::FixConfig,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::ParameterOutOfBounds { .. } => {
                "Check distribution parameters: rates must be positive and finite, theta > 0, flow counts >= 1."
            }
            Error::StabilityViolation { .. } => {
                "Lower the arrival intensity, add service capacity, or search other theta values."
            }
            Error::Numeric(NumericError::Overflow { .. }) => {
                "The bound overflowed; try a smaller theta range or a shorter time horizon."
            }
            Error::Numeric(NumericError::DivisionByZero { .. }) => {
                "The system sits on the stability boundary; move theta away from it."
            }
            Error::Numeric(NumericError::Domain { .. }) => {
                "An intermediate value left its domain; check for NaN inputs and rate signs."
            }
            Error::Config(_) => {
                "Run 'snc-core config validate' to check the configuration file."
            }
            Error::UnsupportedStrategy(_) => {
                "Use one of: grid_search, pattern_search, nelder_mead, simulated_annealing, bfgs."
            }
            Error::ListLengthMismatch { .. } => {
                "Fat-cross needs equal list lengths; tandem and sink-tree need one more arrival than servers."
            }
            Error::UnsupportedParameterCount { .. } => {
                "Optimize over theta alone or theta plus one Lyapunov parameter."
            }
            Error::InvalidSearchConfig(_) => {
                "Check grid ranges (low < high, step > 0), start points and budgets in the analysis config."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
            Error::Toml(_) => "Invalid TOML. Check the file against the documented schema.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::ParameterOutOfBounds { .. } => "Parameter Out Of Bounds",
            Error::StabilityViolation { .. } => "Stability Violation",
            Error::Numeric(_) => "Numeric Failure",
            Error::Config(_) => "Configuration Error",
            Error::UnsupportedStrategy(_) => "Unsupported Strategy",
            Error::ListLengthMismatch { .. } => "Topology Shape Mismatch",
            Error::UnsupportedParameterCount { .. } => "Unsupported Parameter Count",
            Error::InvalidSearchConfig(_) => "Invalid Search Configuration",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
            Error::Toml(_) => "TOML Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error only disqualifies a parameter point.
    pub infeasible_point: bool,

    /// Suggested action for agents.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., theta, list lengths).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ParameterOutOfBounds {
                parameter, value, ..
            } => {
                context.insert("parameter".to_string(), serde_json::json!(parameter));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::StabilityViolation {
                theta,
                arrival_rho,
                service_rate,
            } => {
                context.insert("theta".to_string(), serde_json::json!(theta));
                context.insert("arrival_rho".to_string(), serde_json::json!(arrival_rho));
                context.insert("service_rate".to_string(), serde_json::json!(service_rate));
            }
            Error::ListLengthMismatch {
                topology,
                arrivals,
                servers,
                ..
            } => {
                context.insert("topology".to_string(), serde_json::json!(topology));
                context.insert("arrivals".to_string(), serde_json::json!(arrivals));
                context.insert("servers".to_string(), serde_json::json!(servers));
            }
            Error::UnsupportedParameterCount { count } => {
                context.insert("count".to_string(), serde_json::json!(count));
            }
            Error::Numeric(numeric) => {
                context.insert("numeric".to_string(), serde_json::json!(numeric));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            infeasible_point: err.is_infeasible_point(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
