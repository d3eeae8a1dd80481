//! Configuration validation errors and semantic validation.

use crate::analysis::{AnalysisConfig, OptMethod, RangeSettings};
use crate::scenario::{ArrivalSpec, ScenarioSpec, ServiceSpec, TopologyKind};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 35,
            ValidationError::ParseError(_) => 36,
            ValidationError::SemanticError(_) => 37,
            ValidationError::InvalidValue { .. } => 38,
            ValidationError::VersionMismatch { .. } => 39,
        }
    }

    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for snc_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { .. } => {
                snc_common::Error::InvalidSearchConfig(err.to_string())
            }
            other => snc_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate analysis configuration semantically.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.methods.is_empty() {
        return Err(ValidationError::SemanticError(
            "at least one optimization method must be listed".to_string(),
        ));
    }

    if config.number_l > 1 {
        return Err(ValidationError::invalid(
            "number_l",
            format!("at most one Lyapunov parameter is supported, got {}", config.number_l),
        ));
    }

    for method in &config.methods {
        match method {
            OptMethod::GridSearch => {
                validate_range("grid.theta", &config.grid.theta)?;
                if config.number_l > 0 {
                    validate_range("grid.l", &config.grid.l)?;
                }
            }
            OptMethod::PatternSearch => {
                validate_start("pattern.start_theta", config.pattern.start_theta)?;
                validate_positive("pattern.delta", config.pattern.delta)?;
                validate_positive("pattern.delta_min", config.pattern.delta_min)?;
                if config.pattern.delta_min > config.pattern.delta {
                    return Err(ValidationError::invalid(
                        "pattern.delta_min",
                        format!(
                            "must not exceed pattern.delta ({}), got {}",
                            config.pattern.delta, config.pattern.delta_min
                        ),
                    ));
                }
            }
            OptMethod::NelderMead => {
                validate_start("nelder_mead.start_theta", config.nelder_mead.start_theta)?;
                validate_positive("nelder_mead.edge", config.nelder_mead.edge)?;
                validate_positive("nelder_mead.sd_min", config.nelder_mead.sd_min)?;
                if config.nelder_mead.max_iterations == 0 {
                    return Err(ValidationError::invalid(
                        "nelder_mead.max_iterations",
                        "must be at least 1",
                    ));
                }
            }
            OptMethod::SimulatedAnnealing => {
                let sa = &config.annealing;
                validate_start("annealing.start_theta", sa.start_theta)?;
                validate_positive("annealing.temperature", sa.temperature)?;
                validate_positive("annealing.search_radius", sa.search_radius)?;
                if !(sa.cooling_factor > 0.0 && sa.cooling_factor < 1.0) {
                    return Err(ValidationError::invalid(
                        "annealing.cooling_factor",
                        format!("must be in (0, 1), got {}", sa.cooling_factor),
                    ));
                }
                if sa.iterations == 0 {
                    return Err(ValidationError::invalid(
                        "annealing.iterations",
                        "must be at least 1",
                    ));
                }
            }
            OptMethod::Bfgs => {
                validate_start("bfgs.start_theta", config.bfgs.start_theta)?;
                validate_positive("bfgs.gradient_step", config.bfgs.gradient_step)?;
                validate_positive("bfgs.gtol", config.bfgs.gtol)?;
                if config.bfgs.max_iterations == 0 {
                    return Err(ValidationError::invalid(
                        "bfgs.max_iterations",
                        "must be at least 1",
                    ));
                }
            }
        }
    }

    if let Some(0) = config.budget.max_evaluations {
        return Err(ValidationError::invalid(
            "budget.max_evaluations",
            "must be at least 1 when set",
        ));
    }

    Ok(())
}

/// Validate the shape and parameters of a scenario.
pub fn validate_scenario(scenario: &ScenarioSpec) -> ValidationResult<()> {
    let (arrivals, servers) = (scenario.arrivals.len(), scenario.servers.len());
    if servers == 0 {
        return Err(ValidationError::SemanticError(
            "scenario needs at least one server".to_string(),
        ));
    }

    let shape_ok = match scenario.topology {
        TopologyKind::SingleServer => arrivals == 1 && servers == 1,
        TopologyKind::FatCross => arrivals == servers,
        TopologyKind::Tandem | TopologyKind::SinkTree => arrivals == servers + 1,
    };
    if !shape_ok {
        return Err(ValidationError::SemanticError(format!(
            "{} cannot take {} arrivals and {} servers",
            scenario.topology, arrivals, servers
        )));
    }

    for (i, arrival) in scenario.arrivals.iter().enumerate() {
        validate_arrival(&format!("arrivals[{i}]"), arrival)?;
    }
    for (i, service) in scenario.servers.iter().enumerate() {
        match service {
            ServiceSpec::ConstantRate { rate } => {
                validate_positive(&format!("servers[{i}].rate"), *rate)?
            }
        }
    }
    Ok(())
}

fn validate_arrival(field: &str, arrival: &ArrivalSpec) -> ValidationResult<()> {
    match arrival {
        ArrivalSpec::Exponential { lambda, n } => {
            validate_positive(&format!("{field}.lambda"), *lambda)?;
            validate_flows(field, *n)
        }
        ArrivalSpec::Deterministic { rate, n } => {
            validate_non_negative(&format!("{field}.rate"), *rate)?;
            validate_flows(field, *n)
        }
        ArrivalSpec::TokenBucket {
            sigma_single,
            rho_single,
            n,
        } => {
            validate_non_negative(&format!("{field}.sigma_single"), *sigma_single)?;
            validate_non_negative(&format!("{field}.rho_single"), *rho_single)?;
            validate_flows(field, *n)
        }
    }
}

fn validate_flows(field: &str, n: u32) -> ValidationResult<()> {
    if n == 0 {
        return Err(ValidationError::invalid(format!("{field}.n"), "must be at least 1"));
    }
    Ok(())
}

fn validate_range(field: &str, range: &RangeSettings) -> ValidationResult<()> {
    if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
        return Err(ValidationError::invalid(
            field,
            format!("need finite low <= high, got [{}, {}]", range.low, range.high),
        ));
    }
    validate_positive(&format!("{field}.step"), range.step)
}

fn validate_start(field: &str, value: f64) -> ValidationResult<()> {
    validate_positive(field, value)
}

fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(
            field,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid(
            field,
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snc_common::{PerformMetric, PerformParameter};

    fn scenario(topology: TopologyKind, arrivals: usize, servers: usize) -> ScenarioSpec {
        ScenarioSpec {
            name: None,
            topology,
            arrivals: vec![ArrivalSpec::Exponential { lambda: 2.0, n: 1 }; arrivals],
            servers: vec![ServiceSpec::ConstantRate { rate: 1.0 }; servers],
            perform: PerformParameter::new(PerformMetric::DelayProb, 4.0).unwrap(),
        }
    }

    #[test]
    fn default_analysis_config_is_valid() {
        validate_analysis(&AnalysisConfig::default()).unwrap();
    }

    #[test]
    fn version_mismatch_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.schema_version = "0.9.0".to_string();
        let err = validate_analysis(&cfg).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 39);
    }

    #[test]
    fn inverted_grid_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.methods = vec![OptMethod::GridSearch];
        cfg.grid.theta = RangeSettings {
            low: 2.0,
            high: 1.0,
            step: 0.1,
        };
        assert!(matches!(
            validate_analysis(&cfg),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn cooling_factor_must_be_fractional() {
        let mut cfg = AnalysisConfig::default();
        cfg.methods = vec![OptMethod::SimulatedAnnealing];
        cfg.annealing.cooling_factor = 1.0;
        assert!(validate_analysis(&cfg).is_err());
    }

    #[test]
    fn too_many_lyapunov_parameters_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.number_l = 2;
        assert!(validate_analysis(&cfg).is_err());
    }

    #[test]
    fn scenario_shapes() {
        assert!(validate_scenario(&scenario(TopologyKind::SingleServer, 1, 1)).is_ok());
        assert!(validate_scenario(&scenario(TopologyKind::FatCross, 3, 3)).is_ok());
        assert!(validate_scenario(&scenario(TopologyKind::FatCross, 2, 3)).is_err());
        assert!(validate_scenario(&scenario(TopologyKind::Tandem, 3, 2)).is_ok());
        assert!(validate_scenario(&scenario(TopologyKind::SinkTree, 2, 2)).is_err());
        assert!(validate_scenario(&scenario(TopologyKind::Tandem, 1, 0)).is_err());
    }

    #[test]
    fn zero_flow_count_rejected() {
        let mut s = scenario(TopologyKind::SingleServer, 1, 1);
        s.arrivals[0] = ArrivalSpec::TokenBucket {
            sigma_single: 1.0,
            rho_single: 0.1,
            n: 0,
        };
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn converts_into_common_error() {
        let err: snc_common::Error = ValidationError::invalid("grid.theta", "bad").into();
        assert_eq!(err.code(), 34);
        let err: snc_common::Error = ValidationError::ParseError("x".into()).into();
        assert_eq!(err.code(), 30);
    }
}
