//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run id and the analysis stage; the scenario is
//! attached when known.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of a bound analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Scenario loading and process construction.
    Load,
    /// Parameter search for one strategy.
    Optimize,
    /// Strategy comparison.
    Compare,
    /// Result rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Optimize => "optimize",
            Stage::Compare => "compare",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";

    // Load stage
    pub const SCENARIO_LOADED: &str = "scenario.loaded";

    // Optimize stage
    pub const OPTIMIZE_STARTED: &str = "optimize.started";
    pub const OPTIMIZE_INFEASIBLE_POINT: &str = "optimize.infeasible_point";
    pub const LYAPUNOV_CLAMPED: &str = "optimize.lyapunov_clamped";

    // Compare stage
    pub const COMPARE_STARTED: &str = "compare.started";
    pub const COMPARE_STRATEGY_DONE: &str = "compare.strategy_done";
    pub const COMPARE_FINISHED: &str = "compare.finished";
}

/// Context for generating log events with a consistent run id.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
    /// Scenario under analysis, if any.
    pub scenario: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            scenario: None,
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_carries_scenario() {
        let ctx = LogContext::new("run-abc");
        assert!(ctx.scenario.is_none());
        let ctx = ctx.with_scenario("fat cross");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.scenario.as_deref(), Some("fat cross"));
    }

    #[test]
    fn test_event_names_are_namespaced_by_stage() {
        for name in [
            event_names::SCENARIO_LOADED,
            event_names::OPTIMIZE_STARTED,
            event_names::COMPARE_FINISHED,
        ] {
            assert!(name.contains('.'), "{name}");
        }
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Optimize.to_string(), "optimize");
        assert_eq!(serde_json::to_string(&Stage::Compare).unwrap(), "\"compare\"");
    }
}
