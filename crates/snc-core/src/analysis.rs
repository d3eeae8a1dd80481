//! End-to-end analysis of a scenario: build, compare strategies, report.

use crate::compare::{best_outcome, compare_strategies, StrategyOutcome};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::topology::build_setting;
use serde::Serialize;
use snc_common::{PerformMetric, PerformParameter, Result};
use snc_config::{AnalysisConfig, ArrivalSpec, OptMethod, ScenarioSpec, ServiceSpec, TopologyKind};

/// Everything the CLI prints for one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub scenario: String,
    pub topology: TopologyKind,
    pub metric: PerformMetric,
    pub target: f64,
    /// Parameters searched: 1 for θ, 2 for θ and l.
    pub parameters: usize,
    pub results: Vec<StrategyOutcome>,
    /// Method with the tightest finite bound.
    pub best: Option<OptMethod>,
}

impl AnalysisReport {
    /// True when at least one strategy found a finite bound.
    pub fn has_guarantee(&self) -> bool {
        self.best.is_some()
    }

    /// One line per strategy for the summary format.
    pub fn summary_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .map(|o| {
                let bound = if o.is_feasible() {
                    format!("{:.6e}", o.bound)
                } else {
                    "inf".to_string()
                };
                let marker = if Some(o.method) == self.best { " *" } else { "" };
                format!(
                    "{} {} {}={}: bound={} params={:?} evals={} {:.1}ms{}",
                    self.scenario,
                    o.method,
                    self.metric,
                    self.target,
                    bound,
                    o.params,
                    o.evaluations,
                    o.elapsed_ms,
                    marker
                )
            })
            .collect()
    }
}

/// Build the scenario's setting and run `methods` on it.
pub fn analyze(
    scenario: &ScenarioSpec,
    methods: &[OptMethod],
    config: &AnalysisConfig,
    ctx: &LogContext,
) -> Result<AnalysisReport> {
    let label = scenario.label();
    let ctx = ctx.clone().with_scenario(label.clone());
    let setting = build_setting(scenario)?;
    log_event!(
        ctx,
        DEBUG,
        event_names::SCENARIO_LOADED,
        Stage::Load,
        "scenario built",
        topology = scenario.topology.as_str(),
        arrivals = scenario.arrivals.len() as u64,
        servers = scenario.servers.len() as u64
    );

    let results = compare_strategies(&setting, methods, config, &ctx)?;
    let best = best_outcome(&results).map(|o| o.method);
    Ok(AnalysisReport {
        scenario: label,
        topology: scenario.topology,
        metric: scenario.perform.metric(),
        target: scenario.perform.value(),
        parameters: config.number_l + 1,
        results,
        best,
    })
}

/// The two comparison scenarios run by `snc-core demo`.
///
/// 1. One exponential flow (λ = 4.4) at a constant-rate server (0.24),
///    output bound over 4 slots.
/// 2. Fat cross with exponential flows λ = 11 and 9 at servers of rate 5
///    and 4, delay-violation probability at delay 4.
pub fn demo_scenarios() -> Result<Vec<ScenarioSpec>> {
    Ok(vec![
        ScenarioSpec {
            name: Some("single server output".to_string()),
            topology: TopologyKind::SingleServer,
            arrivals: vec![ArrivalSpec::Exponential { lambda: 4.4, n: 1 }],
            servers: vec![ServiceSpec::ConstantRate { rate: 0.24 }],
            perform: PerformParameter::new(PerformMetric::Output, 4.0)?,
        },
        ScenarioSpec {
            name: Some("fat cross delay probability".to_string()),
            topology: TopologyKind::FatCross,
            arrivals: vec![
                ArrivalSpec::Exponential { lambda: 11.0, n: 1 },
                ArrivalSpec::Exponential { lambda: 9.0, n: 1 },
            ],
            servers: vec![
                ServiceSpec::ConstantRate { rate: 5.0 },
                ServiceSpec::ConstantRate { rate: 4.0 },
            ],
            perform: PerformParameter::new(PerformMetric::DelayProb, 4.0)?,
        },
    ])
}
