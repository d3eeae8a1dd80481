//! Run several optimization strategies on one setting and compare them.

use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::optimizer::{
    AnnealingConfig, BfgsConfig, CostFunction, GridConfig, GridRange, NelderMeadConfig,
    NelderMeadParameters, PatternConfig, SearchBudget, Strategy, Termination,
};
use crate::topology::{optimize_setting, Setting, SettingCost};
use serde::Serialize;
use snc_common::{Error, Result};
use snc_config::{AnalysisConfig, OptMethod};
use std::time::Instant;

/// One strategy's result on a setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub method: OptMethod,
    /// Bound on its natural scale; serialized as `null` when infinite.
    pub bound: f64,
    /// `[θ]` or `[θ, l]` at the bound.
    pub params: Vec<f64>,
    pub elapsed_ms: f64,
    pub evaluations: u64,
    pub iterations: usize,
    pub termination: Termination,
}

impl StrategyOutcome {
    pub fn is_feasible(&self) -> bool {
        self.bound.is_finite()
    }
}

fn point<const N: usize>(theta: f64, l: f64) -> [f64; N] {
    std::array::from_fn(|i| if i == 0 { theta } else { l })
}

/// Strategy for `method` over `[θ]` (N = 1) or `[θ, l]` (N = 2), configured
/// from the analysis settings.
pub fn strategy_from_config<const N: usize>(
    method: OptMethod,
    config: &AnalysisConfig,
) -> Strategy<N> {
    match method {
        OptMethod::GridSearch => {
            let grid = &config.grid;
            Strategy::GridSearch(GridConfig::new(std::array::from_fn(|i| {
                GridRange::from(if i == 0 { &grid.theta } else { &grid.l })
            })))
        }
        OptMethod::PatternSearch => {
            let s = &config.pattern;
            Strategy::PatternSearch(
                PatternConfig::new(point(s.start_theta, s.start_l))
                    .with_delta(s.delta, s.delta_min),
            )
        }
        OptMethod::NelderMead => {
            let s = &config.nelder_mead;
            let mut nm = NelderMeadConfig::new(point(s.start_theta, s.start_l));
            nm.edge = s.edge;
            nm.sd_min = s.sd_min;
            nm.max_iterations = s.max_iterations;
            if s.adaptive {
                nm.parameters = NelderMeadParameters::adaptive(N);
            }
            Strategy::NelderMead(nm)
        }
        OptMethod::SimulatedAnnealing => {
            let s = &config.annealing;
            let mut sa = AnnealingConfig::new(point(s.start_theta, s.start_l)).with_seed(s.seed);
            sa.temperature = s.temperature;
            sa.cooling_factor = s.cooling_factor;
            sa.search_radius = s.search_radius;
            sa.iterations = s.iterations;
            Strategy::SimulatedAnnealing(sa)
        }
        OptMethod::Bfgs => {
            let s = &config.bfgs;
            let mut bfgs = BfgsConfig::new(point(s.start_theta, s.start_l));
            bfgs.gradient_step = s.gradient_step;
            bfgs.gtol = s.gtol;
            bfgs.max_iterations = s.max_iterations;
            Strategy::Bfgs(bfgs)
        }
    }
}

/// Run every method in `methods` on `setting`, one after another.
///
/// `config.number_l` Lyapunov parameters are optimized next to θ; only 0
/// and 1 are supported.
pub fn compare_strategies<S>(
    setting: &S,
    methods: &[OptMethod],
    config: &AnalysisConfig,
    ctx: &LogContext,
) -> Result<Vec<StrategyOutcome>>
where
    S: Setting + ?Sized,
{
    if methods.is_empty() {
        return Err(Error::Config("no optimization method selected".to_string()));
    }
    match config.number_l {
        0 => run_all::<S, 1>(setting, methods, config, ctx),
        1 => run_all::<S, 2>(setting, methods, config, ctx),
        n => Err(Error::UnsupportedParameterCount { count: n + 1 }),
    }
}

fn run_all<S, const N: usize>(
    setting: &S,
    methods: &[OptMethod],
    config: &AnalysisConfig,
    ctx: &LogContext,
) -> Result<Vec<StrategyOutcome>>
where
    S: Setting + ?Sized,
    for<'a> SettingCost<'a, S>: CostFunction<N>,
{
    let budget = SearchBudget::from_settings(&config.budget);
    log_event!(
        ctx,
        INFO,
        event_names::COMPARE_STARTED,
        Stage::Compare,
        "comparing strategies",
        topology = setting.name(),
        strategies = methods.len() as u64,
        parameters = N as u64
    );

    let mut outcomes = Vec::with_capacity(methods.len());
    for &method in methods {
        let strategy = strategy_from_config::<N>(method, config);
        log_event!(
            ctx,
            DEBUG,
            event_names::OPTIMIZE_STARTED,
            Stage::Optimize,
            "strategy started",
            method = method.as_str()
        );

        let started = Instant::now();
        let result = optimize_setting(setting, &strategy, &budget, config.lyapunov_mode)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

        let outcome = StrategyOutcome {
            method,
            bound: result.bound,
            params: result.optimum.params.to_vec(),
            elapsed_ms,
            evaluations: result.optimum.evaluations,
            iterations: result.optimum.iterations,
            termination: result.optimum.termination,
        };

        if outcome.is_feasible() {
            log_event!(
                ctx,
                INFO,
                event_names::COMPARE_STRATEGY_DONE,
                Stage::Compare,
                "strategy finished",
                method = method.as_str(),
                bound = outcome.bound,
                evaluations = outcome.evaluations,
                elapsed_ms = outcome.elapsed_ms
            );
        } else {
            log_event!(
                ctx,
                WARN,
                event_names::COMPARE_STRATEGY_DONE,
                Stage::Compare,
                "no feasible point found",
                method = method.as_str(),
                evaluations = outcome.evaluations
            );
        }
        outcomes.push(outcome);
    }

    log_event!(
        ctx,
        INFO,
        event_names::COMPARE_FINISHED,
        Stage::Compare,
        "comparison finished",
        feasible = outcomes.iter().filter(|o| o.is_feasible()).count() as u64
    );
    Ok(outcomes)
}

/// Outcome with the smallest bound, ties going to the earlier strategy.
pub fn best_outcome(outcomes: &[StrategyOutcome]) -> Option<&StrategyOutcome> {
    outcomes
        .iter()
        .filter(|o| o.is_feasible())
        .fold(None, |best: Option<&StrategyOutcome>, o| match best {
            Some(b) if b.bound <= o.bound => Some(b),
            _ => Some(o),
        })
}
