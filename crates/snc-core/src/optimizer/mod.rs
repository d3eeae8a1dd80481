//! Black-box minimization over a fixed number of parameters.
//!
//! A bound is a function of `[θ]` or `[θ, l]` whose feasible region is not
//! known in advance. Every strategy here evaluates it through one
//! boundary that turns errors, NaN and infinities into `+∞`, so probing an
//! infeasible point never aborts a search.
//!
//! # Strategies
//!
//! - **Grid**: exhaustive Cartesian grid, deterministic baseline.
//! - **Pattern search**: Hooke–Jeeves exploratory and pattern moves.
//! - **Nelder–Mead**: simplex search from a Gao–Han initial simplex.
//! - **Simulated annealing**: seeded Metropolis random walk.
//! - **BFGS**: quasi-Newton with finite-difference gradients.
//!
//! All of them honour a [`SearchBudget`] and return the best point seen.

mod annealing;
mod bfgs;
mod evaluator;
mod grid;
mod nelder_mead;
mod pattern;

pub use annealing::AnnealingConfig;
pub use bfgs::BfgsConfig;
pub use grid::{GridConfig, GridRange, MAX_GRID_POINTS};
pub use nelder_mead::{NelderMeadConfig, NelderMeadParameters};
pub use pattern::PatternConfig;

use evaluator::Evaluator;
use serde::{Deserialize, Serialize};
use snc_common::{Error, Result};
use snc_config::OptMethod;
use std::time::Duration;

/// A function to minimize over `N` real parameters.
pub trait CostFunction<const N: usize> {
    fn evaluate(&self, params: &[f64; N]) -> Result<f64>;
}

impl<F, const N: usize> CostFunction<N> for F
where
    F: Fn(&[f64; N]) -> Result<f64>,
{
    fn evaluate(&self, params: &[f64; N]) -> Result<f64> {
        self(params)
    }
}

/// Limits shared by every strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchBudget {
    pub max_evaluations: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// No limit besides each strategy's own iteration cap.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn evaluations(max: u64) -> Self {
        Self {
            max_evaluations: Some(max),
            time_limit: None,
        }
    }

    pub fn from_settings(settings: &snc_config::analysis::BudgetSettings) -> Self {
        Self {
            max_evaluations: settings.max_evaluations,
            time_limit: settings.time_limit_ms.map(Duration::from_millis),
        }
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The strategy's own stopping rule fired.
    Converged,
    /// The [`SearchBudget`] ran out.
    BudgetExhausted,
    /// The strategy's iteration cap was reached.
    IterationLimit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Termination::Converged => "converged",
            Termination::BudgetExhausted => "budget_exhausted",
            Termination::IterationLimit => "iteration_limit",
        };
        f.write_str(s)
    }
}

/// An improvement of the best value during a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// 1-based index of the evaluation that found this point.
    pub evaluation: u64,
    pub params: Vec<f64>,
    pub value: f64,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum<const N: usize> {
    pub params: [f64; N],
    /// Best cost, `+∞` when no feasible point was found.
    pub value: f64,
    pub evaluations: u64,
    pub iterations: usize,
    pub termination: Termination,
    /// Improvements in order; empty unless tracing was requested.
    pub trace: Vec<TracePoint>,
}

impl<const N: usize> Optimum<N> {
    pub fn is_feasible(&self) -> bool {
        self.value.is_finite()
    }
}

/// A strategy together with its configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy<const N: usize> {
    GridSearch(GridConfig<N>),
    PatternSearch(PatternConfig<N>),
    NelderMead(NelderMeadConfig<N>),
    SimulatedAnnealing(AnnealingConfig<N>),
    Bfgs(BfgsConfig<N>),
}

impl<const N: usize> Strategy<N> {
    pub fn method(&self) -> OptMethod {
        match self {
            Strategy::GridSearch(_) => OptMethod::GridSearch,
            Strategy::PatternSearch(_) => OptMethod::PatternSearch,
            Strategy::NelderMead(_) => OptMethod::NelderMead,
            Strategy::SimulatedAnnealing(_) => OptMethod::SimulatedAnnealing,
            Strategy::Bfgs(_) => OptMethod::Bfgs,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::GridSearch(c) => c.validate(),
            Strategy::PatternSearch(c) => c.validate(),
            Strategy::NelderMead(c) => c.validate(),
            Strategy::SimulatedAnnealing(c) => c.validate(),
            Strategy::Bfgs(c) => c.validate(),
        }
    }

    /// Point reported when the budget runs out before the first evaluation.
    fn fallback_point(&self) -> [f64; N] {
        match self {
            Strategy::GridSearch(c) => c.ranges.map(|r| r.low),
            Strategy::PatternSearch(c) => c.start,
            Strategy::NelderMead(c) => c.start,
            Strategy::SimulatedAnnealing(c) => c.start,
            Strategy::Bfgs(c) => c.start,
        }
    }
}

pub(crate) fn check_start<const N: usize>(start: &[f64; N]) -> Result<()> {
    if start.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(Error::InvalidSearchConfig(format!(
            "start point {start:?} must be finite"
        )))
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSearchConfig(format!(
            "{name} = {value} must be finite and > 0"
        )))
    }
}

/// Minimize `cost` with `strategy` within `budget`.
///
/// Fails only when the strategy configuration is invalid; infeasible
/// points are absorbed and an everywhere-infeasible cost yields an
/// [`Optimum`] with value `+∞`.
pub fn minimize<C, const N: usize>(
    cost: &C,
    strategy: &Strategy<N>,
    budget: &SearchBudget,
) -> Result<Optimum<N>>
where
    C: CostFunction<N> + ?Sized,
{
    run(cost, strategy, budget, false)
}

/// [`minimize`], also recording every improvement in [`Optimum::trace`].
pub fn minimize_traced<C, const N: usize>(
    cost: &C,
    strategy: &Strategy<N>,
    budget: &SearchBudget,
) -> Result<Optimum<N>>
where
    C: CostFunction<N> + ?Sized,
{
    run(cost, strategy, budget, true)
}

fn run<C, const N: usize>(
    cost: &C,
    strategy: &Strategy<N>,
    budget: &SearchBudget,
    record_trace: bool,
) -> Result<Optimum<N>>
where
    C: CostFunction<N> + ?Sized,
{
    if N == 0 {
        return Err(Error::UnsupportedParameterCount { count: N });
    }
    strategy.validate()?;
    if budget.max_evaluations == Some(0) {
        return Err(Error::InvalidSearchConfig(
            "max_evaluations must be at least 1".to_string(),
        ));
    }

    let mut ev = Evaluator::new(cost, *budget, record_trace);
    let mut iterations = 0usize;
    let outcome = match strategy {
        Strategy::GridSearch(c) => grid::search(&mut ev, c, &mut iterations),
        Strategy::PatternSearch(c) => pattern::search(&mut ev, c, &mut iterations),
        Strategy::NelderMead(c) => nelder_mead::search(&mut ev, c, &mut iterations),
        Strategy::SimulatedAnnealing(c) => annealing::search(&mut ev, c, &mut iterations),
        Strategy::Bfgs(c) => bfgs::search(&mut ev, c, &mut iterations),
    };
    let termination = outcome.unwrap_or(Termination::BudgetExhausted);

    let (params, value) = ev.best(strategy.fallback_point());
    tracing::debug!(
        method = %strategy.method(),
        value,
        evaluations = ev.evaluations(),
        iterations,
        termination = %termination,
        "search finished"
    );

    Ok(Optimum {
        params,
        value,
        evaluations: ev.evaluations(),
        iterations,
        termination,
        trace: ev.take_trace(),
    })
}

// ── Vector helpers ──────────────────────────────────────────────────

pub(crate) fn axpy<const N: usize>(a: f64, x: &[f64; N], y: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| a * x[i] + y[i])
}

pub(crate) fn dot<const N: usize>(x: &[f64; N], y: &[f64; N]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

pub(crate) fn sub<const N: usize>(x: &[f64; N], y: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| x[i] - y[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(x: &[f64; 2]) -> Result<f64> {
        Ok((x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2))
    }

    fn all_strategies() -> Vec<Strategy<2>> {
        vec![
            Strategy::GridSearch(GridConfig::new([
                GridRange::new(-2.0, 2.0, 0.5),
                GridRange::new(-2.0, 2.0, 0.5),
            ])),
            Strategy::PatternSearch(PatternConfig::new([0.0, 0.0])),
            Strategy::NelderMead(NelderMeadConfig::new([0.0, 0.0])),
            Strategy::SimulatedAnnealing(AnnealingConfig::new([0.0, 0.0])),
            Strategy::Bfgs(BfgsConfig::new([0.0, 0.0])),
        ]
    }

    #[test]
    fn method_tags_match() {
        let methods: Vec<OptMethod> = all_strategies().iter().map(Strategy::method).collect();
        assert_eq!(methods, OptMethod::ALL.to_vec());
    }

    #[test]
    fn every_strategy_finds_the_bowl() {
        for strategy in all_strategies() {
            let opt = minimize(&bowl, &strategy, &SearchBudget::unlimited()).unwrap();
            assert!(opt.value < 1e-2, "{:?}: {}", strategy.method(), opt.value);
        }
    }

    #[test]
    fn zero_evaluation_budget_rejected() {
        let strategy = Strategy::Bfgs(BfgsConfig::new([0.0, 0.0]));
        let err = minimize(&bowl, &strategy, &SearchBudget::evaluations(0)).unwrap_err();
        assert_eq!(err.code(), 34);
    }

    #[test]
    fn trace_is_monotone() {
        let strategy = Strategy::NelderMead(NelderMeadConfig::new([3.0, 3.0]));
        let opt = minimize_traced(&bowl, &strategy, &SearchBudget::unlimited()).unwrap();
        assert!(!opt.trace.is_empty());
        assert!(opt.trace.windows(2).all(|w| w[1].value < w[0].value));
        assert_eq!(opt.trace.last().map(|p| p.value), Some(opt.value));
    }

    #[test]
    fn termination_display() {
        assert_eq!(Termination::BudgetExhausted.to_string(), "budget_exhausted");
        assert_eq!(
            serde_json::to_string(&Termination::IterationLimit).unwrap(),
            "\"iteration_limit\""
        );
    }
}
