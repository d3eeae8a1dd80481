//! Budgeted, infeasibility-absorbing evaluation of a cost function.

use super::{CostFunction, SearchBudget, TracePoint};
use crate::logging::event_names;
use std::time::Instant;

/// The search budget ran out; the caller stops and reports its best point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Exhausted;

pub(crate) type Step<T> = std::result::Result<T, Exhausted>;

/// Wraps a cost function for one search.
///
/// Every evaluation goes through [`Evaluator::eval`], which
/// - refuses to evaluate once the budget is spent,
/// - maps errors and non-finite values to `+∞`,
/// - tracks the best point seen and, optionally, the improvement trace.
pub(crate) struct Evaluator<'a, C: ?Sized, const N: usize> {
    cost: &'a C,
    budget: SearchBudget,
    started: Instant,
    evaluations: u64,
    best: Option<([f64; N], f64)>,
    trace: Option<Vec<TracePoint>>,
}

impl<'a, C, const N: usize> Evaluator<'a, C, N>
where
    C: CostFunction<N> + ?Sized,
{
    pub fn new(cost: &'a C, budget: SearchBudget, record_trace: bool) -> Self {
        Self {
            cost,
            budget,
            started: Instant::now(),
            evaluations: 0,
            best: None,
            trace: record_trace.then(Vec::new),
        }
    }

    fn exhausted(&self) -> bool {
        if let Some(max) = self.budget.max_evaluations {
            if self.evaluations >= max {
                return true;
            }
        }
        match self.budget.time_limit {
            Some(limit) => self.started.elapsed() >= limit,
            None => false,
        }
    }

    /// Evaluate `x`, returning `+∞` for infeasible points.
    pub fn eval(&mut self, x: &[f64; N]) -> Step<f64> {
        if self.exhausted() {
            return Err(Exhausted);
        }
        self.evaluations += 1;

        let value = match self.cost.evaluate(x) {
            Ok(v) if v.is_finite() => v,
            Ok(v) => {
                tracing::trace!(
                    target: event_names::OPTIMIZE_INFEASIBLE_POINT,
                    params = ?x,
                    value = v,
                    "non-finite cost"
                );
                f64::INFINITY
            }
            Err(e) => {
                if e.is_infeasible_point() {
                    tracing::debug!(
                        target: event_names::OPTIMIZE_INFEASIBLE_POINT,
                        params = ?x,
                        code = e.code(),
                        error = %e,
                        "infeasible point"
                    );
                } else {
                    tracing::warn!(
                        target: event_names::OPTIMIZE_INFEASIBLE_POINT,
                        params = ?x,
                        code = e.code(),
                        error = %e,
                        "unexpected error during cost evaluation"
                    );
                }
                f64::INFINITY
            }
        };

        let improved = match self.best {
            None => true,
            Some((_, best)) => value < best,
        };
        if improved {
            self.best = Some((*x, value));
            if let Some(trace) = self.trace.as_mut() {
                trace.push(TracePoint {
                    evaluation: self.evaluations,
                    params: x.to_vec(),
                    value,
                });
            }
        }
        Ok(value)
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Best point so far, or `fallback` at `+∞` if nothing was evaluated.
    pub fn best(&self, fallback: [f64; N]) -> ([f64; N], f64) {
        self.best.unwrap_or((fallback, f64::INFINITY))
    }

    pub fn take_trace(&mut self) -> Vec<TracePoint> {
        self.trace.take().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snc_common::{Error, Result};
    use std::time::Duration;

    fn quadratic(x: &[f64; 1]) -> Result<f64> {
        Ok((x[0] - 2.0).powi(2))
    }

    #[test]
    fn errors_become_infinite() {
        let cost = |_: &[f64; 1]| -> Result<f64> { Err(Error::out_of_bounds("theta", 0.0, "x")) };
        let mut ev = Evaluator::new(&cost, SearchBudget::default(), false);
        assert_eq!(ev.eval(&[1.0]).unwrap(), f64::INFINITY);
        assert_eq!(ev.evaluations(), 1);
    }

    #[test]
    fn nan_becomes_infinite() {
        let cost = |_: &[f64; 1]| -> Result<f64> { Ok(f64::NAN) };
        let mut ev = Evaluator::new(&cost, SearchBudget::default(), false);
        assert_eq!(ev.eval(&[1.0]).unwrap(), f64::INFINITY);
        assert_eq!(ev.best([0.0]), ([1.0], f64::INFINITY));
    }

    #[test]
    fn best_tracks_strict_improvements() {
        let mut ev = Evaluator::new(&quadratic, SearchBudget::default(), true);
        ev.eval(&[0.0]).unwrap();
        ev.eval(&[1.0]).unwrap();
        ev.eval(&[3.0]).unwrap();
        ev.eval(&[5.0]).unwrap();
        assert_eq!(ev.best([9.0]), ([1.0], 1.0));
        let trace = ev.take_trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].evaluation, 2);
    }

    #[test]
    fn evaluation_budget_is_enforced() {
        let budget = SearchBudget::evaluations(2);
        let mut ev = Evaluator::new(&quadratic, budget, false);
        assert!(ev.eval(&[0.0]).is_ok());
        assert!(ev.eval(&[1.0]).is_ok());
        assert_eq!(ev.eval(&[2.0]), Err(Exhausted));
        assert_eq!(ev.evaluations(), 2);
    }

    #[test]
    fn zero_time_limit_exhausts_immediately() {
        let budget = SearchBudget {
            max_evaluations: None,
            time_limit: Some(Duration::ZERO),
        };
        let mut ev = Evaluator::new(&quadratic, budget, false);
        assert_eq!(ev.eval(&[0.0]), Err(Exhausted));
        assert_eq!(ev.best([4.0]), ([4.0], f64::INFINITY));
    }
}
