//! Hooke–Jeeves pattern search.

use super::evaluator::{Evaluator, Step};
use super::{axpy, check_positive, check_start, CostFunction, Termination};
use snc_common::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PatternConfig<const N: usize> {
    pub start: [f64; N],
    /// Initial step length.
    pub delta: f64,
    /// Stop once the step length falls below this.
    pub delta_min: f64,
    pub max_iterations: usize,
}

impl<const N: usize> PatternConfig<N> {
    pub fn new(start: [f64; N]) -> Self {
        Self {
            start,
            delta: 3.0,
            delta_min: 0.01,
            max_iterations: 10_000,
        }
    }

    pub fn with_delta(mut self, delta: f64, delta_min: f64) -> Self {
        self.delta = delta;
        self.delta_min = delta_min;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_start(&self.start)?;
        check_positive("delta", self.delta)?;
        check_positive("delta_min", self.delta_min)?;
        if self.delta_min > self.delta {
            return Err(Error::InvalidSearchConfig(format!(
                "delta_min {} exceeds delta {}",
                self.delta_min, self.delta
            )));
        }
        Ok(())
    }
}

/// Coordinate-wise probe around `x`: `+δ` first, `-δ` only if that fails.
fn explore<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    mut x: [f64; N],
    mut fx: f64,
    delta: f64,
) -> Step<([f64; N], f64)>
where
    C: CostFunction<N> + ?Sized,
{
    for i in 0..N {
        let mut up = x;
        up[i] += delta;
        let f_up = ev.eval(&up)?;
        if f_up < fx {
            x = up;
            fx = f_up;
            continue;
        }
        let mut down = x;
        down[i] -= delta;
        let f_down = ev.eval(&down)?;
        if f_down < fx {
            x = down;
            fx = f_down;
        }
    }
    Ok((x, fx))
}

pub(super) fn search<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    config: &PatternConfig<N>,
    iterations: &mut usize,
) -> Step<Termination>
where
    C: CostFunction<N> + ?Sized,
{
    let mut base = config.start;
    let mut f_base = ev.eval(&base)?;
    let mut delta = config.delta;

    loop {
        if delta < config.delta_min {
            return Ok(Termination::Converged);
        }
        if *iterations >= config.max_iterations {
            return Ok(Termination::IterationLimit);
        }
        *iterations += 1;

        let (mut new, mut f_new) = explore(ev, base, f_base, delta)?;
        if f_new >= f_base {
            delta /= 2.0;
            continue;
        }

        // Keep jumping along the improving direction while it pays off.
        loop {
            let pattern = axpy(2.0, &new, &base.map(|b| -b));
            base = new;
            f_base = f_new;
            if *iterations >= config.max_iterations {
                return Ok(Termination::IterationLimit);
            }
            *iterations += 1;

            let f_pattern = ev.eval(&pattern)?;
            let (candidate, f_candidate) = explore(ev, pattern, f_pattern, delta)?;
            if f_candidate < f_base {
                new = candidate;
                f_new = f_candidate;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{minimize, SearchBudget, Strategy};
    use super::*;

    #[test]
    fn converges_on_shifted_quadratic() {
        let cost =
            |x: &[f64; 2]| -> Result<f64> { Ok((x[0] - 1.3).powi(2) + (x[1] - 0.7).powi(2)) };
        let strategy =
            Strategy::PatternSearch(PatternConfig::new([0.5, 2.0]).with_delta(1.0, 1e-6));
        let opt = minimize(&cost, &strategy, &SearchBudget::unlimited()).unwrap();
        assert_eq!(opt.termination, Termination::Converged);
        assert!((opt.params[0] - 1.3).abs() < 1e-5);
        assert!((opt.params[1] - 0.7).abs() < 1e-5);
    }

    #[test]
    fn step_halves_down_to_delta_min() {
        let cost = |_: &[f64; 1]| -> Result<f64> { Ok(1.0) };
        let strategy = Strategy::PatternSearch(PatternConfig::new([0.0]).with_delta(1.0, 0.1));
        let opt = minimize(&cost, &strategy, &SearchBudget::unlimited()).unwrap();
        // 1, 0.5, 0.25, 0.125 explored; 0.0625 < 0.1 stops.
        assert_eq!(opt.iterations, 4);
        assert_eq!(opt.evaluations, 1 + 4 * 2);
    }

    #[test]
    fn delta_min_above_delta_rejected() {
        let config = PatternConfig::new([0.0]).with_delta(0.1, 1.0);
        assert_eq!(config.validate().unwrap_err().code(), 34);
    }
}
