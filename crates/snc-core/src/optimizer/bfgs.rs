//! BFGS quasi-Newton search with finite-difference gradients.

use super::evaluator::{Evaluator, Step};
use super::{axpy, check_positive, check_start, dot, sub, CostFunction, Termination};
use snc_common::{Error, Result};

/// Sufficient-decrease constant of the Armijo condition.
const ARMIJO_C: f64 = 1e-4;
/// Step halvings tried before the line search gives up.
const MAX_BACKTRACKS: usize = 50;
/// Curvature below which the inverse-Hessian update is skipped.
const MIN_CURVATURE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct BfgsConfig<const N: usize> {
    pub start: [f64; N],
    /// Relative finite-difference step, scaled by `max(1, |x_i|)`.
    pub gradient_step: f64,
    /// Stop once the largest gradient component is below this.
    pub gtol: f64,
    pub max_iterations: usize,
}

impl<const N: usize> BfgsConfig<N> {
    pub fn new(start: [f64; N]) -> Self {
        Self {
            start,
            gradient_step: 1e-6,
            gtol: 1e-5,
            max_iterations: 400,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_start(&self.start)?;
        check_positive("gradient_step", self.gradient_step)?;
        check_positive("gtol", self.gtol)?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidSearchConfig(
                "bfgs needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

type Matrix<const N: usize> = [[f64; N]; N];

fn identity<const N: usize>() -> Matrix<N> {
    std::array::from_fn(|i| std::array::from_fn(|j| if i == j { 1.0 } else { 0.0 }))
}

fn mat_vec<const N: usize>(m: &Matrix<N>, v: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| dot(&m[i], v))
}

/// Central differences, falling back to one-sided differences next to an
/// infeasible neighbour and to zero when both neighbours are infeasible.
fn gradient<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    x: &[f64; N],
    fx: f64,
    step: f64,
) -> Step<[f64; N]>
where
    C: CostFunction<N> + ?Sized,
{
    let mut g = [0.0; N];
    for i in 0..N {
        let h = step * x[i].abs().max(1.0);
        let mut forward = *x;
        forward[i] += h;
        let mut backward = *x;
        backward[i] -= h;
        let f_forward = ev.eval(&forward)?;
        let f_backward = ev.eval(&backward)?;
        g[i] = match (f_forward.is_finite(), f_backward.is_finite()) {
            (true, true) => (f_forward - f_backward) / (2.0 * h),
            (true, false) => (f_forward - fx) / h,
            (false, true) => (fx - f_backward) / h,
            (false, false) => 0.0,
        };
    }
    Ok(g)
}

/// `H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ` with `ρ = 1 / yᵀs`.
fn update_inverse_hessian<const N: usize>(h: &mut Matrix<N>, s: &[f64; N], y: &[f64; N], sy: f64) {
    let rho = 1.0 / sy;
    let hy = mat_vec(h, y);
    let yhy = dot(y, &hy);
    for i in 0..N {
        for j in 0..N {
            h[i][j] += rho * ((1.0 + rho * yhy) * s[i] * s[j] - hy[i] * s[j] - s[i] * hy[j]);
        }
    }
}

pub(super) fn search<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    config: &BfgsConfig<N>,
    iterations: &mut usize,
) -> Step<Termination>
where
    C: CostFunction<N> + ?Sized,
{
    let mut x = config.start;
    let mut fx = ev.eval(&x)?;
    if !fx.is_finite() {
        return Ok(Termination::Converged);
    }
    let mut g = gradient(ev, &x, fx, config.gradient_step)?;
    let mut h: Matrix<N> = identity();

    loop {
        if g.iter().fold(0.0f64, |m, gi| m.max(gi.abs())) < config.gtol {
            return Ok(Termination::Converged);
        }
        if *iterations >= config.max_iterations {
            return Ok(Termination::IterationLimit);
        }
        *iterations += 1;

        let mut direction = mat_vec(&h, &g).map(|d| -d);
        let mut slope = dot(&g, &direction);
        if slope >= 0.0 || slope.is_nan() {
            h = identity();
            direction = g.map(|d| -d);
            slope = dot(&g, &direction);
        }

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = axpy(alpha, &direction, &x);
            let f_candidate = ev.eval(&candidate)?;
            if f_candidate.is_finite() && f_candidate <= fx + ARMIJO_C * alpha * slope {
                accepted = Some((candidate, f_candidate));
                break;
            }
            alpha *= 0.5;
        }
        let Some((x_new, f_new)) = accepted else {
            // No descent along the search direction at any tried step.
            return Ok(Termination::Converged);
        };

        let g_new = gradient(ev, &x_new, f_new, config.gradient_step)?;
        let s = sub(&x_new, &x);
        let y = sub(&g_new, &g);
        let sy = dot(&s, &y);
        if sy > MIN_CURVATURE {
            update_inverse_hessian(&mut h, &s, &y, sy);
        }

        x = x_new;
        fx = f_new;
        g = g_new;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{minimize, SearchBudget, Strategy};
    use super::*;

    #[test]
    fn quadratic_converges_quickly() {
        let cost = |x: &[f64; 2]| -> Result<f64> {
            Ok(3.0 * (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2))
        };
        let strategy = Strategy::Bfgs(BfgsConfig::new([0.0, 0.0]));
        let opt = minimize(&cost, &strategy, &SearchBudget::unlimited()).unwrap();
        assert_eq!(opt.termination, Termination::Converged);
        assert!((opt.params[0] - 1.0).abs() < 1e-4);
        assert!((opt.params[1] + 2.0).abs() < 1e-4);
        assert!(opt.iterations < 50);
    }

    #[test]
    fn infeasible_start_stops_immediately() {
        let cost = |_: &[f64; 1]| -> Result<f64> { Ok(f64::INFINITY) };
        let strategy = Strategy::Bfgs(BfgsConfig::new([1.0]));
        let opt = minimize(&cost, &strategy, &SearchBudget::unlimited()).unwrap();
        assert_eq!(opt.evaluations, 1);
        assert_eq!(opt.value, f64::INFINITY);
    }

    #[test]
    fn line_search_backs_off_from_infeasible_region() {
        // Minimum sits on the boundary of the feasible region x <= 3.
        let cost = |x: &[f64; 1]| -> Result<f64> {
            if x[0] > 3.0 {
                Ok(f64::INFINITY)
            } else {
                Ok(-2.0 * x[0])
            }
        };
        let strategy = Strategy::Bfgs(BfgsConfig::new([0.0]));
        let opt = minimize(&cost, &strategy, &SearchBudget::unlimited()).unwrap();
        assert!(opt.params[0] <= 3.0);
        assert!(opt.params[0] > 2.9, "{:?}", opt.params);
    }

    #[test]
    fn inverse_hessian_update_satisfies_secant_condition() {
        let mut h: Matrix<2> = identity();
        let s = [0.5, -0.2];
        let y = [1.0, 0.3];
        let sy = dot(&s, &y);
        update_inverse_hessian(&mut h, &s, &y, sy);
        let hy = mat_vec(&h, &y);
        assert!((hy[0] - s[0]).abs() < 1e-12);
        assert!((hy[1] - s[1]).abs() < 1e-12);
    }
}
