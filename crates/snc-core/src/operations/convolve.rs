//! Series composition of two services.

use crate::process::{check_theta, Process, Service};
use snc_common::{Error, Result};
use snc_math::{is_equal, neg_log1m_exp, NumericError};

/// Relative perturbation applied to a common rate when both services run
/// at the same speed.
pub const TIE_RATE_SLACK: f64 = 1e-3;

/// Two services in series, seen as one.
///
/// For distinct rates,
/// `rho = max(ρ1, ρ2)` and
/// `sigma = σ1 + σ2 - ln(1 - e^{-θ|ρ1-ρ2|}) / θ`.
///
/// Equal rates make the geometric sum diverge; the common rate is then
/// slowed by `δ = TIE_RATE_SLACK·|ρ|` and the sum is bounded by
/// `sup_t (t+1)·e^{-θδt}`. A tie intentionally does not fall back to the
/// smaller of the two bursts with the common rate unchanged: both bursts
/// stay in the sum, and dropping either one would under-bound the pair.
///
/// Only `rho` is associative. The gap term depends on which services meet
/// first, so `(a ⊗ b) ⊗ c` and `a ⊗ (b ⊗ c)` carry different sigmas. For
/// services ordered slowest first, the left fold is the tighter grouping;
/// `FatCross` and `TandemSfa` fold left in path order.
#[derive(Debug, Clone)]
pub struct Convolve<S1, S2> {
    first: S1,
    second: S2,
}

impl<S1: Service, S2: Service> Convolve<S1, S2> {
    pub fn new(first: S1, second: S2) -> Self {
        Self { first, second }
    }

    fn rates(&self, theta: f64) -> Result<(f64, f64)> {
        check_theta(theta)?;
        let rho_1 = self.first.rho(theta)?;
        let rho_2 = self.second.rho(theta)?;
        for (name, rho) in [("first service rho", rho_1), ("second service rho", rho_2)] {
            if rho.is_nan() || rho >= 0.0 {
                return Err(Error::out_of_bounds(name, rho, "service rho must be < 0"));
            }
        }
        Ok((rho_1, rho_2))
    }
}

/// `ln sup_{t>=0} (t+1)·e^{-u t}`.
fn tie_correction(u: f64) -> Result<f64> {
    if u <= 0.0 {
        return Err(NumericError::Domain {
            function: "tie correction",
            argument: u,
        }
        .into());
    }
    if u >= 1.0 {
        return Ok(0.0);
    }
    let value = u - 1.0 - u.ln();
    if value.is_infinite() {
        return Err(NumericError::Overflow { exponent: value }.into());
    }
    Ok(value)
}

impl<S1: Service, S2: Service> Process for Convolve<S1, S2> {
    fn sigma(&self, theta: f64) -> Result<f64> {
        let (rho_1, rho_2) = self.rates(theta)?;
        let bursts = self.first.sigma(theta)? + self.second.sigma(theta)?;

        if is_equal(rho_1, rho_2) {
            let delta = TIE_RATE_SLACK * rho_1.max(rho_2).abs();
            return Ok(bursts + tie_correction(theta * delta)? / theta);
        }

        let gap = (rho_1 - rho_2).abs();
        Ok(bursts + neg_log1m_exp(-theta * gap)? / theta)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        let (rho_1, rho_2) = self.rates(theta)?;
        if is_equal(rho_1, rho_2) {
            let rho = rho_1.max(rho_2);
            return Ok(rho + TIE_RATE_SLACK * rho.abs());
        }
        Ok(rho_1.max(rho_2))
    }
}

impl<S1: Service, S2: Service> Service for Convolve<S1, S2> {}
