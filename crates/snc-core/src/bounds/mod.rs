//! Single-hop performance bounds.
//!
//! Two families share the Lyapunov-scaled terms at `lθ`:
//!
//! ```text
//! σ_l = σa(lθ) + σs(lθ)
//! ρ_l = ρa(lθ) + ρs(lθ)
//! D   = (1 - e^{lθ·ρ_l})^{1/l}
//! ```
//!
//! - [`stationary`]: valid only inside the stability region, rejected first
//!   otherwise
//! - [`time_indexed`]: finite-horizon forms with a three-way split on the
//!   arrival rate against the service rate
//!
//! [`evaluate`] dispatches on the performance metric.

pub mod stationary;
pub mod time_indexed;

pub use stationary::{backlog, backlog_prob, delay, delay_prob, output, output_discretized};
pub use time_indexed::{delay_prob_t, output_t};

use crate::lyapunov::Lyapunov;
use crate::process::{check_theta, Arrival, Service};
use snc_common::{Error, PerformMetric, PerformParameter, Result};
use snc_math::NumericError;

/// Arrival and service terms evaluated at `lθ`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaledTerms {
    pub theta: f64,
    pub l: f64,
    pub l_theta: f64,
    pub sigma_l: f64,
    pub rho_a: f64,
    pub rho_s: f64,
}

impl ScaledTerms {
    pub fn new<A, S>(arrival: &A, service: &S, theta: f64, l: Lyapunov) -> Result<Self>
    where
        A: Arrival + ?Sized,
        S: Service + ?Sized,
    {
        check_theta(theta)?;
        let l_theta = l.scale(theta);
        Ok(Self {
            theta,
            l: l.get(),
            l_theta,
            sigma_l: arrival.sigma(l_theta)? + service.sigma(l_theta)?,
            rho_a: arrival.rho(l_theta)?,
            rho_s: service.rho(l_theta)?,
        })
    }

    pub fn rho_l(&self) -> f64 {
        self.rho_a + self.rho_s
    }

    pub fn require_stable(&self) -> Result<()> {
        if self.rho_a < -self.rho_s {
            Ok(())
        } else {
            Err(Error::StabilityViolation {
                theta: self.l_theta,
                arrival_rho: self.rho_a,
                service_rate: -self.rho_s,
            })
        }
    }
}

/// Reject a time or delay target that is negative or not finite.
pub(crate) fn check_target(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::out_of_bounds(name, value, "must be finite and >= 0"))
    }
}

/// Final guard: a bound is a finite, non-negative number or an error.
pub(crate) fn finite_bound(value: f64, context: &'static str) -> Result<f64> {
    if value.is_nan() {
        return Err(NumericError::Domain {
            function: context,
            argument: value,
        }
        .into());
    }
    if value.is_infinite() {
        return Err(NumericError::Overflow { exponent: value }.into());
    }
    Ok(value.max(0.0))
}

/// Single-hop bound for `perform` at `(θ, l)`.
pub fn evaluate<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    perform: &PerformParameter,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    let value = perform.value();
    match perform.metric() {
        PerformMetric::Output => output(arrival, service, theta, value, l),
        PerformMetric::DelayProb => delay_prob(arrival, service, theta, value, l),
        PerformMetric::BacklogProb => backlog_prob(arrival, service, theta, value, l),
        PerformMetric::Delay => delay(arrival, service, theta, value, l),
        PerformMetric::Backlog => backlog(arrival, service, theta, value, l),
    }
}
