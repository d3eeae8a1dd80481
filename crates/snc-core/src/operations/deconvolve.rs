//! Output arrival of a flow after it traverses a service.

use crate::lyapunov::Lyapunov;
use crate::process::{check_theta, Arrival, Process, Service};
use snc_common::{Error, Result};
use snc_math::neg_log1m_exp;

/// Departure process of `arrival` after `service`, with the Lyapunov
/// exponent `l` scaling θ. `l = 1` is the classical deconvolution.
///
/// With `lθ = l·θ`:
/// - `rho(θ) = ρa(lθ)`
/// - `sigma(θ) = σa(lθ) + σs(lθ) - ln(1 - e^{lθ(ρa + ρs)}) / (lθ)`
///
/// The correction term diverges at the stability boundary; that blow-up is
/// reported as a numeric overflow.
#[derive(Debug, Clone)]
pub struct Deconvolve<A, S> {
    arrival: A,
    service: S,
    l: Lyapunov,
}

impl<A: Arrival, S: Service> Deconvolve<A, S> {
    pub fn new(arrival: A, service: S, l: Lyapunov) -> Self {
        Self {
            arrival,
            service,
            l,
        }
    }

    pub fn lyapunov(&self) -> Lyapunov {
        self.l
    }

    /// Rates at `lθ` after the sign and stability preconditions.
    fn rates(&self, l_theta: f64) -> Result<(f64, f64)> {
        let rho_a = self.arrival.rho(l_theta)?;
        let rho_s = self.service.rho(l_theta)?;
        if rho_a < 0.0 {
            return Err(Error::out_of_bounds("arrival rho", rho_a, "must be >= 0"));
        }
        if rho_s > 0.0 {
            return Err(Error::out_of_bounds("service rho", rho_s, "must be <= 0"));
        }
        if rho_a >= -rho_s {
            return Err(Error::StabilityViolation {
                theta: l_theta,
                arrival_rho: rho_a,
                service_rate: -rho_s,
            });
        }
        Ok((rho_a, rho_s))
    }
}

impl<A: Arrival, S: Service> Process for Deconvolve<A, S> {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        let l_theta = self.l.scale(theta);
        let (rho_a, rho_s) = self.rates(l_theta)?;
        let correction = neg_log1m_exp(l_theta * (rho_a + rho_s))? / l_theta;
        Ok(self.arrival.sigma(l_theta)? + self.service.sigma(l_theta)? + correction)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        let (rho_a, _) = self.rates(self.l.scale(theta))?;
        Ok(rho_a)
    }
}

impl<A: Arrival, S: Service> Arrival for Deconvolve<A, S> {}
