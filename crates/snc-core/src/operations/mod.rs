//! Composition operators over arrival and service processes.
//!
//! - [`Convolve`]: two services in series
//! - [`Leftover`]: residual service after a cross flow is served
//! - [`Deconvolve`]: output arrival after a service, Lyapunov-scaled
//!
//! Each operator is itself a [`Process`](crate::process::Process), so chains
//! compose recursively. Operators own their operands and evaluate lazily.

pub mod convolve;
pub mod deconvolve;
pub mod leftover;

pub use convolve::{Convolve, TIE_RATE_SLACK};
pub use deconvolve::Deconvolve;
pub use leftover::Leftover;

use crate::process::{Arrival, Service};
use snc_common::{Error, Result};

/// Check `arrival.rho(θ) < -service.rho(θ)` and return both rates.
pub fn check_stability<A, S>(arrival: &A, service: &S, theta: f64) -> Result<(f64, f64)>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    let rho_a = arrival.rho(theta)?;
    let rho_s = service.rho(theta)?;
    if rho_a < -rho_s {
        Ok((rho_a, rho_s))
    } else {
        Err(Error::StabilityViolation {
            theta,
            arrival_rho: rho_a,
            service_rate: -rho_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ConstantRateServer, DeterministicArrival};

    #[test]
    fn stability_holds_strictly() {
        let arr = DeterministicArrival::new(1.0, 1).unwrap();
        let ser = ConstantRateServer::new(2.0).unwrap();
        assert_eq!(check_stability(&arr, &ser, 1.0).unwrap(), (1.0, -2.0));
    }

    #[test]
    fn equal_rates_violate_stability() {
        let arr = DeterministicArrival::new(2.0, 1).unwrap();
        let ser = ConstantRateServer::new(2.0).unwrap();
        let err = check_stability(&arr, &ser, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::StabilityViolation { arrival_rho, service_rate, .. }
                if arrival_rho == 2.0 && service_rate == 2.0
        ));
        assert_eq!(err.code(), 11);
    }
}
