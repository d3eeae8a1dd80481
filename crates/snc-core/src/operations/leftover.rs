//! Residual service left to a flow after a cross flow is served.

use super::check_stability;
use crate::process::{Arrival, Process, Service};
use snc_common::Result;

/// Service seen by a low-priority flow once `arrival` has been served by
/// `service`.
///
/// `rho = ρs + ρa`, `sigma = σs + σa`. Every evaluation first checks
/// `ρa < -ρs` and fails with a stability violation otherwise.
#[derive(Debug, Clone)]
pub struct Leftover<A, S> {
    arrival: A,
    service: S,
}

impl<A: Arrival, S: Service> Leftover<A, S> {
    pub fn new(arrival: A, service: S) -> Self {
        Self { arrival, service }
    }
}

impl<A: Arrival, S: Service> Process for Leftover<A, S> {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_stability(&self.arrival, &self.service, theta)?;
        Ok(self.service.sigma(theta)? + self.arrival.sigma(theta)?)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        let (rho_a, rho_s) = check_stability(&self.arrival, &self.service, theta)?;
        Ok(rho_s + rho_a)
    }
}

impl<A: Arrival, S: Service> Service for Leftover<A, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ConstantRateServer, ExponentialArrival, TokenBucket};
    use snc_common::Error;

    #[test]
    fn rho_is_sum_of_rates() {
        let arr = ExponentialArrival::new(9.0, 1).unwrap();
        let ser = ConstantRateServer::new(4.0).unwrap();
        let theta = 0.5;
        let left = Leftover::new(arr, ser);
        assert_eq!(left.rho(theta).unwrap(), -4.0 + arr.rho(theta).unwrap());
        assert_eq!(left.sigma(theta).unwrap(), 0.0);
    }

    #[test]
    fn sigma_adds_bursts() {
        let left = Leftover::new(
            TokenBucket::new(2.0, 0.5, 1).unwrap(),
            ConstantRateServer::new(1.0).unwrap(),
        );
        assert_eq!(left.sigma(1.0).unwrap(), 2.0);
        assert_eq!(left.rho(1.0).unwrap(), -0.5);
    }

    #[test]
    fn unstable_cross_flow_is_a_stability_violation() {
        let left = Leftover::new(
            TokenBucket::new(1.0, 3.0, 1).unwrap(),
            ConstantRateServer::new(2.0).unwrap(),
        );
        assert!(matches!(
            left.rho(1.0),
            Err(Error::StabilityViolation { .. })
        ));
        assert!(matches!(
            left.sigma(1.0),
            Err(Error::StabilityViolation { .. })
        ));
    }
}
