//! Arrival distributions with a (σ, ρ) description.

use super::{check_count, check_non_negative, check_positive, check_theta, Arrival, Process};
use serde::{Deserialize, Serialize};
use snc_common::{Error, Result};

/// Aggregate of `n` independent flows with exponentially distributed
/// per-slot increments of rate `lambda`.
///
/// `rho(θ) = (n/θ)·ln(λ / (λ - θ))`, defined for `θ < λ`; `sigma = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialArrival {
    lambda: f64,
    n: u32,
}

impl ExponentialArrival {
    pub fn new(lambda: f64, n: u32) -> Result<Self> {
        check_positive("lambda", lambda)?;
        check_count(n)?;
        Ok(Self { lambda, n })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn n(&self) -> u32 {
        self.n
    }
}

impl Process for ExponentialArrival {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(0.0)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        if theta >= self.lambda {
            return Err(Error::out_of_bounds(
                "theta",
                theta,
                format!("must be < lambda = {}", self.lambda),
            ));
        }
        Ok(f64::from(self.n) / theta * (self.lambda / (self.lambda - theta)).ln())
    }
}

impl Arrival for ExponentialArrival {}

/// `n` flows each sending exactly `rate` per slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeterministicArrival {
    rate: f64,
    n: u32,
}

impl DeterministicArrival {
    pub fn new(rate: f64, n: u32) -> Result<Self> {
        check_non_negative("rate", rate)?;
        check_count(n)?;
        Ok(Self { rate, n })
    }
}

impl Process for DeterministicArrival {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(0.0)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(f64::from(self.n) * self.rate)
    }
}

impl Arrival for DeterministicArrival {}

/// Aggregate of `n` token-bucket regulated flows, each with burst
/// `sigma_single` and sustained rate `rho_single`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBucket {
    sigma_single: f64,
    rho_single: f64,
    n: u32,
}

impl TokenBucket {
    pub fn new(sigma_single: f64, rho_single: f64, n: u32) -> Result<Self> {
        check_non_negative("sigma_single", sigma_single)?;
        check_non_negative("rho_single", rho_single)?;
        check_count(n)?;
        Ok(Self {
            sigma_single,
            rho_single,
            n,
        })
    }

    pub fn sigma_single(&self) -> f64 {
        self.sigma_single
    }

    pub fn rho_single(&self) -> f64 {
        self.rho_single
    }

    pub fn n(&self) -> u32 {
        self.n
    }
}

impl Process for TokenBucket {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(f64::from(self.n) * self.sigma_single)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(f64::from(self.n) * self.rho_single)
    }
}

impl Arrival for TokenBucket {}
