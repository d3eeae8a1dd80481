//! Arrival and service processes in the (σ, ρ) representation.
//!
//! Every process exposes two functions of the free parameter θ:
//! - `sigma(θ)`: the burstiness term
//! - `rho(θ)`: the rate term (negative for services)
//!
//! Composition operators in [`crate::operations`] implement the same traits,
//! so arbitrarily deep chains can be built from the leaves defined here.

pub mod arrival;
pub mod service;

pub use arrival::{DeterministicArrival, ExponentialArrival, TokenBucket};
pub use service::ConstantRateServer;

use snc_common::{Error, Result};
use std::sync::Arc;

/// A process described by its (σ, ρ) exponential-moment bound.
pub trait Process: std::fmt::Debug + Send + Sync {
    /// Burstiness term at `theta`.
    fn sigma(&self, theta: f64) -> Result<f64>;

    /// Rate term at `theta`.
    fn rho(&self, theta: f64) -> Result<f64>;
}

/// Traffic entering a node.
pub trait Arrival: Process {}

/// Service offered by a node. `rho` is non-positive.
pub trait Service: Process {}

/// Shared, dynamically typed arrival.
pub type SharedArrival = Arc<dyn Arrival>;

/// Shared, dynamically typed service.
pub type SharedService = Arc<dyn Service>;

impl<P: Process + ?Sized> Process for Box<P> {
    fn sigma(&self, theta: f64) -> Result<f64> {
        (**self).sigma(theta)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        (**self).rho(theta)
    }
}

impl<P: Process + ?Sized> Process for Arc<P> {
    fn sigma(&self, theta: f64) -> Result<f64> {
        (**self).sigma(theta)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        (**self).rho(theta)
    }
}

impl<P: Process + ?Sized> Process for &P {
    fn sigma(&self, theta: f64) -> Result<f64> {
        (**self).sigma(theta)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        (**self).rho(theta)
    }
}

impl<A: Arrival + ?Sized> Arrival for Box<A> {}
impl<A: Arrival + ?Sized> Arrival for Arc<A> {}
impl<A: Arrival + ?Sized> Arrival for &A {}

impl<S: Service + ?Sized> Service for Box<S> {}
impl<S: Service + ?Sized> Service for Arc<S> {}
impl<S: Service + ?Sized> Service for &S {}

/// Reject θ that is not finite and strictly positive.
pub fn check_theta(theta: f64) -> Result<()> {
    if theta.is_finite() && theta > 0.0 {
        Ok(())
    } else {
        Err(Error::out_of_bounds("theta", theta, "must be finite and > 0"))
    }
}

/// Validate a strictly positive, finite rate-like parameter.
pub(crate) fn check_positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::out_of_bounds(parameter, value, "must be finite and > 0"))
    }
}

/// Validate a finite, non-negative parameter.
pub(crate) fn check_non_negative(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::out_of_bounds(parameter, value, "must be finite and >= 0"))
    }
}

/// Validate an aggregation count.
pub(crate) fn check_count(n: u32) -> Result<()> {
    if n >= 1 {
        Ok(())
    } else {
        Err(Error::out_of_bounds("n", f64::from(n), "at least one flow required"))
    }
}
