//! Service elements.

use super::{check_positive, check_theta, Process, Service};
use serde::{Deserialize, Serialize};
use snc_common::Result;

/// Work-conserving server with a fixed rate per slot.
///
/// `sigma = 0`, `rho = -rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantRateServer {
    rate: f64,
}

impl ConstantRateServer {
    pub fn new(rate: f64) -> Result<Self> {
        check_positive("rate", rate)?;
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Process for ConstantRateServer {
    fn sigma(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(0.0)
    }

    fn rho(&self, theta: f64) -> Result<f64> {
        check_theta(theta)?;
        Ok(-self.rate)
    }
}

impl Service for ConstantRateServer {}
