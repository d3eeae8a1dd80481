use super::Setting;
use crate::bounds;
use crate::lyapunov::Lyapunov;
use crate::operations::{Convolve, Leftover};
use crate::process::{SharedArrival, SharedService};
use snc_common::{Error, PerformParameter, Result};
use std::sync::Arc;

/// Separated flow analysis of a tandem line.
///
/// The flow of interest `arrivals[0]` crosses every server. Cross flow
/// `i + 1` is served ahead of it at `servers[i]` only, so the net service
/// is the convolution of the per-hop leftovers.
#[derive(Debug, Clone)]
pub struct TandemSfa {
    foi: SharedArrival,
    net: SharedService,
    perform: PerformParameter,
}

impl TandemSfa {
    pub fn new(
        arrivals: Vec<SharedArrival>,
        servers: Vec<SharedService>,
        perform: PerformParameter,
    ) -> Result<Self> {
        if servers.is_empty() || arrivals.len() != servers.len() + 1 {
            return Err(Error::ListLengthMismatch {
                topology: "tandem",
                expected: "one more arrival than servers, at least one server",
                arrivals: arrivals.len(),
                servers: servers.len(),
            });
        }

        let leftover = |i: usize| -> SharedService {
            Arc::new(Leftover::new(arrivals[i + 1].clone(), servers[i].clone()))
        };
        let mut net = leftover(0);
        for i in 1..servers.len() {
            net = Arc::new(Convolve::new(net, leftover(i)));
        }

        Ok(Self {
            foi: arrivals[0].clone(),
            net,
            perform,
        })
    }
}

impl Setting for TandemSfa {
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64> {
        bounds::evaluate(&self.foi, &self.net, theta, &self.perform, l)
    }

    fn perform_param(&self) -> &PerformParameter {
        &self.perform
    }

    fn name(&self) -> &'static str {
        "tandem"
    }
}
