use super::Setting;
use crate::bounds;
use crate::lyapunov::Lyapunov;
use crate::operations::{Convolve, Leftover};
use crate::process::{SharedArrival, SharedService};
use snc_common::{Error, PerformParameter, Result};
use std::sync::Arc;

/// Sink tree analysed with pay-multiplexing-only-once.
///
/// The flow of interest `arrivals[0]` enters at `servers[0]`; cross flow
/// `i + 1` joins at `servers[i]` and travels with it to the sink. The
/// residual service is built from the sink backwards:
/// `e_last = Leftover(arr[n], ser[n-1])` and
/// `e_i = Leftover(arr[i+1], ser[i] ⊗ e_{i+1})`.
#[derive(Debug, Clone)]
pub struct SinkTreePmoo {
    foi: SharedArrival,
    net: SharedService,
    perform: PerformParameter,
}

impl SinkTreePmoo {
    pub fn new(
        arrivals: Vec<SharedArrival>,
        servers: Vec<SharedService>,
        perform: PerformParameter,
    ) -> Result<Self> {
        let n = servers.len();
        if n == 0 || arrivals.len() != n + 1 {
            return Err(Error::ListLengthMismatch {
                topology: "sink_tree",
                expected: "one more arrival than servers, at least one server",
                arrivals: arrivals.len(),
                servers: n,
            });
        }

        let mut net: SharedService =
            Arc::new(Leftover::new(arrivals[n].clone(), servers[n - 1].clone()));
        for i in (0..n - 1).rev() {
            let path: SharedService = Arc::new(Convolve::new(servers[i].clone(), net));
            net = Arc::new(Leftover::new(arrivals[i + 1].clone(), path));
        }

        Ok(Self {
            foi: arrivals[0].clone(),
            net,
            perform,
        })
    }
}

impl Setting for SinkTreePmoo {
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64> {
        bounds::evaluate(&self.foi, &self.net, theta, &self.perform, l)
    }

    fn perform_param(&self) -> &PerformParameter {
        &self.perform
    }

    fn name(&self) -> &'static str {
        "sink_tree"
    }
}
