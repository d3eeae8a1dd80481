use super::Setting;
use crate::bounds;
use crate::lyapunov::Lyapunov;
use crate::process::{SharedArrival, SharedService};
use snc_common::{PerformParameter, Result};

/// One arrival at one server.
#[derive(Debug, Clone)]
pub struct SingleServer {
    arrival: SharedArrival,
    service: SharedService,
    perform: PerformParameter,
}

impl SingleServer {
    pub fn new(arrival: SharedArrival, service: SharedService, perform: PerformParameter) -> Self {
        Self {
            arrival,
            service,
            perform,
        }
    }
}

impl Setting for SingleServer {
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64> {
        bounds::evaluate(&self.arrival, &self.service, theta, &self.perform, l)
    }

    fn perform_param(&self) -> &PerformParameter {
        &self.perform
    }

    fn name(&self) -> &'static str {
        "single_server"
    }
}
