use super::Setting;
use crate::bounds;
use crate::lyapunov::Lyapunov;
use crate::operations::{Convolve, Leftover};
use crate::process::{SharedArrival, SharedService};
use snc_common::{Error, PerformParameter, Result};
use std::sync::Arc;

/// A flow crossing `n` servers, each shared with one cross flow.
///
/// `arrivals[0]` is the flow of interest and runs alone through
/// `servers[0]`. Cross flow `i` joins at `servers[i]` and leaves after it.
#[derive(Debug, Clone)]
pub struct FatCross {
    foi: SharedArrival,
    net: SharedService,
    perform: PerformParameter,
    hops: usize,
}

impl FatCross {
    pub fn new(
        arrivals: Vec<SharedArrival>,
        servers: Vec<SharedService>,
        perform: PerformParameter,
    ) -> Result<Self> {
        if arrivals.is_empty() || arrivals.len() != servers.len() {
            return Err(Error::ListLengthMismatch {
                topology: "fat_cross",
                expected: "equally many arrivals and servers, at least one",
                arrivals: arrivals.len(),
                servers: servers.len(),
            });
        }

        let mut net = servers[0].clone();
        for (cross, server) in arrivals.iter().zip(&servers).skip(1) {
            let leftover: SharedService = Arc::new(Leftover::new(cross.clone(), server.clone()));
            net = Arc::new(Convolve::new(net, leftover));
        }

        Ok(Self {
            foi: arrivals[0].clone(),
            net,
            perform,
            hops: servers.len(),
        })
    }

    pub fn hops(&self) -> usize {
        self.hops
    }
}

impl Setting for FatCross {
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64> {
        bounds::evaluate(&self.foi, &self.net, theta, &self.perform, l)
    }

    fn perform_param(&self) -> &PerformParameter {
        &self.perform
    }

    fn name(&self) -> &'static str {
        "fat_cross"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ConstantRateServer, ExponentialArrival, Process};
    use snc_common::PerformMetric;

    fn exp(lambda: f64) -> SharedArrival {
        Arc::new(ExponentialArrival::new(lambda, 1).unwrap())
    }

    fn cr(rate: f64) -> SharedService {
        Arc::new(ConstantRateServer::new(rate).unwrap())
    }

    fn delay_prob(value: f64) -> PerformParameter {
        PerformParameter::new(PerformMetric::DelayProb, value).unwrap()
    }

    fn two_hop() -> FatCross {
        FatCross::new(vec![exp(11.0), exp(9.0)], vec![cr(5.0), cr(4.0)], delay_prob(4.0)).unwrap()
    }

    #[test]
    fn two_hop_bound_is_finite_at_half() {
        let setting = two_hop();
        assert_eq!(setting.hops(), 2);
        let bound = setting.bound(0.5, Lyapunov::CLASSICAL).unwrap();
        assert!(bound.is_finite() && bound > 0.0, "{bound}");
    }

    #[test]
    fn one_hop_reduces_to_single_server() {
        let arrival = ExponentialArrival::new(2.0, 1).unwrap();
        let service = ConstantRateServer::new(1.0).unwrap();
        let setting =
            FatCross::new(vec![Arc::new(arrival)], vec![Arc::new(service)], delay_prob(3.0))
                .unwrap();
        let direct = bounds::delay_prob(&arrival, &service, 0.4, 3.0, Lyapunov::CLASSICAL).unwrap();
        assert_eq!(setting.bound(0.4, Lyapunov::CLASSICAL).unwrap(), direct);
    }

    #[test]
    fn net_service_rate_is_slowest_leftover() {
        let setting = two_hop();
        let cross_rho = ExponentialArrival::new(9.0, 1).unwrap().rho(0.5).unwrap();
        let expected = (-5.0f64).max(-4.0 + cross_rho);
        assert!((setting.net.rho(0.5).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn unequal_lists_rejected() {
        let err =
            FatCross::new(vec![exp(1.0)], vec![cr(2.0), cr(2.0)], delay_prob(1.0)).unwrap_err();
        assert!(matches!(err, Error::ListLengthMismatch { .. }));
        let err = FatCross::new(vec![], vec![], delay_prob(1.0)).unwrap_err();
        assert_eq!(err.code(), 32);
    }
}
