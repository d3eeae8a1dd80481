//! Network topologies reduced to a single-hop bound.
//!
//! Each setting holds the flow of interest and the net service it sees,
//! assembled once from the arrival and server lists. The bound at `(θ, l)`
//! is then a single-hop evaluation.

mod fat_cross;
mod single_server;
mod sink_tree;
mod tandem;

pub use fat_cross::FatCross;
pub use single_server::SingleServer;
pub use sink_tree::SinkTreePmoo;
pub use tandem::TandemSfa;

use crate::lyapunov::Lyapunov;
use crate::optimizer::{minimize, CostFunction, Optimum, SearchBudget, Strategy};
use crate::process::{
    ConstantRateServer, DeterministicArrival, ExponentialArrival, SharedArrival, SharedService,
    TokenBucket,
};
use snc_common::{Error, LyapunovMode, PerformParameter, Result};
use snc_config::{ArrivalSpec, ScenarioSpec, ServiceSpec, TopologyKind};
use snc_math::log_bound;
use std::sync::Arc;

/// A topology with a performance target.
pub trait Setting: std::fmt::Debug + Send + Sync {
    /// Bound on the target at `(θ, l)`.
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64>;

    fn perform_param(&self) -> &PerformParameter;

    /// Short topology name for logs and reports.
    fn name(&self) -> &'static str;
}

impl<S: Setting + ?Sized> Setting for Box<S> {
    fn bound(&self, theta: f64, l: Lyapunov) -> Result<f64> {
        (**self).bound(theta, l)
    }

    fn perform_param(&self) -> &PerformParameter {
        (**self).perform_param()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Adapts a [`Setting`] to the optimizer.
///
/// Probability and output bounds span hundreds of orders of magnitude, so
/// they are minimized as `ln(bound)`. Delay and backlog bounds are
/// minimized as they are. The argmin is the same either way.
#[derive(Debug, Clone, Copy)]
pub struct SettingCost<'a, S: ?Sized> {
    setting: &'a S,
    mode: LyapunovMode,
}

impl<'a, S: Setting + ?Sized> SettingCost<'a, S> {
    pub fn new(setting: &'a S, mode: LyapunovMode) -> Self {
        Self { setting, mode }
    }

    fn scaled(&self, bound: f64) -> f64 {
        if self.setting.perform_param().metric().optimized_in_log_space() {
            log_bound(bound)
        } else {
            bound
        }
    }
}

impl<S: Setting + ?Sized> CostFunction<1> for SettingCost<'_, S> {
    fn evaluate(&self, params: &[f64; 1]) -> Result<f64> {
        let bound = self.setting.bound(params[0], Lyapunov::CLASSICAL)?;
        Ok(self.scaled(bound))
    }
}

impl<S: Setting + ?Sized> CostFunction<2> for SettingCost<'_, S> {
    fn evaluate(&self, params: &[f64; 2]) -> Result<f64> {
        let l = Lyapunov::new(params[1], self.mode)?;
        let bound = self.setting.bound(params[0], l)?;
        Ok(self.scaled(bound))
    }
}

/// The tightest bound a search found for a setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingOptimum<const N: usize> {
    /// Bound on its natural scale, `+∞` when no feasible point was found.
    pub bound: f64,
    /// Raw search result; `value` is on the cost scale.
    pub optimum: Optimum<N>,
}

/// Minimize the bound of `setting` over `[θ]` or `[θ, l]`.
pub fn optimize_setting<S, const N: usize>(
    setting: &S,
    strategy: &Strategy<N>,
    budget: &SearchBudget,
    mode: LyapunovMode,
) -> Result<SettingOptimum<N>>
where
    S: Setting + ?Sized,
    for<'a> SettingCost<'a, S>: CostFunction<N>,
{
    let cost = SettingCost::new(setting, mode);
    let optimum = minimize(&cost, strategy, budget)?;
    let bound = if optimum.is_feasible() {
        natural_bound(setting, &optimum.params, mode).unwrap_or(f64::INFINITY)
    } else {
        f64::INFINITY
    };
    Ok(SettingOptimum { bound, optimum })
}

fn natural_bound<S: Setting + ?Sized>(
    setting: &S,
    params: &[f64],
    mode: LyapunovMode,
) -> Result<f64> {
    let l = match params.get(1) {
        Some(&l) => Lyapunov::new(l, mode)?,
        None => Lyapunov::CLASSICAL,
    };
    setting.bound(params[0], l)
}

// ── Construction from scenario files ────────────────────────────────

fn build_arrival(spec: &ArrivalSpec) -> Result<SharedArrival> {
    Ok(match *spec {
        ArrivalSpec::Exponential { lambda, n } => Arc::new(ExponentialArrival::new(lambda, n)?),
        ArrivalSpec::Deterministic { rate, n } => Arc::new(DeterministicArrival::new(rate, n)?),
        ArrivalSpec::TokenBucket {
            sigma_single,
            rho_single,
            n,
        } => Arc::new(TokenBucket::new(sigma_single, rho_single, n)?),
    })
}

fn build_service(spec: &ServiceSpec) -> Result<SharedService> {
    Ok(match *spec {
        ServiceSpec::ConstantRate { rate } => Arc::new(ConstantRateServer::new(rate)?),
    })
}

/// Build the setting described by a scenario file.
pub fn build_setting(scenario: &ScenarioSpec) -> Result<Box<dyn Setting>> {
    let arrivals = scenario
        .arrivals
        .iter()
        .map(build_arrival)
        .collect::<Result<Vec<_>>>()?;
    let servers = scenario
        .servers
        .iter()
        .map(build_service)
        .collect::<Result<Vec<_>>>()?;
    let perform = scenario.perform;

    Ok(match scenario.topology {
        TopologyKind::SingleServer => {
            if arrivals.len() != 1 || servers.len() != 1 {
                return Err(Error::ListLengthMismatch {
                    topology: "single_server",
                    expected: "exactly one arrival and one server",
                    arrivals: arrivals.len(),
                    servers: servers.len(),
                });
            }
            Box::new(SingleServer::new(
                arrivals[0].clone(),
                servers[0].clone(),
                perform,
            ))
        }
        TopologyKind::FatCross => Box::new(FatCross::new(arrivals, servers, perform)?),
        TopologyKind::Tandem => Box::new(TandemSfa::new(arrivals, servers, perform)?),
        TopologyKind::SinkTree => Box::new(SinkTreePmoo::new(arrivals, servers, perform)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{GridConfig, GridRange};
    use snc_common::PerformMetric;

    fn single(metric: PerformMetric, value: f64) -> SingleServer {
        SingleServer::new(
            Arc::new(TokenBucket::new(7.0, 0.1, 5).unwrap()),
            Arc::new(ConstantRateServer::new(6.0).unwrap()),
            PerformParameter::new(metric, value).unwrap(),
        )
    }

    #[test]
    fn probability_bounds_optimized_in_log_space() {
        let setting = single(PerformMetric::DelayProb, 5.0);
        let cost = SettingCost::new(&setting, LyapunovMode::Clamp);
        let raw = setting.bound(0.2, Lyapunov::CLASSICAL).unwrap();
        let scaled = CostFunction::<1>::evaluate(&cost, &[0.2]).unwrap();
        assert!((scaled - raw.ln()).abs() < 1e-12);
    }

    #[test]
    fn delay_bounds_optimized_directly() {
        let setting = single(PerformMetric::Delay, 1e-6);
        let cost = SettingCost::new(&setting, LyapunovMode::Clamp);
        let raw = setting.bound(0.2, Lyapunov::CLASSICAL).unwrap();
        assert_eq!(CostFunction::<1>::evaluate(&cost, &[0.2]).unwrap(), raw);
    }

    #[test]
    fn strict_mode_rejects_small_l_in_cost() {
        let setting = single(PerformMetric::DelayProb, 5.0);
        let strict = SettingCost::new(&setting, LyapunovMode::Strict);
        let clamp = SettingCost::new(&setting, LyapunovMode::Clamp);
        assert!(CostFunction::<2>::evaluate(&strict, &[0.2, 0.5]).is_err());
        assert_eq!(
            CostFunction::<2>::evaluate(&clamp, &[0.2, 0.5]).unwrap(),
            CostFunction::<1>::evaluate(&clamp, &[0.2]).unwrap()
        );
    }

    #[test]
    fn optimize_setting_reports_natural_scale() {
        let setting = single(PerformMetric::DelayProb, 5.0);
        let strategy = Strategy::GridSearch(GridConfig::new([GridRange::new(0.05, 20.0, 0.05)]));
        let budget = SearchBudget::unlimited();
        let result = optimize_setting(&setting, &strategy, &budget, LyapunovMode::Clamp).unwrap();
        assert!((result.bound.ln() - result.optimum.value).abs() < 1e-9);
        assert!(result.bound > 3.0 && result.bound < 4.5, "{}", result.bound);
    }

    #[test]
    fn single_server_shape_enforced() {
        let scenario = ScenarioSpec {
            name: None,
            topology: TopologyKind::SingleServer,
            arrivals: vec![],
            servers: vec![ServiceSpec::ConstantRate { rate: 1.0 }],
            perform: PerformParameter::new(PerformMetric::Output, 4.0).unwrap(),
        };
        let err = build_setting(&scenario).unwrap_err();
        assert_eq!(err.code(), 32);
    }

    #[test]
    fn invalid_distribution_parameters_surface_at_build() {
        let scenario = ScenarioSpec {
            name: None,
            topology: TopologyKind::SingleServer,
            arrivals: vec![ArrivalSpec::Exponential { lambda: -1.0, n: 1 }],
            servers: vec![ServiceSpec::ConstantRate { rate: 1.0 }],
            perform: PerformParameter::new(PerformMetric::Output, 4.0).unwrap(),
        };
        assert_eq!(build_setting(&scenario).unwrap_err().code(), 10);
    }
}
