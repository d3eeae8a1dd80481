//! Fuzz target for bound evaluation on composed services.
//!
//! Whatever the parameters, a bound is either an error or a finite,
//! non-negative number. NaN and negative bounds are bugs.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snc_common::{LyapunovMode, PerformMetric, PerformParameter};
use snc_core::process::{ConstantRateServer, ExponentialArrival, TokenBucket};
use snc_core::topology::{FatCross, SinkTreePmoo, TandemSfa};
use snc_core::{Lyapunov, Setting, SharedArrival, SharedService};
use std::sync::Arc;

#[derive(Arbitrary, Debug)]
enum FuzzArrival {
    Exponential { lambda: f64, n: u8 },
    TokenBucket { sigma: f64, rho: f64, n: u8 },
}

#[derive(Arbitrary, Debug)]
enum FuzzTopology {
    FatCross,
    Tandem,
    SinkTree,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    topology: FuzzTopology,
    arrivals: Vec<FuzzArrival>,
    rates: Vec<f64>,
    metric: u8,
    target: f64,
    theta: f64,
    l: f64,
    strict: bool,
}

fn arrival(spec: &FuzzArrival) -> Option<SharedArrival> {
    Some(match *spec {
        FuzzArrival::Exponential { lambda, n } => {
            Arc::new(ExponentialArrival::new(lambda, u32::from(n)).ok()?)
        }
        FuzzArrival::TokenBucket { sigma, rho, n } => {
            Arc::new(TokenBucket::new(sigma, rho, u32::from(n)).ok()?)
        }
    })
}

fuzz_target!(|input: FuzzInput| {
    if input.arrivals.len() > 8 || input.rates.len() > 8 {
        return;
    }
    let Some(arrivals) = input.arrivals.iter().map(arrival).collect::<Option<Vec<_>>>() else {
        return;
    };
    let Some(servers) = input
        .rates
        .iter()
        .map(|&r| ConstantRateServer::new(r).ok().map(|s| Arc::new(s) as SharedService))
        .collect::<Option<Vec<_>>>()
    else {
        return;
    };

    let metric = match input.metric % 5 {
        0 => PerformMetric::Output,
        1 => PerformMetric::DelayProb,
        2 => PerformMetric::BacklogProb,
        3 => PerformMetric::Delay,
        _ => PerformMetric::Backlog,
    };
    let Ok(perform) = PerformParameter::new(metric, input.target) else {
        return;
    };
    let mode = if input.strict {
        LyapunovMode::Strict
    } else {
        LyapunovMode::Clamp
    };
    let Ok(l) = Lyapunov::new(input.l, mode) else {
        return;
    };

    let setting: Box<dyn Setting> = match input.topology {
        FuzzTopology::FatCross => match FatCross::new(arrivals, servers, perform) {
            Ok(s) => Box::new(s),
            Err(_) => return,
        },
        FuzzTopology::Tandem => match TandemSfa::new(arrivals, servers, perform) {
            Ok(s) => Box::new(s),
            Err(_) => return,
        },
        FuzzTopology::SinkTree => match SinkTreePmoo::new(arrivals, servers, perform) {
            Ok(s) => Box::new(s),
            Err(_) => return,
        },
    };

    if let Ok(bound) = setting.bound(input.theta, l) {
        assert!(bound.is_finite(), "non-finite bound {bound} for {input:?}");
        assert!(bound >= 0.0, "negative bound {bound} for {input:?}");
    }
});
