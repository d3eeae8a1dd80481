//! End-to-end bound scenarios and bound monotonicity.

use snc_common::{LyapunovMode, PerformMetric, PerformParameter};
use snc_config::{AnalysisConfig, OptMethod};
use snc_core::bounds::{
    backlog, backlog_prob, delay, delay_prob, delay_prob_t, output, output_t,
};
use snc_core::compare::compare_strategies;
use snc_core::logging::LogContext;
use snc_core::optimizer::{CostFunction, GridConfig, GridRange, SearchBudget, Strategy};
use snc_core::process::{ConstantRateServer, ExponentialArrival, TokenBucket};
use snc_core::topology::{optimize_setting, FatCross, SettingCost, SingleServer};
use snc_core::{Lyapunov, Setting};
use std::sync::Arc;

fn grid(low: f64, high: f64, step: f64) -> Strategy<1> {
    Strategy::GridSearch(GridConfig::new([GridRange::new(low, high, step)]))
}

fn perform(metric: PerformMetric, value: f64) -> PerformParameter {
    PerformParameter::new(metric, value).unwrap()
}

fn exp_single_server() -> SingleServer {
    SingleServer::new(
        Arc::new(ExponentialArrival::new(4.4, 1).unwrap()),
        Arc::new(ConstantRateServer::new(0.24).unwrap()),
        perform(PerformMetric::Output, 4.0),
    )
}

fn fat_cross() -> FatCross {
    FatCross::new(
        vec![
            Arc::new(ExponentialArrival::new(11.0, 1).unwrap()),
            Arc::new(ExponentialArrival::new(9.0, 1).unwrap()),
        ],
        vec![
            Arc::new(ConstantRateServer::new(5.0).unwrap()),
            Arc::new(ConstantRateServer::new(4.0).unwrap()),
        ],
        perform(PerformMetric::DelayProb, 4.0),
    )
    .unwrap()
}

fn token_bucket_server(n: u32) -> SingleServer {
    SingleServer::new(
        Arc::new(TokenBucket::new(7.0, 0.1, n).unwrap()),
        Arc::new(ConstantRateServer::new(6.0).unwrap()),
        perform(PerformMetric::DelayProb, 5.0),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn exponential_output_bound_is_finite() {
        let setting = exp_single_server();
        let result = optimize_setting(
            &setting,
            &grid(0.1, 4.0, 0.1),
            &SearchBudget::unlimited(),
            LyapunovMode::Clamp,
        )
        .unwrap();

        assert!(result.bound.is_finite(), "{:?}", result);
        assert!(result.bound > 0.0);
        // ρa(θ) crosses the server rate between θ = 0.4 and θ = 0.5.
        assert!(result.optimum.params[0] <= 0.4 + 1e-9);
    }

    #[test]
    fn fat_cross_is_finite_at_half() {
        let bound = fat_cross().bound(0.5, Lyapunov::CLASSICAL).unwrap();
        assert!(bound.is_finite());
        assert!(bound > 0.0 && bound < 1.0);
    }

    #[test]
    fn fat_cross_strategies_agree() {
        let config = AnalysisConfig::default();
        let methods = [
            OptMethod::GridSearch,
            OptMethod::PatternSearch,
            OptMethod::SimulatedAnnealing,
            OptMethod::Bfgs,
        ];
        let outcomes =
            compare_strategies(&fat_cross(), &methods, &config, &LogContext::new("run-test"))
                .unwrap();

        let logs: Vec<f64> = outcomes
            .iter()
            .map(|o| {
                assert!(o.is_feasible(), "{:?}", o);
                o.bound.ln()
            })
            .collect();
        let best = logs.iter().cloned().fold(f64::INFINITY, f64::min);
        for (o, log) in outcomes.iter().zip(&logs) {
            let rel = (log - best).abs() / best.abs();
            assert!(rel < 0.1, "{}: ln bound {} vs best {}", o.method, log, best);
        }
    }

    #[test]
    fn token_bucket_delay_probability() {
        let result = optimize_setting(
            &token_bucket_server(5),
            &grid(0.05, 20.0, 0.05),
            &SearchBudget::unlimited(),
            LyapunovMode::Clamp,
        )
        .unwrap();
        assert!(result.bound.is_finite() && result.bound > 0.0);
        // e^{5θ} / (1 - e^{-5.5θ}) is smallest near θ = 0.15 on this grid.
        assert!((result.bound - 3.768).abs() < 1e-2, "{}", result.bound);
    }

    #[test]
    fn token_bucket_overload_has_no_bound() {
        let setting = token_bucket_server(100);
        assert!(setting.bound(0.5, Lyapunov::CLASSICAL).is_err());

        let result = optimize_setting(
            &setting,
            &grid(0.05, 20.0, 0.05),
            &SearchBudget::unlimited(),
            LyapunovMode::Clamp,
        )
        .unwrap();
        assert_eq!(result.bound, f64::INFINITY);
        assert!(!result.optimum.is_feasible());
    }
}

// ============================================================================
// Monotonicity
// ============================================================================

mod monotonicity {
    use super::*;

    fn pair() -> (TokenBucket, ConstantRateServer) {
        (
            TokenBucket::new(2.0, 0.5, 2).unwrap(),
            ConstantRateServer::new(1.5).unwrap(),
        )
    }

    fn non_decreasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1] * (1.0 + 1e-12))
    }

    fn non_increasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[1] <= w[0] * (1.0 + 1e-12))
    }

    const THETA: f64 = 0.4;
    const L: Lyapunov = Lyapunov::CLASSICAL;

    #[test]
    fn output_grows_with_window() {
        let (arr, ser) = pair();
        let values: Vec<f64> = (0..10)
            .map(|t| output(&arr, &ser, THETA, f64::from(t), L).unwrap())
            .collect();
        assert!(non_decreasing(&values), "{values:?}");
    }

    #[test]
    fn time_indexed_output_grows_with_window() {
        let (arr, ser) = pair();
        let values: Vec<f64> = (0..10)
            .map(|t| output_t(&arr, &ser, THETA, 10.0 + f64::from(t), 10.0, L).unwrap())
            .collect();
        assert!(non_decreasing(&values), "{values:?}");
    }

    #[test]
    fn violation_probabilities_shrink_with_target() {
        let (arr, ser) = pair();
        let delays: Vec<f64> = (0..10)
            .map(|d| delay_prob(&arr, &ser, THETA, f64::from(d), L).unwrap())
            .collect();
        let delays_t: Vec<f64> = (0..10)
            .map(|d| delay_prob_t(&arr, &ser, THETA, f64::from(d), 20.0, L).unwrap())
            .collect();
        let backlogs: Vec<f64> = (0..10)
            .map(|b| backlog_prob(&arr, &ser, THETA, f64::from(b), L).unwrap())
            .collect();
        assert!(non_increasing(&delays), "{delays:?}");
        assert!(non_increasing(&delays_t), "{delays_t:?}");
        assert!(non_increasing(&backlogs), "{backlogs:?}");
    }

    #[test]
    fn quantiles_shrink_with_laxer_probability() {
        let (arr, ser) = pair();
        let probs = [1e-9, 1e-6, 1e-3, 0.01, 0.1, 0.5, 1.0];
        let delays: Vec<f64> = probs
            .iter()
            .map(|&p| delay(&arr, &ser, THETA, p, L).unwrap())
            .collect();
        let backlogs: Vec<f64> = probs
            .iter()
            .map(|&p| backlog(&arr, &ser, THETA, p, L).unwrap())
            .collect();
        assert!(non_increasing(&delays), "{delays:?}");
        assert!(non_increasing(&backlogs), "{backlogs:?}");
        assert!(delays.iter().chain(&backlogs).all(|v| *v >= 0.0));
    }
}

// ============================================================================
// Lyapunov modes
// ============================================================================

mod lyapunov_modes {
    use super::*;

    #[test]
    fn strict_mode_rejects_small_exponent() {
        let setting = fat_cross();
        let strict = SettingCost::new(&setting, LyapunovMode::Strict);
        assert!(CostFunction::<2>::evaluate(&strict, &[0.5, 0.5]).is_err());
        assert!(CostFunction::<2>::evaluate(&strict, &[0.5, 2.0]).is_ok());
    }

    #[test]
    fn clamp_mode_resets_small_exponent() {
        let setting = fat_cross();
        let clamp = SettingCost::new(&setting, LyapunovMode::Clamp);
        let below = CostFunction::<2>::evaluate(&clamp, &[0.5, 0.5]).unwrap();
        let classical = CostFunction::<1>::evaluate(&clamp, &[0.5]).unwrap();
        assert_eq!(below, classical);
    }

    #[test]
    fn two_parameter_grid_never_loses_to_classical() {
        let setting = fat_cross();
        let one = optimize_setting(
            &setting,
            &grid(0.1, 10.0, 0.1),
            &SearchBudget::unlimited(),
            LyapunovMode::Strict,
        )
        .unwrap();
        let two = optimize_setting(
            &setting,
            &Strategy::GridSearch(GridConfig::new([
                GridRange::new(0.1, 10.0, 0.1),
                GridRange::new(1.0, 3.0, 0.5),
            ])),
            &SearchBudget::unlimited(),
            LyapunovMode::Strict,
        )
        .unwrap();
        assert!(two.bound <= one.bound * (1.0 + 1e-9));
    }
}
