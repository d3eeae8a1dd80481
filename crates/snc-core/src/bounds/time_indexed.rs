//! Finite-horizon bounds.
//!
//! The sum over the horizon only telescopes to a closed form when the
//! arrival rate equals the service rate at `lθ`. Otherwise:
//! - arrival rate above service rate: the horizon is finite, so the direct
//!   formula with denominator `(1 - e^{-lθ·ρ_l})^{1/l}` still holds
//! - arrival rate below service rate: the stationary bound is tighter and
//!   is used instead

use super::{check_target, finite_bound, stationary, ScaledTerms};
use crate::lyapunov::Lyapunov;
use crate::process::{Arrival, Service};
use snc_common::{Error, Result};
use snc_math::{is_equal, mgf, one_minus_exp_root, ratio};

enum Regime {
    Critical,
    Overloaded,
    Stable,
}

fn regime(terms: &ScaledTerms) -> Regime {
    if is_equal(terms.rho_a, -terms.rho_s) {
        Regime::Critical
    } else if terms.rho_a > -terms.rho_s {
        Regime::Overloaded
    } else {
        Regime::Stable
    }
}

/// `(1 - e^{-lθ·ρ_l})^{1/l}` for `ρ_l > 0`.
fn overload_denominator(terms: &ScaledTerms) -> Result<f64> {
    Ok(one_minus_exp_root(-terms.l_theta * terms.rho_l(), terms.l)?)
}

/// Output bound between slot `ss` and slot `tt` (`tt >= ss`).
pub fn output_t<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    tt: f64,
    ss: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("tt", tt)?;
    check_target("ss", ss)?;
    if tt < ss {
        return Err(Error::out_of_bounds("ss", ss, format!("must not exceed tt = {tt}")));
    }

    let t = ScaledTerms::new(arrival, service, theta, l)?;
    match regime(&t) {
        Regime::Critical => {
            let head = mgf(theta, t.rho_a * (tt - ss) + t.sigma_l)?;
            finite_bound(head * (ss + 1.0).powf(1.0 / t.l), "output bound")
        }
        Regime::Overloaded => {
            let numerator = mgf(theta, t.rho_a * tt + t.rho_s * ss + t.sigma_l)?;
            let bound = ratio(numerator, overload_denominator(&t)?, "output bound")?;
            finite_bound(bound, "output bound")
        }
        Regime::Stable => stationary::output(arrival, service, theta, tt - ss, l),
    }
}

/// Probability that a packet arriving at slot `tt` is delayed beyond
/// `delay_value`.
pub fn delay_prob_t<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    delay_value: f64,
    tt: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("delay", delay_value)?;
    check_target("tt", tt)?;

    let t = ScaledTerms::new(arrival, service, theta, l)?;
    match regime(&t) {
        Regime::Critical => {
            let head = mgf(theta, t.rho_s * delay_value + t.sigma_l)?;
            finite_bound(head * (tt + 1.0).powf(1.0 / t.l), "delay probability bound")
        }
        Regime::Overloaded => {
            let numerator = mgf(theta, t.rho_a * tt + t.rho_s * (tt + delay_value) + t.sigma_l)?;
            let bound = ratio(numerator, overload_denominator(&t)?, "delay probability bound")?;
            finite_bound(bound, "delay probability bound")
        }
        Regime::Stable => stationary::delay_prob(arrival, service, theta, delay_value, l),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ConstantRateServer, DeterministicArrival, TokenBucket};
    use snc_common::LyapunovMode;

    fn pair(rate_a: f64, rate_s: f64) -> (TokenBucket, ConstantRateServer) {
        (
            TokenBucket::new(1.0, rate_a, 1).unwrap(),
            ConstantRateServer::new(rate_s).unwrap(),
        )
    }

    #[test]
    fn critical_output_uses_polynomial_factor() {
        let (arr, ser) = pair(2.0, 2.0);
        let l = Lyapunov::new(2.0, LyapunovMode::Strict).unwrap();
        let theta: f64 = 0.5;
        let v = output_t(&arr, &ser, theta, 6.0, 2.0, l).unwrap();
        let expected = (theta * (2.0 * 4.0 + 1.0)).exp() * 3.0f64.sqrt();
        assert!((v - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn overloaded_output_is_finite() {
        let (arr, ser) = pair(3.0, 2.0);
        let theta: f64 = 0.5;
        let v = output_t(&arr, &ser, theta, 4.0, 1.0, Lyapunov::CLASSICAL).unwrap();
        let expected =
            (theta * (3.0 * 4.0 - 2.0 * 1.0 + 1.0)).exp() / (1.0 - (-theta * 1.0).exp());
        assert!((v - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn overloaded_lyapunov_root_covers_whole_denominator() {
        let (arr, ser) = pair(3.0, 2.0);
        let l = Lyapunov::new(2.0, LyapunovMode::Strict).unwrap();
        let theta: f64 = 0.5;
        let v = output_t(&arr, &ser, theta, 4.0, 1.0, l).unwrap();
        // lθ = 1, ρ_l = 1: the root applies to (1 - e^{-1}), not to e^{-1} alone.
        let head = (theta * 11.0).exp();
        let expected = head / (1.0 - (-1.0f64).exp()).sqrt();
        assert!((v - expected).abs() / expected < 1e-12);
        let root_of_exp_only = head / (1.0 - (-1.0f64).exp().sqrt());
        assert!((v - root_of_exp_only).abs() / expected > 0.1);
    }

    #[test]
    fn stable_output_delegates_to_stationary() {
        let (arr, ser) = pair(1.0, 2.0);
        let l = Lyapunov::CLASSICAL;
        assert_eq!(
            output_t(&arr, &ser, 0.4, 7.0, 3.0, l).unwrap(),
            stationary::output(&arr, &ser, 0.4, 4.0, l).unwrap()
        );
    }

    #[test]
    fn critical_delay_prob_uses_horizon_factor() {
        let arr = DeterministicArrival::new(2.0, 1).unwrap();
        let ser = ConstantRateServer::new(2.0).unwrap();
        let theta: f64 = 0.3;
        let v = delay_prob_t(&arr, &ser, theta, 4.0, 3.0, Lyapunov::CLASSICAL).unwrap();
        let expected = (theta * -8.0).exp() * 4.0;
        assert!((v - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn overloaded_delay_prob_is_finite() {
        let (arr, ser) = pair(3.0, 2.0);
        let v = delay_prob_t(&arr, &ser, 0.5, 2.0, 5.0, Lyapunov::CLASSICAL).unwrap();
        assert!(v.is_finite() && v > 0.0);
    }

    #[test]
    fn stable_delay_prob_delegates_to_stationary() {
        let (arr, ser) = pair(1.0, 2.0);
        let l = Lyapunov::CLASSICAL;
        assert_eq!(
            delay_prob_t(&arr, &ser, 0.4, 5.0, 10.0, l).unwrap(),
            stationary::delay_prob(&arr, &ser, 0.4, 5.0, l).unwrap()
        );
    }

    #[test]
    fn reversed_window_rejected() {
        let (arr, ser) = pair(1.0, 2.0);
        let err = output_t(&arr, &ser, 0.4, 1.0, 3.0, Lyapunov::CLASSICAL).unwrap_err();
        assert_eq!(err.code(), 10);
    }
}
