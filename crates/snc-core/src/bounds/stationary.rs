//! Stationary bounds, valid inside the stability region.
//!
//! Each function checks stability at `lθ` before computing anything. A
//! collapsed denominator surfaces as `DivisionByZero`, an overflowing
//! numerator as `Overflow`.

use super::{check_target, finite_bound, ScaledTerms};
use crate::lyapunov::Lyapunov;
use crate::process::{Arrival, Service};
use snc_common::{Error, Result};
use snc_math::{mgf, one_minus_exp_root, ratio};

/// Stable terms plus the denominator `D = (1 - e^{lθ·ρ_l})^{1/l}`.
fn stable_terms<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    l: Lyapunov,
) -> Result<(ScaledTerms, f64)>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    let terms = ScaledTerms::new(arrival, service, theta, l)?;
    terms.require_stable()?;
    let denominator = one_minus_exp_root(terms.l_theta * terms.rho_l(), terms.l)?;
    Ok((terms, denominator))
}

fn check_probability(value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::out_of_bounds("prob", value, "must be in (0, 1]"))
    }
}

/// Output bound over a window of `delta_time` slots.
///
/// `e^{θ(ρa·Δt + σ_l)} / D`
pub fn output<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    delta_time: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("delta_time", delta_time)?;
    let (t, den) = stable_terms(arrival, service, theta, l)?;
    let numerator = mgf(theta, t.rho_a * delta_time + t.sigma_l)?;
    finite_bound(ratio(numerator, den, "output bound")?, "output bound")
}

/// Output bound for slotted time, where a window of `Δt` covers `Δt + 1`
/// arrival slots.
pub fn output_discretized<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    delta_time: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("delta_time", delta_time)?;
    output(arrival, service, theta, delta_time + 1.0, l)
}

/// Probability that the delay exceeds `delay_value`.
///
/// `e^{θ(ρs·d + σ_l)} / D`
pub fn delay_prob<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    delay_value: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("delay", delay_value)?;
    let (t, den) = stable_terms(arrival, service, theta, l)?;
    let numerator = mgf(theta, t.rho_s * delay_value + t.sigma_l)?;
    finite_bound(ratio(numerator, den, "delay probability bound")?, "delay probability bound")
}

/// Probability that the backlog exceeds `backlog_value`.
///
/// `e^{θ(σ_l - b)} / D`
pub fn backlog_prob<A, S>(
    arrival: &A,
    service: &S,
    theta: f64,
    backlog_value: f64,
    l: Lyapunov,
) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_target("backlog", backlog_value)?;
    let (t, den) = stable_terms(arrival, service, theta, l)?;
    let numerator = mgf(theta, t.sigma_l - backlog_value)?;
    finite_bound(ratio(numerator, den, "backlog probability bound")?, "backlog probability bound")
}

/// Delay that is exceeded with probability at most `prob`.
///
/// Inverts [`delay_prob`]: `max(0, (ln(p·D)/θ - σ_l) / ρs)`.
pub fn delay<A, S>(arrival: &A, service: &S, theta: f64, prob: f64, l: Lyapunov) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_probability(prob)?;
    let (t, den) = stable_terms(arrival, service, theta, l)?;
    let log_target = (prob * den).ln() / theta;
    finite_bound(ratio(log_target - t.sigma_l, t.rho_s, "delay bound")?, "delay bound")
}

/// Backlog that is exceeded with probability at most `prob`.
///
/// Inverts [`backlog_prob`]: `max(0, σ_l - ln(p·D)/θ)`.
pub fn backlog<A, S>(arrival: &A, service: &S, theta: f64, prob: f64, l: Lyapunov) -> Result<f64>
where
    A: Arrival + ?Sized,
    S: Service + ?Sized,
{
    check_probability(prob)?;
    let (t, den) = stable_terms(arrival, service, theta, l)?;
    finite_bound(t.sigma_l - (prob * den).ln() / theta, "backlog bound")
}
