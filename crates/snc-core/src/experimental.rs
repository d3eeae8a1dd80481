//! Experimental traffic descriptions that do not fit the (σ, ρ) model.
//!
//! Fractional Brownian motion and Massoulié's regulated-flow MGF, plus
//! delay bounds for leaky-bucket regulated traffic built on the latter.
//! None of this is wired into the topologies; it exists to compare
//! alternative descriptions against the token bucket.

use crate::bounds::{check_target, finite_bound};
use crate::optimizer::{minimize, GridConfig, GridRange, Optimum, SearchBudget, Strategy};
use crate::process::{check_count, check_non_negative, check_positive, check_theta, Service};
use snc_common::{Error, Result};
use snc_math::{log_add_exp, log_sum_exp, mgf, neg_log1m_exp, ratio};

/// θ grid used by the leaky-bucket optimizers: `0.05..=20` in steps of `0.05`.
pub fn theta_grid() -> GridRange {
    GridRange::new(0.05, 20.0, 0.05)
}

/// MGF of fractional Brownian motion with drift `lambda`, scale `sigma` and
/// Hurst parameter `hurst` over `delta_time` slots:
/// `exp(λθΔ + ½(σθ)²·Δ^{2H})`.
pub fn fbm_mgf(theta: f64, delta_time: f64, lambda: f64, sigma: f64, hurst: f64) -> Result<f64> {
    check_theta(theta)?;
    check_non_negative("delta_time", delta_time)?;
    check_positive("sigma", sigma)?;
    if !lambda.is_finite() {
        return Err(Error::out_of_bounds("lambda", lambda, "must be finite"));
    }
    if !(hurst > 0.0 && hurst < 1.0) {
        return Err(Error::out_of_bounds("hurst", hurst, "must be in (0, 1)"));
    }
    let exponent = lambda * theta * delta_time
        + 0.5 * (sigma * theta).powi(2) * delta_time.powf(2.0 * hurst);
    Ok(mgf(1.0, exponent)?)
}

fn check_regulated(sigma_single: f64, rho_single: f64, n: u32) -> Result<()> {
    check_non_negative("sigma_single", sigma_single)?;
    check_non_negative("rho_single", rho_single)?;
    check_count(n)
}

/// `ln(1 + w·(e^{θn(σ+ρΔ)} - 1))` with `w = ρΔ / (σ + ρΔ)`.
fn ln_regulated_mgf(
    theta: f64,
    delta_time: u32,
    sigma_single: f64,
    rho_single: f64,
    n: u32,
) -> f64 {
    let rho_delta = rho_single * f64::from(delta_time);
    if rho_delta == 0.0 {
        return 0.0;
    }
    let burst = sigma_single + rho_delta;
    let weight = rho_delta / burst;
    let exponent = theta * f64::from(n) * burst;
    if weight >= 1.0 {
        return exponent;
    }
    // (1 - w) + w·e^x, in log space
    log_add_exp((1.0 - weight).ln(), weight.ln() + exponent)
}

/// Massoulié's MGF bound for `n` leaky-bucket regulated flows over
/// `delta_time` slots:
/// `1 + ρΔ/(σ+ρΔ)·(e^{θn(σ+ρΔ)} - 1)`.
pub fn regulated_mgf(
    theta: f64,
    delta_time: u32,
    sigma_single: f64,
    rho_single: f64,
    n: u32,
) -> Result<f64> {
    check_theta(theta)?;
    check_regulated(sigma_single, rho_single, n)?;
    let ln = ln_regulated_mgf(theta, delta_time, sigma_single, rho_single, n);
    Ok(mgf(1.0, ln)?)
}

/// Service terms plus `ln` of the bracket shared by both leaky-bucket
/// bounds: the token-bucket tail from slot `t` on and the regulated MGF for
/// the first `t` slots,
/// `e^{θ(σa + (ρa+ρs)t)} / (1 - e^{θ(ρa+ρs)}) + Σ_{j<t} M(j)·e^{θjρs}`.
fn leaky_bucket_terms<S>(
    theta: f64,
    sigma_single: f64,
    rho_single: f64,
    service: &S,
    t: u32,
    n: u32,
) -> Result<(f64, f64, f64)>
where
    S: Service + ?Sized,
{
    check_theta(theta)?;
    check_regulated(sigma_single, rho_single, n)?;
    let sigma_a = f64::from(n) * sigma_single;
    let rho_a = f64::from(n) * rho_single;
    let sigma_s = service.sigma(theta)?;
    let rho_s = service.rho(theta)?;
    if rho_a.is_nan() || rho_s.is_nan() || rho_a >= -rho_s {
        return Err(Error::StabilityViolation {
            theta,
            arrival_rho: rho_a,
            service_rate: -rho_s,
        });
    }

    let drift = rho_a + rho_s;
    let mut terms = Vec::with_capacity(t as usize + 1);
    terms.push(theta * (sigma_a + drift * f64::from(t)) + neg_log1m_exp(theta * drift)?);
    for j in 0..t {
        let ln_m = ln_regulated_mgf(theta, j, sigma_single, rho_single, n);
        terms.push(ln_m + theta * f64::from(j) * rho_s);
    }
    Ok((sigma_s, rho_s, log_sum_exp(&terms)))
}

/// Probability that the delay of `n` leaky-bucket flows exceeds `delay`.
pub fn leaky_bucket_delay_prob<S>(
    theta: f64,
    delay: f64,
    sigma_single: f64,
    rho_single: f64,
    service: &S,
    t: u32,
    n: u32,
) -> Result<f64>
where
    S: Service + ?Sized,
{
    check_target("delay", delay)?;
    let (sigma_s, rho_s, ln_sum) =
        leaky_bucket_terms(theta, sigma_single, rho_single, service, t, n)?;
    let value = mgf(1.0, theta * (sigma_s + rho_s * delay) + ln_sum)?;
    finite_bound(value, "leaky bucket delay probability")
}

/// Delay of `n` leaky-bucket flows exceeded with probability at most `prob`.
pub fn leaky_bucket_delay<S>(
    theta: f64,
    prob: f64,
    sigma_single: f64,
    rho_single: f64,
    service: &S,
    t: u32,
    n: u32,
) -> Result<f64>
where
    S: Service + ?Sized,
{
    if !(prob > 0.0 && prob <= 1.0) {
        return Err(Error::out_of_bounds("prob", prob, "must be in (0, 1]"));
    }
    let (sigma_s, rho_s, ln_sum) =
        leaky_bucket_terms(theta, sigma_single, rho_single, service, t, n)?;
    let numerator = -(theta * sigma_s - prob.ln() + ln_sum);
    let value = ratio(numerator, theta * rho_s, "leaky bucket delay")?;
    finite_bound(value, "leaky bucket delay")
}

fn grid_minimum<F>(cost: F) -> Result<Optimum<1>>
where
    F: Fn(&[f64; 1]) -> Result<f64>,
{
    let strategy = Strategy::GridSearch(GridConfig::new([theta_grid()]));
    minimize(&cost, &strategy, &SearchBudget::unlimited())
}

/// Smallest [`leaky_bucket_delay_prob`] over [`theta_grid`].
pub fn optimize_leaky_bucket_delay_prob<S>(
    delay: f64,
    sigma_single: f64,
    rho_single: f64,
    service: &S,
    t: u32,
    n: u32,
) -> Result<Optimum<1>>
where
    S: Service + ?Sized,
{
    check_target("delay", delay)?;
    check_regulated(sigma_single, rho_single, n)?;
    grid_minimum(|p: &[f64; 1]| {
        leaky_bucket_delay_prob(p[0], delay, sigma_single, rho_single, service, t, n)
    })
}

/// Smallest [`leaky_bucket_delay`] over [`theta_grid`].
pub fn optimize_leaky_bucket_delay<S>(
    prob: f64,
    sigma_single: f64,
    rho_single: f64,
    service: &S,
    t: u32,
    n: u32,
) -> Result<Optimum<1>>
where
    S: Service + ?Sized,
{
    if !(prob > 0.0 && prob <= 1.0) {
        return Err(Error::out_of_bounds("prob", prob, "must be in (0, 1]"));
    }
    check_regulated(sigma_single, rho_single, n)?;
    grid_minimum(|p: &[f64; 1]| {
        leaky_bucket_delay(p[0], prob, sigma_single, rho_single, service, t, n)
    })
}
