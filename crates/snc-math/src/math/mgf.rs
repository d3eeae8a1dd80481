//! Moment-generating-function helper and overflow-aware arithmetic.
//!
//! Every bound in the (σ, ρ) calculus is a product or quotient of terms of
//! the form `exp(θ·x)`. Near the stability boundary these terms overflow or
//! their denominators collapse to zero. Instead of returning `inf` silently,
//! the helpers here report a [`NumericError`] so callers can decide whether
//! the point is merely infeasible (optimizer loop) or a hard failure.

use serde::Serialize;
use thiserror::Error;

/// Largest exponent accepted by [`mgf`].
///
/// `ln(f64::MAX) ≈ 709.78`; anything above overflows to `inf`.
pub const MAX_EXPONENT: f64 = 709.0;

/// Default tolerance for comparing rate terms.
pub const EQUALITY_EPSILON: f64 = 1e-6;

/// Numeric failure while evaluating an exponential-moment expression.
#[derive(Error, Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericError {
    #[error("exponent {exponent} exceeds the representable range")]
    Overflow { exponent: f64 },

    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },

    #[error("{function} is undefined at {argument}")]
    Domain {
        function: &'static str,
        argument: f64,
    },
}

/// Moment-generating function `exp(theta * x)`.
///
/// Returns [`NumericError::Overflow`] when `theta * x > MAX_EXPONENT` and
/// [`NumericError::Domain`] when the product is NaN. Underflow to `0.0` is
/// fine and returned as is.
pub fn mgf(theta: f64, x: f64) -> Result<f64, NumericError> {
    let exponent = theta * x;
    if exponent.is_nan() {
        return Err(NumericError::Domain {
            function: "exp",
            argument: exponent,
        });
    }
    if exponent > MAX_EXPONENT {
        return Err(NumericError::Overflow { exponent });
    }
    Ok(exponent.exp())
}

/// Approximate equality with [`EQUALITY_EPSILON`].
pub fn is_equal(a: f64, b: f64) -> bool {
    is_equal_within(a, b, EQUALITY_EPSILON)
}

/// Approximate equality with an explicit absolute tolerance.
pub fn is_equal_within(a: f64, b: f64, epsilon: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() < epsilon
}

/// Checked quotient.
///
/// A zero denominator is reported as [`NumericError::DivisionByZero`], an
/// infinite quotient (denominator underflow) as [`NumericError::Overflow`].
pub fn ratio(numerator: f64, denominator: f64, context: &'static str) -> Result<f64, NumericError> {
    if denominator == 0.0 {
        return Err(NumericError::DivisionByZero { context });
    }
    let q = numerator / denominator;
    if q.is_nan() {
        return Err(NumericError::Domain {
            function: context,
            argument: denominator,
        });
    }
    if q.is_infinite() {
        return Err(NumericError::Overflow { exponent: f64::INFINITY });
    }
    Ok(q)
}

/// `-ln(1 - exp(x))` for `x < 0`.
///
/// Uses `expm1` close to zero and `ln_1p` far from it. The value diverges as
/// `x -> 0-`; an infinite result is reported as an overflow.
pub fn neg_log1m_exp(x: f64) -> Result<f64, NumericError> {
    if x.is_nan() || x >= 0.0 {
        return Err(NumericError::Domain {
            function: "ln(1 - exp(x))",
            argument: x,
        });
    }
    let value = if x > -std::f64::consts::LN_2 {
        -(-x.exp_m1()).ln()
    } else {
        -(-x.exp()).ln_1p()
    };
    if value.is_infinite() {
        return Err(NumericError::Overflow { exponent: x });
    }
    Ok(value)
}

/// `(1 - exp(x))^(1/l)` for `x < 0`, the shared denominator of stationary bounds.
pub fn one_minus_exp_root(x: f64, l: f64) -> Result<f64, NumericError> {
    let log_inner = -neg_log1m_exp(x)?;
    Ok((log_inner / l).exp())
}
