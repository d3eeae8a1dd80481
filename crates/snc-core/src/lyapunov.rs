//! Validated Lyapunov (Hölder) exponent.

use crate::logging::event_names;
use serde::Serialize;
use snc_common::{Error, LyapunovMode, Result};

/// Lyapunov exponent `l >= 1` used to scale θ in the bound families.
///
/// `l = 1` gives the classical bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Lyapunov(f64);

impl Lyapunov {
    /// The classical exponent.
    pub const CLASSICAL: Lyapunov = Lyapunov(1.0);

    /// Build an exponent, applying `mode` to values below one.
    pub fn new(l: f64, mode: LyapunovMode) -> Result<Self> {
        if !l.is_finite() {
            return Err(Error::out_of_bounds("l", l, "must be finite"));
        }
        if l >= 1.0 {
            return Ok(Lyapunov(l));
        }
        match mode {
            LyapunovMode::Clamp => {
                tracing::trace!(
                    target: event_names::LYAPUNOV_CLAMPED,
                    requested = l,
                    "clamping Lyapunov exponent to 1"
                );
                Ok(Self::CLASSICAL)
            }
            LyapunovMode::Strict => Err(Error::out_of_bounds("l", l, "must be >= 1")),
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// `l·θ`, the argument every Lyapunov-scaled term is evaluated at.
    pub fn scale(self, theta: f64) -> f64 {
        self.0 * theta
    }
}

impl Default for Lyapunov {
    fn default() -> Self {
        Self::CLASSICAL
    }
}

impl std::fmt::Display for Lyapunov {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_resets_below_one() {
        let l = Lyapunov::new(0.4, LyapunovMode::Clamp).unwrap();
        assert_eq!(l, Lyapunov::CLASSICAL);
        assert_eq!(l.get(), 1.0);
    }

    #[test]
    fn strict_rejects_below_one() {
        let err = Lyapunov::new(0.4, LyapunovMode::Strict).unwrap_err();
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn both_modes_accept_valid_values() {
        for mode in [LyapunovMode::Clamp, LyapunovMode::Strict] {
            assert_eq!(Lyapunov::new(2.5, mode).unwrap().get(), 2.5);
            assert_eq!(Lyapunov::new(1.0, mode).unwrap().get(), 1.0);
        }
    }

    #[test]
    fn nan_and_infinite_rejected_in_every_mode() {
        for mode in [LyapunovMode::Clamp, LyapunovMode::Strict] {
            assert!(Lyapunov::new(f64::NAN, mode).is_err());
            assert!(Lyapunov::new(f64::INFINITY, mode).is_err());
        }
    }

    #[test]
    fn scale_multiplies_theta() {
        let l = Lyapunov::new(2.0, LyapunovMode::Strict).unwrap();
        assert_eq!(l.scale(0.25), 0.5);
    }
}
