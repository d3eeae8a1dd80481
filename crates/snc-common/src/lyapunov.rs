//! Handling of Lyapunov (Hölder) exponents below one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with a Lyapunov exponent `l < 1`.
///
/// The bounds are only valid for `l >= 1`. Optimizers routinely step below
/// that, so the default resets such values to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyapunovMode {
    /// Reset `l < 1` to 1.
    #[default]
    Clamp,
    /// Reject `l < 1` as out of bounds.
    Strict,
}

impl LyapunovMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LyapunovMode::Clamp => "clamp",
            LyapunovMode::Strict => "strict",
        }
    }
}

impl fmt::Display for LyapunovMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LyapunovMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(LyapunovMode::Clamp),
            "strict" => Ok(LyapunovMode::Strict),
            other => Err(format!("unknown Lyapunov mode '{other}' (expected clamp or strict)")),
        }
    }
}
