//! Performance metrics and their validated targets.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which performance bound to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformMetric {
    /// Delay exceeded with at most the target probability.
    Delay,
    /// Probability that the delay exceeds the target delay.
    DelayProb,
    /// Output MGF bound over the target time span.
    Output,
    /// Backlog exceeded with at most the target probability.
    Backlog,
    /// Probability that the backlog exceeds the target backlog.
    BacklogProb,
}

impl PerformMetric {
    pub const ALL: &'static [PerformMetric] = &[
        PerformMetric::Delay,
        PerformMetric::DelayProb,
        PerformMetric::Output,
        PerformMetric::Backlog,
        PerformMetric::BacklogProb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PerformMetric::Delay => "delay",
            PerformMetric::DelayProb => "delay_prob",
            PerformMetric::Output => "output",
            PerformMetric::Backlog => "backlog",
            PerformMetric::BacklogProb => "backlog_prob",
        }
    }

    /// True when the target value is a violation probability.
    pub fn target_is_probability(self) -> bool {
        matches!(self, PerformMetric::Delay | PerformMetric::Backlog)
    }

    /// True when the bound is an MGF or probability spanning many orders of
    /// magnitude, so it is optimized on the log scale.
    pub fn optimized_in_log_space(self) -> bool {
        matches!(
            self,
            PerformMetric::Output | PerformMetric::DelayProb | PerformMetric::BacklogProb
        )
    }
}

impl fmt::Display for PerformMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PerformMetric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| Error::Config(format!("unknown performance metric '{s}'")))
    }
}

/// A metric together with its target value.
///
/// The target is a probability in (0, 1] for [`PerformMetric::Delay`] and
/// [`PerformMetric::Backlog`], and a finite non-negative time, delay or
/// backlog for the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPerformParameter")]
pub struct PerformParameter {
    metric: PerformMetric,
    value: f64,
}

#[derive(Deserialize)]
struct RawPerformParameter {
    metric: PerformMetric,
    value: f64,
}

impl TryFrom<RawPerformParameter> for PerformParameter {
    type Error = Error;

    fn try_from(raw: RawPerformParameter) -> Result<Self> {
        PerformParameter::new(raw.metric, raw.value)
    }
}

impl PerformParameter {
    pub fn new(metric: PerformMetric, value: f64) -> Result<Self> {
        if metric.target_is_probability() {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::out_of_bounds(
                    metric.as_str(),
                    value,
                    "probability target must lie in (0, 1]",
                ));
            }
        } else if !value.is_finite() || value < 0.0 {
            return Err(Error::out_of_bounds(
                metric.as_str(),
                value,
                "target must be finite and non-negative",
            ));
        }
        Ok(Self { metric, value })
    }

    pub fn metric(&self) -> PerformMetric {
        self.metric
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Same metric, different target.
    pub fn with_value(&self, value: f64) -> Result<Self> {
        Self::new(self.metric, value)
    }
}

impl fmt::Display for PerformParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.metric, self.value)
    }
}
