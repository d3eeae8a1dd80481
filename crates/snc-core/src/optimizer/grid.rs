//! Exhaustive grid search.

use super::evaluator::{Evaluator, Step};
use super::{CostFunction, Termination};
use snc_common::{Error, Result};

/// Upper limit on the number of grid points in one search.
pub const MAX_GRID_POINTS: u64 = 10_000_000;

/// Tolerance absorbing rounding in `(high - low) / step`.
const STEP_SLACK: f64 = 1e-9;

/// One axis of the grid: `low, low + step, …` up to and including `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRange {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl GridRange {
    pub fn new(low: f64, high: f64, step: f64) -> Self {
        Self { low, high, step }
    }

    /// Number of points on this axis, endpoints included.
    pub fn points(&self) -> u64 {
        ((self.high - self.low) / self.step + STEP_SLACK).floor() as u64 + 1
    }

    fn point(&self, index: u64) -> f64 {
        (self.low + index as f64 * self.step).min(self.high)
    }

    fn validate(&self, axis: usize) -> Result<()> {
        if !(self.low.is_finite() && self.high.is_finite() && self.step.is_finite()) {
            return Err(Error::InvalidSearchConfig(format!(
                "grid axis {axis}: bounds and step must be finite"
            )));
        }
        if self.step <= 0.0 {
            return Err(Error::InvalidSearchConfig(format!(
                "grid axis {axis}: step {} must be > 0",
                self.step
            )));
        }
        if self.high < self.low {
            return Err(Error::InvalidSearchConfig(format!(
                "grid axis {axis}: high {} below low {}",
                self.high, self.low
            )));
        }
        Ok(())
    }
}

impl From<&snc_config::analysis::RangeSettings> for GridRange {
    fn from(r: &snc_config::analysis::RangeSettings) -> Self {
        Self::new(r.low, r.high, r.step)
    }
}

/// Cartesian grid, one range per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig<const N: usize> {
    pub ranges: [GridRange; N],
}

impl<const N: usize> GridConfig<N> {
    pub fn new(ranges: [GridRange; N]) -> Self {
        Self { ranges }
    }

    /// Total number of grid points, saturating.
    pub fn total_points(&self) -> u64 {
        self.ranges
            .iter()
            .fold(1u64, |acc, r| acc.saturating_mul(r.points()))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (axis, range) in self.ranges.iter().enumerate() {
            range.validate(axis)?;
        }
        let total = self.total_points();
        if total > MAX_GRID_POINTS {
            return Err(Error::InvalidSearchConfig(format!(
                "grid has {total} points, limit is {MAX_GRID_POINTS}"
            )));
        }
        Ok(())
    }
}

/// Visit points in lexicographic order, first parameter outermost. The
/// first minimum found wins.
pub(super) fn search<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    config: &GridConfig<N>,
    iterations: &mut usize,
) -> Step<Termination>
where
    C: CostFunction<N> + ?Sized,
{
    let counts = config.ranges.map(|r| r.points());
    let total = config.total_points();

    for k in 0..total {
        let mut rest = k;
        let mut point = [0.0; N];
        for axis in (0..N).rev() {
            point[axis] = config.ranges[axis].point(rest % counts[axis]);
            rest /= counts[axis];
        }
        ev.eval(&point)?;
        *iterations += 1;
    }
    Ok(Termination::Converged)
}
