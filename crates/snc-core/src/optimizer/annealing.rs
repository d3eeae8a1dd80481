//! Simulated annealing with geometric cooling.

use super::evaluator::{Evaluator, Step};
use super::{check_positive, check_start, CostFunction, Termination};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snc_common::{Error, Result};

/// Smallest fraction of the initial search radius used late in the schedule.
const MIN_RADIUS_FRACTION: f64 = 1e-2;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig<const N: usize> {
    pub start: [f64; N],
    /// Initial temperature.
    pub temperature: f64,
    /// Multiplier applied to the temperature after every step, in (0, 1).
    pub cooling_factor: f64,
    /// Half-width of the proposal box at the initial temperature. It shrinks
    /// with the square root of the temperature ratio.
    pub search_radius: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl<const N: usize> AnnealingConfig<N> {
    pub fn new(start: [f64; N]) -> Self {
        Self {
            start,
            temperature: 10.0,
            cooling_factor: 0.95,
            search_radius: 3.0,
            iterations: 1000,
            seed: 1,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_start(&self.start)?;
        check_positive("temperature", self.temperature)?;
        check_positive("search_radius", self.search_radius)?;
        if !(self.cooling_factor > 0.0 && self.cooling_factor < 1.0) {
            return Err(Error::InvalidSearchConfig(format!(
                "cooling_factor {} must be in (0, 1)",
                self.cooling_factor
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidSearchConfig(
                "annealing needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metropolis walk; the best point ever evaluated is the result, not the
/// final state of the walk. Finishing the schedule counts as converged.
pub(super) fn search<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    config: &AnnealingConfig<N>,
    iterations: &mut usize,
) -> Step<Termination>
where
    C: CostFunction<N> + ?Sized,
{
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut current = config.start;
    let mut f_current = ev.eval(&current)?;
    let mut temperature = config.temperature;

    for _ in 0..config.iterations {
        *iterations += 1;
        let fraction = (temperature / config.temperature)
            .sqrt()
            .max(MIN_RADIUS_FRACTION);
        let radius = config.search_radius * fraction;
        let candidate: [f64; N] =
            std::array::from_fn(|i| current[i] + rng.random_range(-radius..=radius));
        temperature *= config.cooling_factor;

        if candidate.iter().any(|x| !x.is_finite()) {
            continue;
        }
        let f_candidate = ev.eval(&candidate)?;

        // Infeasible-to-infeasible moves are accepted so the walk can leave
        // an infeasible start.
        let accept = if f_candidate <= f_current {
            true
        } else {
            let delta = f_candidate - f_current;
            rng.random::<f64>() < (-delta / temperature).exp()
        };
        if accept {
            current = candidate;
            f_current = f_candidate;
        }
    }
    Ok(Termination::Converged)
}
