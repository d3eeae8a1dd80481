//! Nelder–Mead simplex search.

use super::evaluator::{Evaluator, Step};
use super::{check_positive, check_start, CostFunction, Termination};
use snc_common::{Error, Result};

/// Reflection, expansion, contraction and shrink coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadParameters {
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl NelderMeadParameters {
    /// Textbook coefficients `(1, 2, 0.5, 0.5)`.
    pub fn standard() -> Self {
        Self {
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }

    /// Dimension-dependent coefficients after Gao and Han (2012).
    ///
    /// For `n < 2` they coincide with [`standard`](Self::standard).
    pub fn adaptive(n: usize) -> Self {
        if n < 2 {
            return Self::standard();
        }
        let n = n as f64;
        Self {
            reflection: 1.0,
            expansion: 1.0 + 2.0 / n,
            contraction: 0.75 - 1.0 / (2.0 * n),
            shrink: 1.0 - 1.0 / n,
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = self.reflection > 0.0
            && self.expansion > 1.0
            && self.expansion > self.reflection
            && self.contraction > 0.0
            && self.contraction < 1.0
            && self.shrink > 0.0
            && self.shrink < 1.0;
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidSearchConfig(format!(
                "invalid Nelder-Mead coefficients {self:?}"
            )))
        }
    }
}

impl Default for NelderMeadParameters {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadConfig<const N: usize> {
    pub start: [f64; N],
    /// Initial edge length relative to `max(1, ‖start‖∞)`.
    pub edge: f64,
    /// Stop once the standard deviation of vertex values drops below this.
    pub sd_min: f64,
    pub parameters: NelderMeadParameters,
    pub max_iterations: usize,
}

impl<const N: usize> NelderMeadConfig<N> {
    pub fn new(start: [f64; N]) -> Self {
        Self {
            start,
            edge: 0.1,
            sd_min: 1e-8,
            parameters: NelderMeadParameters::standard(),
            max_iterations: 1000,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_start(&self.start)?;
        check_positive("edge", self.edge)?;
        check_positive("sd_min", self.sd_min)?;
        self.parameters.validate()
    }

    /// Gao–Han initial simplex: `x0` and `x0 + τ·e_i` with
    /// `τ = edge · max(1, ‖x0‖∞)`.
    pub fn initial_simplex(&self) -> Vec<[f64; N]> {
        let norm = self.start.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        let tau = self.edge * norm.max(1.0);
        let mut simplex = Vec::with_capacity(N + 1);
        simplex.push(self.start);
        for i in 0..N {
            let mut vertex = self.start;
            vertex[i] += tau;
            simplex.push(vertex);
        }
        simplex
    }
}

/// Population standard deviation; `None` unless every value is finite.
fn spread(values: &[f64]) -> Option<f64> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(var.sqrt())
}

fn toward<const N: usize>(from: &[f64; N], to: &[f64; N], t: f64) -> [f64; N] {
    std::array::from_fn(|i| from[i] + t * (to[i] - from[i]))
}

pub(super) fn search<C, const N: usize>(
    ev: &mut Evaluator<'_, C, N>,
    config: &NelderMeadConfig<N>,
    iterations: &mut usize,
) -> Step<Termination>
where
    C: CostFunction<N> + ?Sized,
{
    let p = config.parameters;
    let mut simplex: Vec<([f64; N], f64)> = Vec::with_capacity(N + 1);
    for vertex in config.initial_simplex() {
        let value = ev.eval(&vertex)?;
        simplex.push((vertex, value));
    }

    loop {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let values: Vec<f64> = simplex.iter().map(|v| v.1).collect();
        if values.iter().all(|v| v.is_infinite()) {
            return Ok(Termination::Converged);
        }
        if spread(&values).is_some_and(|sd| sd < config.sd_min) {
            return Ok(Termination::Converged);
        }
        if *iterations >= config.max_iterations {
            return Ok(Termination::IterationLimit);
        }
        *iterations += 1;

        let best = simplex[0].1;
        let second_worst = simplex[N - 1].1;
        let (worst_x, worst) = simplex[N];

        let mut centroid = [0.0; N];
        for (x, _) in &simplex[..N] {
            for i in 0..N {
                centroid[i] += x[i] / N as f64;
            }
        }

        let reflected = toward(&centroid, &worst_x, -p.reflection);
        let f_reflected = ev.eval(&reflected)?;

        if f_reflected < best {
            let expanded = toward(&centroid, &reflected, p.expansion);
            let f_expanded = ev.eval(&expanded)?;
            simplex[N] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }
        if f_reflected < second_worst {
            simplex[N] = (reflected, f_reflected);
            continue;
        }

        let contracted = if f_reflected < worst {
            let outside = toward(&centroid, &reflected, p.contraction);
            let f_outside = ev.eval(&outside)?;
            (f_outside <= f_reflected).then_some((outside, f_outside))
        } else {
            let inside = toward(&centroid, &worst_x, p.contraction);
            let f_inside = ev.eval(&inside)?;
            (f_inside < worst).then_some((inside, f_inside))
        };
        if let Some(vertex) = contracted {
            simplex[N] = vertex;
            continue;
        }

        let anchor = simplex[0].0;
        for vertex in simplex.iter_mut().skip(1) {
            let x = toward(&anchor, &vertex.0, p.shrink);
            *vertex = (x, ev.eval(&x)?);
        }
    }
}
