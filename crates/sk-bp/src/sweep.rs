use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sk_core::errors::ErrorInfo;
use sk_core::SkError;
use tracing::info;

use crate::config::RunConfig;
use crate::determinism;
use crate::kernel;
use crate::summary::RunSummary;

/// Evenly spaced inverse temperatures `start, start + step, ...` up to `stop`.
///
/// `stop` is included when it lies on the grid (up to rounding), so the
/// default grid has 25 points ending at the spin-glass side value 1.2. A
/// half-open `[start, stop)` range would stop one point earlier, at 1.15.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaGrid {
    /// First inverse temperature.
    pub start: f64,
    /// Last inverse temperature, inclusive up to rounding.
    pub stop: f64,
    /// Spacing between consecutive points.
    pub step: f64,
}

impl Default for BetaGrid {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 1.2,
            step: 0.05,
        }
    }
}

impl BetaGrid {
    /// Expands the grid into explicit values.
    pub fn betas(&self) -> Result<Vec<f64>, SkError> {
        let finite = self.start.is_finite() && self.stop.is_finite() && self.step.is_finite();
        if !finite || self.start < 0.0 || self.stop < self.start || self.step <= 0.0 {
            return Err(SkError::Parameter(
                ErrorInfo::new("beta-grid", "grid must satisfy 0 <= start <= stop and step > 0")
                    .with_context("start", self.start)
                    .with_context("stop", self.stop)
                    .with_context("step", self.step),
            ));
        }
        let count = ((self.stop - self.start) / self.step + 1e-9).floor() as usize + 1;
        Ok((0..count)
            .map(|index| self.start + index as f64 * self.step)
            .collect())
    }
}

/// One point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Inverse temperature of the run.
    pub beta: f64,
    /// Master seed the run was started from.
    pub seed: u64,
    /// Result record of the run.
    pub summary: RunSummary,
}

/// Runs one independent solver per grid point on a pool of `jobs` threads.
///
/// Each point owns its couplings and messages; its master seed derives from
/// `base.seed` and the point index, so the output does not depend on `jobs`.
/// Points come back in grid order. The first fatal error aborts the sweep.
pub fn sweep(base: &RunConfig, grid: &BetaGrid, jobs: usize) -> Result<Vec<SweepPoint>, SkError> {
    let betas = grid.betas()?;
    let configs: Vec<RunConfig> = betas
        .iter()
        .enumerate()
        .map(|(index, &beta)| RunConfig {
            beta,
            seed: determinism::sweep_seed(base.seed, index),
            ..base.clone()
        })
        .collect();
    for config in &configs {
        config.validate()?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|err| SkError::Io(ErrorInfo::new("thread-pool", err.to_string())))?;

    pool.install(|| {
        configs
            .par_iter()
            .map(|config| -> Result<SweepPoint, SkError> {
                let summary = kernel::run(config)?;
                info!(
                    beta = config.beta,
                    converged = summary.is_converged,
                    sweeps = summary.iterations_number,
                    "sweep point finished"
                );
                Ok(SweepPoint {
                    beta: config.beta,
                    seed: config.seed,
                    summary,
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_matches_plotting_range() {
        let betas = BetaGrid::default().betas().unwrap();
        assert_eq!(betas.len(), 25);
        assert_eq!(betas[0], 0.0);
        assert!((betas[24] - 1.2).abs() < 1e-12);
        assert!((betas[23] - 1.15).abs() < 1e-12);
    }

    #[test]
    fn inverted_grid_is_rejected() {
        let grid = BetaGrid {
            start: 1.0,
            stop: 0.5,
            step: 0.1,
        };
        assert!(grid.betas().unwrap_err().is_parameter());
    }
}
