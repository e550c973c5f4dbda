//! Cohort simulation
//!
//! Synthetic subjects for testing and demos: a known correlational
//! structure (a Toeplitz matrix over the reference grid) is imposed on
//! iid Gaussian draws via a Cholesky factor, then each simulated subject
//! observes the result at a random electrode subset. Recovering the
//! imposed structure from many such subjects exercises the whole
//! estimate → accumulate → reconstruct path.

use nalgebra::{Cholesky, DMatrix};
use rand::seq::index::sample;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{ModelError, ModelResult};
use crate::types::{Location, Recording};

/// Simulation volume half-extent in mm (MNI-ish bounding cube).
const EXTENT_MM: f64 = 80.0;

/// Draw `n` random locations uniformly inside the reference volume.
pub fn simulate_locations<R: Rng>(n: usize, rng: &mut R) -> Vec<Location> {
    (0..n)
        .map(|_| {
            Location::new(
                rng.gen_range(-EXTENT_MM..EXTENT_MM),
                rng.gen_range(-EXTENT_MM..EXTENT_MM),
                rng.gen_range(-EXTENT_MM..EXTENT_MM),
            )
        })
        .collect()
}

/// Toeplitz correlation structure with linearly decaying bands.
///
/// Row 0 is `linspace(1, 0, n)`; every diagonal is constant. This is the
/// target structure the estimation pipeline should recover from enough
/// simulated subjects.
#[must_use]
pub fn toeplitz_correlation(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| {
        let lag = i.abs_diff(j);
        if n <= 1 {
            1.0
        } else {
            1.0 - lag as f64 / (n - 1) as f64
        }
    })
}

/// Draw `n_samples` time points with the given correlation structure.
///
/// Standard multivariate-normal construction: iid standard normal draws
/// multiplied by an upper Cholesky factor. A small ridge is escalated
/// onto the diagonal until the factorization succeeds, since banded
/// Toeplitz structures can sit on the PSD boundary.
fn structured_samples<R: Rng>(
    structure: &DMatrix<f64>,
    n_samples: usize,
    rng: &mut R,
) -> DMatrix<f64> {
    let n = structure.nrows();
    let mut ridge = 0.0;
    let factor = loop {
        let mut candidate = structure.clone();
        for i in 0..n {
            candidate[(i, i)] += ridge;
        }
        if let Some(cholesky) = Cholesky::new(candidate) {
            break cholesky;
        }
        ridge = if ridge == 0.0 { 1e-9 } else { ridge * 10.0 };
    };
    let draws = DMatrix::from_fn(n_samples, n, |_, _| rng.sample::<f64, _>(StandardNormal));
    draws * factor.l().transpose()
}

/// Simulate a full-grid recording with Toeplitz structure over `grid`.
///
/// # Errors
///
/// Returns [`ModelError::EmptyRegistry`] for an empty grid.
pub fn simulate_recording<R: Rng>(
    grid: &[Location],
    n_samples: usize,
    rng: &mut R,
) -> ModelResult<Recording> {
    if grid.is_empty() {
        return Err(ModelError::EmptyRegistry);
    }
    let structure = toeplitz_correlation(grid.len());
    let samples = structured_samples(&structure, n_samples, rng);
    Recording::new(samples, grid.to_vec())
}

/// Simulate one subject observing the grid at a random electrode subset.
///
/// Draws a full-grid recording, then keeps `n_electrodes` randomly chosen
/// columns (clamped to the grid size) with their matching locations.
///
/// # Errors
///
/// Returns [`ModelError::EmptyRegistry`] for an empty grid.
pub fn simulate_subject<R: Rng>(
    grid: &[Location],
    n_electrodes: usize,
    n_samples: usize,
    rng: &mut R,
) -> ModelResult<Recording> {
    if grid.is_empty() {
        return Err(ModelError::EmptyRegistry);
    }
    let n_electrodes = n_electrodes.clamp(1, grid.len());
    let structure = toeplitz_correlation(grid.len());
    let full = structured_samples(&structure, n_samples, rng);

    let chosen = sample(rng, grid.len(), n_electrodes).into_vec();
    let samples = full.select_columns(chosen.iter());
    let locations = chosen.iter().map(|&p| grid[p]).collect();
    Recording::new(samples, locations)
}

// ============================================================================
// Tests
// ============================================================================
