//! Subject-level estimation of full-grid correlation structure
//!
//! Expands one subject's sparse observed correlations to the dense
//! reference grid. Both endpoints of every target pair are weighted
//! independently by their kernel proximity to the subject's actual
//! electrodes, and observed correlations are Fisher-transformed before
//! weighting so the combination is linear in the transformed domain.

use nalgebra::DMatrix;
use tracing::warn;

use crate::error::{ModelError, ModelResult};
use crate::kernel::RbfKernel;
use crate::stats::{clip_correlation, r_to_z, sample_correlation};
use crate::types::{LocationRegistry, Recording};

// ============================================================================
// Contribution
// ============================================================================

/// One subject's additive contribution to an aggregate model.
///
/// Both matrices are |registry|² and symmetric with a zero diagonal (the
/// diagonal correlation is 1 by construction and never accumulated).
/// `numerator` holds kernel-weighted sums of Fisher-transformed observed
/// correlations; `denominator` holds the matching weight sums.
#[derive(Clone, Debug, PartialEq)]
pub struct Contribution {
    pub(crate) numerator: DMatrix<f64>,
    pub(crate) denominator: DMatrix<f64>,
}

impl Contribution {
    /// An all-zero contribution over an `n`-location grid.
    #[must_use]
    pub fn zeros(n: usize) -> Self {
        Self {
            numerator: DMatrix::zeros(n, n),
            denominator: DMatrix::zeros(n, n),
        }
    }

    /// Weighted sum of transformed correlations per cell.
    #[inline]
    #[must_use]
    pub fn numerator(&self) -> &DMatrix<f64> {
        &self.numerator
    }

    /// Sum of reliability weights per cell.
    #[inline]
    #[must_use]
    pub fn denominator(&self) -> &DMatrix<f64> {
        &self.denominator
    }

    /// Element-wise accumulation of another contribution.
    pub(crate) fn accumulate(&mut self, other: &Contribution) {
        self.numerator += &other.numerator;
        self.denominator += &other.denominator;
    }
}

// ============================================================================
// Estimation
// ============================================================================

/// Estimate one subject's full-grid contribution.
///
/// For each reference pair (i, j), every observed pair (p, q), p ≠ q,
/// contributes its transformed correlation with weight
/// `w(d(i, p)) * w(d(j, q))`. Cells whose weights all underflow to zero
/// are left at (0, 0); they are reported as undefined at query time, not
/// patched here.
///
/// # Errors
///
/// - [`ModelError::EmptyRegistry`] if the reference grid has no locations
/// - [`ModelError::InsufficientSamples`] / [`ModelError::ConstantChannel`]
///   from the observed-correlation step
pub fn estimate_subject(
    recording: &Recording,
    registry: &LocationRegistry,
    kernel: &RbfKernel,
) -> ModelResult<Contribution> {
    if registry.is_empty() {
        return Err(ModelError::EmptyRegistry);
    }

    let observed = sample_correlation(recording.samples())?;
    let m = recording.n_channels();
    let n = registry.len();
    let grid = registry.locations();
    let electrodes = recording.locations();

    // Fisher-transform the observed off-diagonal cells. Sample correlations
    // of degenerate channel pairs can sit exactly at ±1; those are clipped
    // into the transform-safe range.
    let mut z = DMatrix::<f64>::zeros(m, m);
    for p in 0..m {
        for q in (p + 1)..m {
            let raw = observed[(p, q)];
            let clipped = clip_correlation(raw);
            if clipped != raw {
                warn!(
                    channel_a = p,
                    channel_b = q,
                    correlation = raw,
                    "clipping degenerate observed correlation before Fisher transform"
                );
            }
            let value = r_to_z(clipped)?;
            z[(p, q)] = value;
            z[(q, p)] = value;
        }
    }

    // Proximity of every grid location to every observed electrode.
    let mut weights = DMatrix::<f64>::zeros(n, m);
    for i in 0..n {
        for p in 0..m {
            weights[(i, p)] = kernel.weight(grid[i].distance(&electrodes[p]));
        }
    }

    let mut contribution = Contribution::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let mut num = 0.0;
            let mut den = 0.0;
            for p in 0..m {
                let w_ip = weights[(i, p)];
                if w_ip == 0.0 {
                    continue;
                }
                for q in 0..m {
                    if q == p {
                        continue;
                    }
                    let w = w_ip * weights[(j, q)];
                    num += w * z[(p, q)];
                    den += w;
                }
            }
            contribution.numerator[(i, j)] = num;
            contribution.numerator[(j, i)] = num;
            contribution.denominator[(i, j)] = den;
            contribution.denominator[(j, i)] = den;
        }
    }
    Ok(contribution)
}

// ============================================================================
// Tests
// ============================================================================
