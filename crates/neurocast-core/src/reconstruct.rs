//! Reconstruction queries against an aggregate model
//!
//! Turns accumulated (numerator, denominator) state back into a
//! correlation matrix: each informed cell is the inverse Fisher transform
//! of its weighted average, the diagonal is exactly 1, and cells no
//! subject ever informed are reported as explicitly undefined — never as
//! a correlation of zero.

use nalgebra::DMatrix;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::types::Location;

// ============================================================================
// Reconstruction
// ============================================================================

/// A reconstructed correlation matrix with an explicit defined-cell mask.
///
/// `values` holds `NaN` in undefined cells; use [`Reconstruction::get`]
/// to read cells with the undefined case surfaced as `None`.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    values: DMatrix<f64>,
    defined: DMatrix<bool>,
    locations: Vec<Location>,
}

impl Reconstruction {
    /// Correlation at cell (i, j).
    ///
    /// `None` for undefined cells (zero accumulated weight) and for
    /// out-of-range indices; a valid zero correlation is `Some(0.0)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.len() && j < self.len() && self.defined[(i, j)] {
            Some(self.values[(i, j)])
        } else {
            None
        }
    }

    /// Whether cell (i, j) was informed by at least one subject.
    #[must_use]
    pub fn is_defined(&self, i: usize, j: usize) -> bool {
        i < self.len() && j < self.len() && self.defined[(i, j)]
    }

    /// Number of query locations (matrix side length).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the reconstruction covers no locations.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The locations this reconstruction was queried at, in matrix order.
    #[inline]
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Raw value matrix; undefined cells hold `NaN`.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Fraction of off-diagonal cells that are defined (1.0 for a fully
    /// informed grid, 0.0 for an empty model).
    #[must_use]
    pub fn coverage(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 1.0;
        }
        let mut defined = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.defined[(i, j)] {
                    defined += 1;
                }
            }
        }
        defined as f64 / (n * (n - 1) / 2) as f64
    }
}

// ============================================================================
// Query operations
// ============================================================================

impl Model {
    /// Reconstruct the correlation matrix over the full reference grid.
    #[must_use]
    pub fn reconstruct(&self) -> Reconstruction {
        let n = self.registry().len();
        let indices: Vec<usize> = (0..n).collect();
        self.reconstruct_indices(&indices)
    }

    /// Reconstruct at a subset of registered locations.
    ///
    /// The result matrix follows the order of `locations`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownLocation`] for any coordinate the
    /// registry has never seen.
    pub fn reconstruct_at(&self, locations: &[Location]) -> ModelResult<Reconstruction> {
        let indices = locations
            .iter()
            .map(|loc| {
                self.registry()
                    .index_of(loc)
                    .ok_or(ModelError::UnknownLocation {
                        x: loc.x,
                        y: loc.y,
                        z: loc.z,
                    })
            })
            .collect::<ModelResult<Vec<usize>>>()?;
        Ok(self.reconstruct_indices(&indices))
    }

    fn reconstruct_indices(&self, indices: &[usize]) -> Reconstruction {
        let k = indices.len();
        let mut values = DMatrix::from_element(k, k, f64::NAN);
        let mut defined = DMatrix::from_element(k, k, false);

        for (a, &i) in indices.iter().enumerate() {
            values[(a, a)] = 1.0;
            defined[(a, a)] = true;
            for (b, &j) in indices.iter().enumerate().skip(a + 1) {
                if let Some(r) = self.cell(i, j) {
                    values[(a, b)] = r;
                    values[(b, a)] = r;
                    defined[(a, b)] = true;
                    defined[(b, a)] = true;
                }
            }
        }

        let locations = indices
            .iter()
            .filter_map(|&i| self.registry().get(i).copied())
            .collect();
        Reconstruction {
            values,
            defined,
            locations,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
