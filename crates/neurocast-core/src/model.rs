//! Aggregate correlation model
//!
//! The running accumulation of per-subject contributions: a weighted sum
//! of Fisher-transformed correlations (numerator), the matching weight
//! sums (denominator), and a subject count. The accumulation is linear,
//! so models over the same registry form an invertible algebra —
//! combining and removing cohorts are exact element-wise sums and
//! differences, with no reprocessing of raw recordings.
//!
//! All operations are value-returning; operands are never mutated.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::estimator::{estimate_subject, Contribution};
use crate::kernel::RbfKernel;
use crate::types::{LocationRegistry, Recording};

/// Aggregate model over a shared reference grid.
///
/// # Example
///
/// ```
/// use nalgebra::DMatrix;
/// use neurocast_core::{Location, LocationRegistry, Model, RbfKernel, Recording};
///
/// let grid = LocationRegistry::from_locations(&[
///     Location::new(0.0, 0.0, 0.0),
///     Location::new(20.0, 0.0, 0.0),
/// ]);
/// let samples = DMatrix::from_row_slice(4, 2, &[
///     1.0, 1.4,
///     2.0, 1.9,
///     3.0, 3.3,
///     4.0, 3.8,
/// ]);
/// let recording = Recording::new(samples, grid.locations().to_vec())?;
///
/// let model = Model::from_cohort(&[recording], grid, RbfKernel::default())?;
/// assert_eq!(model.n_subs(), 1);
///
/// let corr = model.reconstruct();
/// assert_eq!(corr.get(0, 0), Some(1.0));
/// # Ok::<(), neurocast_core::ModelError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    numerator: DMatrix<f64>,
    denominator: DMatrix<f64>,
    n_subs: usize,
    registry: LocationRegistry,
    kernel: RbfKernel,
}

impl Model {
    /// An empty model (no subjects) over a registry.
    ///
    /// Acts as the identity of [`Model::combine`].
    #[must_use]
    pub fn empty(registry: LocationRegistry, kernel: RbfKernel) -> Self {
        let n = registry.len();
        Self {
            numerator: DMatrix::zeros(n, n),
            denominator: DMatrix::zeros(n, n),
            n_subs: 0,
            registry,
            kernel,
        }
    }

    /// Build a model from a cohort of recordings.
    ///
    /// Runs the subject estimator over each recording and sums the
    /// contributions element-wise; `n_subs` becomes the cohort size.
    ///
    /// # Errors
    ///
    /// Any estimation failure ([`ModelError::EmptyRegistry`],
    /// [`ModelError::InsufficientSamples`],
    /// [`ModelError::ConstantChannel`]) aborts the build.
    pub fn from_cohort(
        recordings: &[Recording],
        registry: LocationRegistry,
        kernel: RbfKernel,
    ) -> ModelResult<Self> {
        let mut total = Contribution::zeros(registry.len());
        for recording in recordings {
            let contribution = estimate_subject(recording, &registry, &kernel)?;
            total.accumulate(&contribution);
        }
        debug!(
            subjects = recordings.len(),
            grid = registry.len(),
            "built aggregate model from cohort"
        );
        Ok(Self {
            numerator: total.numerator,
            denominator: total.denominator,
            n_subs: recordings.len(),
            registry,
            kernel,
        })
    }

    /// Reassemble a model from previously accumulated state.
    ///
    /// Intended for persistence layers; validates that both accumulator
    /// matrices are square over the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if either matrix does not
    /// match the registry size.
    pub fn from_parts(
        numerator: DMatrix<f64>,
        denominator: DMatrix<f64>,
        n_subs: usize,
        registry: LocationRegistry,
        kernel: RbfKernel,
    ) -> ModelResult<Self> {
        let n = registry.len();
        for matrix in [&numerator, &denominator] {
            if matrix.nrows() != n || matrix.ncols() != n {
                return Err(ModelError::ShapeMismatch {
                    rows: matrix.nrows(),
                    cols: matrix.ncols(),
                    expected: n,
                });
            }
        }
        Ok(Self {
            numerator,
            denominator,
            n_subs,
            registry,
            kernel,
        })
    }

    /// Merge two models built over identical registries.
    ///
    /// Element-wise sums of both accumulators; subject counts add.
    /// Commutative and associative; both operands are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RegistryMismatch`] if the registries differ
    /// in content or order.
    pub fn combine(&self, other: &Model) -> ModelResult<Model> {
        self.check_compatible(other)?;
        Ok(Model {
            numerator: &self.numerator + &other.numerator,
            denominator: &self.denominator + &other.denominator,
            n_subs: self.n_subs + other.n_subs,
            registry: self.registry.clone(),
            kernel: self.kernel,
        })
    }

    /// Subtract a model's contribution — the algebraic inverse of
    /// [`Model::combine`].
    ///
    /// The subtrahend is trusted to be part of this model's accumulation
    /// history; that provenance is not verifiable from the state alone.
    ///
    /// # Errors
    ///
    /// - [`ModelError::RegistryMismatch`] for differing registries
    /// - [`ModelError::NegativeSubjectCount`] if the subject count would
    ///   go below zero
    pub fn remove(&self, other: &Model) -> ModelResult<Model> {
        self.check_compatible(other)?;
        if other.n_subs > self.n_subs {
            return Err(ModelError::NegativeSubjectCount {
                have: self.n_subs,
                remove: other.n_subs,
            });
        }
        Ok(Model {
            numerator: &self.numerator - &other.numerator,
            denominator: &self.denominator - &other.denominator,
            n_subs: self.n_subs - other.n_subs,
            registry: self.registry.clone(),
            kernel: self.kernel,
        })
    }

    /// Incorporate a new cohort into this model.
    ///
    /// Equivalent to combining with a model built from the recordings
    /// over this model's registry and kernel.
    ///
    /// # Errors
    ///
    /// Propagates any [`Model::from_cohort`] failure.
    pub fn update(&self, recordings: &[Recording]) -> ModelResult<Model> {
        let incoming = Model::from_cohort(recordings, self.registry.clone(), self.kernel)?;
        self.combine(&incoming)
    }

    fn check_compatible(&self, other: &Model) -> ModelResult<()> {
        if self.registry != other.registry {
            return Err(ModelError::RegistryMismatch {
                left: self.registry.len(),
                right: other.registry.len(),
            });
        }
        Ok(())
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

    /// Number of subjects accumulated into this model.
    #[inline]
    #[must_use]
    pub fn n_subs(&self) -> usize {
        self.n_subs
    }

    /// The reference grid this model is defined over.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// The kernel the model's estimations were weighted with.
    #[inline]
    #[must_use]
    pub fn kernel(&self) -> &RbfKernel {
        &self.kernel
    }

    /// Implied correlation at a registry cell, if any subject informed it.
    ///
    /// `Some(1.0)` on the diagonal, `None` where the accumulated weight
    /// is zero.
    #[must_use]
    pub fn cell(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.registry.len() || j >= self.registry.len() {
            return None;
        }
        if i == j {
            return Some(1.0);
        }
        let den = self.denominator[(i, j)];
        if den > 0.0 {
            Some(crate::stats::z_to_r(self.numerator[(i, j)] / den))
        } else {
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{simulate_locations, simulate_subject};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TOLERANCE: f64 = 1e-10;

    fn assert_models_close(a: &Model, b: &Model) {
        assert_eq!(a.n_subs(), b.n_subs());
        assert_eq!(a.registry(), b.registry());
        for i in 0..a.registry().len() {
            for j in 0..a.registry().len() {
                assert!((a.numerator()[(i, j)] - b.numerator()[(i, j)]).abs() < TOLERANCE);
                assert!((a.denominator()[(i, j)] - b.denominator()[(i, j)]).abs() < TOLERANCE);
            }
        }
    }

    fn simulated_cohort(seed: u64, n_subs: usize) -> (Vec<Recording>, LocationRegistry) {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = simulate_locations(12, &mut rng);
        let registry = LocationRegistry::from_locations(&grid);
        let cohort = (0..n_subs)
            .map(|_| simulate_subject(&grid, 5, 10, &mut rng).expect("simulation succeeds"))
            .collect();
        (cohort, registry)
    }

    #[test]
    fn test_combine_with_empty_is_identity() {
        let (cohort, registry) = simulated_cohort(7, 2);
        let kernel = RbfKernel::default();
        let model =
            Model::from_cohort(&cohort, registry.clone(), kernel).expect("cohort builds");
        let empty = Model::empty(registry, kernel);

        let merged = model.combine(&empty).expect("registries match");
        assert_models_close(&merged, &model);
    }

    #[test]
    fn test_combine_commutes_and_associates() {
        let (cohort, registry) = simulated_cohort(11, 3);
        let kernel = RbfKernel::default();
        let a = Model::from_cohort(&cohort[0..1], registry.clone(), kernel).expect("builds");
        let b = Model::from_cohort(&cohort[1..2], registry.clone(), kernel).expect("builds");
        let c = Model::from_cohort(&cohort[2..3], registry, kernel).expect("builds");

        let ab = a.combine(&b).expect("match");
        let ba = b.combine(&a).expect("match");
        assert_models_close(&ab, &ba);

        let ab_c = ab.combine(&c).expect("match");
        let a_bc = a.combine(&b.combine(&c).expect("match")).expect("match");
        assert_models_close(&ab_c, &a_bc);
    }

    #[test]
    fn test_remove_inverts_combine_on_split_cohort() {
        // 6 simulated subjects split 3/3; subtracting the first half from
        // the merged model must reproduce the second half exactly.
        let (cohort, registry) = simulated_cohort(13, 6);
        let kernel = RbfKernel::default();
        let first =
            Model::from_cohort(&cohort[0..3], registry.clone(), kernel).expect("builds");
        let second = Model::from_cohort(&cohort[3..6], registry, kernel).expect("builds");

        let merged = first.combine(&second).expect("match");
        assert_eq!(merged.n_subs(), first.n_subs() + second.n_subs());

        let recovered = merged.remove(&first).expect("valid subtraction");
        assert_models_close(&recovered, &second);
    }

    #[test]
    fn test_update_matches_explicit_combine() {
        let (cohort, registry) = simulated_cohort(17, 4);
        let kernel = RbfKernel::default();
        let base =
            Model::from_cohort(&cohort[0..2], registry.clone(), kernel).expect("builds");

        let updated = base.update(&cohort[2..4]).expect("update succeeds");
        assert_eq!(updated.n_subs(), 4);

        let addition = Model::from_cohort(&cohort[2..4], registry, kernel).expect("builds");
        let explicit = base.combine(&addition).expect("match");
        assert_models_close(&updated, &explicit);
    }

    #[test]
    fn test_combine_rejects_mismatched_registries() {
        let (cohort_a, registry_a) = simulated_cohort(19, 1);
        let (cohort_b, registry_b) = simulated_cohort(23, 1);
        let kernel = RbfKernel::default();
        let a = Model::from_cohort(&cohort_a, registry_a, kernel).expect("builds");
        let b = Model::from_cohort(&cohort_b, registry_b, kernel).expect("builds");

        assert!(matches!(
            a.combine(&b),
            Err(ModelError::RegistryMismatch { .. })
        ));
        assert!(matches!(
            a.remove(&b),
            Err(ModelError::RegistryMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_rejects_negative_subject_count() {
        let (cohort, registry) = simulated_cohort(29, 3);
        let kernel = RbfKernel::default();
        let small =
            Model::from_cohort(&cohort[0..1], registry.clone(), kernel).expect("builds");
        let large = Model::from_cohort(&cohort, registry, kernel).expect("builds");

        let err = small.remove(&large);
        assert!(matches!(
            err,
            Err(ModelError::NegativeSubjectCount { have: 1, remove: 3 })
        ));
        // The failed operation leaves the operand untouched.
        assert_eq!(small.n_subs(), 1);
    }

    #[test]
    fn test_from_parts_validates_shape() {
        let registry = LocationRegistry::from_locations(&[
            crate::types::Location::new(0.0, 0.0, 0.0),
            crate::types::Location::new(1.0, 0.0, 0.0),
        ]);
        let err = Model::from_parts(
            DMatrix::zeros(3, 3),
            DMatrix::zeros(2, 2),
            0,
            registry,
            RbfKernel::default(),
        );
        assert!(matches!(err, Err(ModelError::ShapeMismatch { .. })));
    }
}
