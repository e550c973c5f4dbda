//! Kernel weighting of spatial distance
//!
//! Maps the distance between a reference-grid location and an observed
//! electrode to a reliability weight in `(0, 1]`. The weight expresses how
//! far an observed correlation is trusted to extrapolate: 1 at zero
//! distance, decaying monotonically with separation.

use serde::{Deserialize, Serialize};

/// Gaussian radial basis weighting: `w(d) = exp(-d² / width)`.
///
/// `width` controls the spatial reach of each electrode in squared
/// millimeters. The contracts the aggregation algebra relies on hold for
/// any positive width: `weight(0) = 1`, weights lie in `(0, 1]`, and
/// weights never increase with distance.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RbfKernel {
    width: f64,
}

impl RbfKernel {
    /// Default bandwidth (mm²), matching a 20 mm reference grid spacing.
    pub const DEFAULT_WIDTH: f64 = 20.0;

    /// Create a kernel with the given bandwidth.
    ///
    /// Non-positive widths are clamped to a minimal positive value so the
    /// weight contracts above always hold.
    #[must_use]
    pub fn new(width: f64) -> Self {
        Self {
            width: width.max(f64::MIN_POSITIVE),
        }
    }

    /// The bandwidth parameter.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Weight for a spatial distance in millimeters.
    #[inline]
    #[must_use]
    pub fn weight(&self, distance: f64) -> f64 {
        (-(distance * distance) / self.width).exp()
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_is_one_at_zero_distance() {
        let kernel = RbfKernel::default();
        assert_eq!(kernel.weight(0.0), 1.0);
    }

    #[test]
    fn test_weight_monotone_non_increasing() {
        let kernel = RbfKernel::new(20.0);
        let mut prev = kernel.weight(0.0);
        for step in 1..50 {
            let w = kernel.weight(f64::from(step) * 2.0);
            assert!(w <= prev);
            assert!(w >= 0.0);
            prev = w;
        }
    }

    #[test]
    fn test_weight_bounded() {
        let kernel = RbfKernel::new(5.0);
        for &d in &[0.0, 0.1, 1.0, 10.0, 100.0] {
            let w = kernel.weight(d);
            assert!(w <= 1.0);
            assert!(w >= 0.0);
        }
    }

    #[test]
    fn test_non_positive_width_clamped() {
        let kernel = RbfKernel::new(-1.0);
        assert!(kernel.width() > 0.0);
        assert_eq!(kernel.weight(0.0), 1.0);
    }
}
