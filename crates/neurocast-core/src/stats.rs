//! Correlation statistics
//!
//! This module provides:
//! - The Fisher z-transform and its inverse
//! - Clipping of near-degenerate correlations
//! - Sample (Pearson) correlation across time

use nalgebra::DMatrix;

use crate::error::{ModelError, ModelResult};

/// Correlations are clipped into `[-CORRELATION_CLIP, CORRELATION_CLIP]`
/// before the Fisher transform, which diverges at ±1.
pub const CORRELATION_CLIP: f64 = 0.9999;

/// Clamp a correlation into the transform-safe range.
#[inline]
#[must_use]
pub fn clip_correlation(r: f64) -> f64 {
    r.clamp(-CORRELATION_CLIP, CORRELATION_CLIP)
}

/// Fisher z-transform: `z = 0.5 * ln((1 + r) / (1 - r))`.
///
/// Maps bounded correlations onto an unbounded additive domain so that
/// weighted sums of transformed values behave like weighted averages.
///
/// # Errors
///
/// Returns [`ModelError::DegenerateCorrelation`] for |r| ≥ 1 or
/// non-finite input; callers holding raw sample correlations should
/// [`clip_correlation`] first.
#[inline]
pub fn r_to_z(r: f64) -> ModelResult<f64> {
    if !r.is_finite() || r.abs() >= 1.0 {
        return Err(ModelError::DegenerateCorrelation { value: r });
    }
    Ok(0.5 * ((1.0 + r) / (1.0 - r)).ln())
}

/// Inverse Fisher transform: `r = tanh(z)`.
#[inline]
#[must_use]
pub fn z_to_r(z: f64) -> f64 {
    z.tanh()
}

/// Pearson correlation matrix of a time × channels sample matrix.
///
/// The result is symmetric with an exact unit diagonal, values in
/// `[-1, 1]`.
///
/// # Errors
///
/// - [`ModelError::InsufficientSamples`] for fewer than two time points
/// - [`ModelError::ConstantChannel`] if any column has zero variance
pub fn sample_correlation(samples: &DMatrix<f64>) -> ModelResult<DMatrix<f64>> {
    let t = samples.nrows();
    let m = samples.ncols();
    if t < 2 {
        return Err(ModelError::InsufficientSamples { got: t, need: 2 });
    }

    // Center each channel, then normalize by its standard deviation.
    let mut centered = samples.clone();
    let mut norms = vec![0.0_f64; m];
    for p in 0..m {
        let mean = samples.column(p).sum() / t as f64;
        let mut ss = 0.0;
        for i in 0..t {
            let v = samples[(i, p)] - mean;
            centered[(i, p)] = v;
            ss += v * v;
        }
        if ss == 0.0 {
            return Err(ModelError::ConstantChannel { channel: p });
        }
        norms[p] = ss.sqrt();
    }

    let mut corr = DMatrix::<f64>::identity(m, m);
    for p in 0..m {
        for q in (p + 1)..m {
            let dot = centered.column(p).dot(&centered.column(q));
            // Guard numeric noise just past ±1.
            let r = (dot / (norms[p] * norms[q])).clamp(-1.0, 1.0);
            corr[(p, q)] = r;
            corr[(q, p)] = r;
        }
    }
    Ok(corr)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fisher_round_trip() {
        for &r in &[-0.95, -0.5, 0.0, 0.3, 0.85] {
            let z = r_to_z(r).expect("in range");
            assert!((z_to_r(z) - r).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fisher_rejects_degenerate() {
        assert!(matches!(
            r_to_z(1.0),
            Err(ModelError::DegenerateCorrelation { .. })
        ));
        assert!(matches!(
            r_to_z(-1.0),
            Err(ModelError::DegenerateCorrelation { .. })
        ));
        assert!(r_to_z(f64::NAN).is_err());
    }

    #[test]
    fn test_clip_correlation() {
        assert_eq!(clip_correlation(1.0), CORRELATION_CLIP);
        assert_eq!(clip_correlation(-1.0), -CORRELATION_CLIP);
        assert_eq!(clip_correlation(0.5), 0.5);
        assert!(r_to_z(clip_correlation(1.0)).is_ok());
    }

    #[test]
    fn test_sample_correlation_known_values() {
        // Column 1 = 2 * column 0 (r = 1), column 2 = -column 0 (r = -1).
        let samples = DMatrix::from_row_slice(
            4,
            3,
            &[
                1.0, 2.0, -1.0, //
                2.0, 4.0, -2.0, //
                3.0, 6.0, -3.0, //
                4.0, 8.0, -4.0,
            ],
        );
        let corr = sample_correlation(&samples).expect("valid samples");
        assert!((corr[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((corr[(0, 2)] + 1.0).abs() < 1e-12);
        assert_eq!(corr[(0, 0)], 1.0);
        assert_eq!(corr[(1, 0)], corr[(0, 1)]);
    }

    #[test]
    fn test_sample_correlation_rejects_constant_channel() {
        let samples = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        assert!(matches!(
            sample_correlation(&samples),
            Err(ModelError::ConstantChannel { channel: 1 })
        ));
    }

    #[test]
    fn test_sample_correlation_needs_two_rows() {
        let samples = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(matches!(
            sample_correlation(&samples),
            Err(ModelError::InsufficientSamples { got: 1, need: 2 })
        ));
    }
}
