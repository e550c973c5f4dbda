//! Error types for the aggregation engine using `thiserror`.
//!
//! Every failure here is a deterministic logic or input error: it is
//! surfaced to the caller immediately, never retried, and never mutates
//! an existing model (all model operations are value-returning).

use thiserror::Error;

/// Errors produced by model construction, algebra, and reconstruction.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Two models were built over different location registries
    #[error("models were built over different location registries ({left} vs {right} locations)")]
    RegistryMismatch {
        /// Registry size of the left operand
        left: usize,
        /// Registry size of the right operand
        right: usize,
    },

    /// Removing a cohort would drive the subject count below zero
    #[error("cannot remove {remove} subjects from a model of {have}")]
    NegativeSubjectCount {
        /// Subjects in the minuend model
        have: usize,
        /// Subjects in the subtrahend model
        remove: usize,
    },

    /// A correlation of ±1 (or a non-finite value) is undefined under the
    /// Fisher z-transform
    #[error("correlation {value} is degenerate under the Fisher z-transform")]
    DegenerateCorrelation {
        /// The offending correlation value
        value: f64,
    },

    /// A recording's sample matrix does not line up with its locations
    #[error("recording has {columns} sample columns but {locations} locations")]
    IncompatibleRecording {
        /// Columns in the sample matrix
        columns: usize,
        /// Supplied electrode locations
        locations: usize,
    },

    /// Sample correlation needs at least two time points
    #[error("insufficient samples for correlation: got {got}, need {need}")]
    InsufficientSamples {
        /// Time points available
        got: usize,
        /// Minimum required
        need: usize,
    },

    /// A zero-variance channel has no defined correlation with anything
    #[error("channel {channel} has zero variance; sample correlation is undefined")]
    ConstantChannel {
        /// Column index of the constant channel
        channel: usize,
    },

    /// A reconstruction was requested at a coordinate the registry has
    /// never seen
    #[error("location ({x}, {y}, {z}) is not registered")]
    UnknownLocation {
        /// X coordinate
        x: f64,
        /// Y coordinate
        y: f64,
        /// Z coordinate
        z: f64,
    },

    /// Accumulator matrices must be square over the full registry
    #[error("accumulator shape {rows}x{cols} does not match registry size {expected}")]
    ShapeMismatch {
        /// Accumulator rows
        rows: usize,
        /// Accumulator columns
        cols: usize,
        /// Registry size
        expected: usize,
    },

    /// Estimation over an empty registry is meaningless
    #[error("operation requires a non-empty location registry")]
    EmptyRegistry,
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
