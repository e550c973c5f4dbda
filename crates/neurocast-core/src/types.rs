//! Core types for the Neurocast engine
//!
//! This module provides the fundamental types shared by estimation,
//! aggregation, and reconstruction:
//! - 3-D reference-space locations with exact-value identity
//! - The location registry (the shared dense reference grid)
//! - Subject recordings (electrode time series plus their locations)

use std::collections::HashMap;

use nalgebra::{DMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

// ============================================================================
// Location
// ============================================================================

/// A 3-D coordinate in the shared reference space (MNI-style millimeters).
///
/// Identity is by exact coordinate value: two locations are the same
/// registry entry if and only if their coordinates match bit for bit.
///
/// # Example
///
/// ```
/// use neurocast_core::types::Location;
///
/// let a = Location::new(-61.0, -77.0, -3.0);
/// let b = Location::new(-41.0, -77.0, -23.0);
/// assert!((a.distance(&b) - 28.28).abs() < 0.01);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate (mm)
    pub x: f64,
    /// Y coordinate (mm)
    pub y: f64,
    /// Z coordinate (mm)
    pub z: f64,
}

impl Location {
    /// Create a new location.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another location.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Convert to nalgebra Vector3.
    #[inline]
    #[must_use]
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Create from nalgebra Vector3.
    #[inline]
    #[must_use]
    pub fn from_vector3(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Bit-pattern key used for exact-match deduplication.
    #[inline]
    pub(crate) fn key(&self) -> [u64; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}

// ============================================================================
// Location Registry
// ============================================================================

/// An ordered, duplicate-free set of locations with stable indices.
///
/// The registry is the dense reference grid that every subject's sparse
/// observations are projected onto. Indices are assigned in registration
/// order and never change; registering an already-known location returns
/// its existing index. Two models can only be combined when their
/// registries compare equal (same locations, same order).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Location>", into = "Vec<Location>")]
pub struct LocationRegistry {
    locations: Vec<Location>,
    index: HashMap<[u64; 3], usize>,
}

impl LocationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of locations, deduplicating while
    /// preserving first-seen order.
    #[must_use]
    pub fn from_locations(locations: &[Location]) -> Self {
        let mut registry = Self::new();
        registry.register(locations);
        registry
    }

    /// Register locations, appending any not already present.
    ///
    /// Returns the registry index of each input location, in input order.
    /// Already-registered locations keep their original index.
    pub fn register(&mut self, locations: &[Location]) -> Vec<usize> {
        locations
            .iter()
            .map(|loc| match self.index.get(&loc.key()) {
                Some(&i) => i,
                None => {
                    let i = self.locations.len();
                    self.locations.push(*loc);
                    self.index.insert(loc.key(), i);
                    i
                }
            })
            .collect()
    }

    /// Number of registered locations.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Get the location at an index, if in range.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&Location> {
        self.locations.get(i)
    }

    /// All registered locations in index order.
    #[inline]
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Look up the index of a location by exact coordinate match.
    #[inline]
    #[must_use]
    pub fn index_of(&self, location: &Location) -> Option<usize> {
        self.index.get(&location.key()).copied()
    }

    /// Euclidean distance between two registered locations.
    ///
    /// Returns `None` if either index is out of range.
    #[must_use]
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        Some(self.locations.get(i)?.distance(self.locations.get(j)?))
    }

    /// Iterate over registered locations in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }
}

impl PartialEq for LocationRegistry {
    fn eq(&self, other: &Self) -> bool {
        // The index map is derived state; ordered contents decide equality.
        self.locations == other.locations
    }
}

impl From<Vec<Location>> for LocationRegistry {
    fn from(locations: Vec<Location>) -> Self {
        Self::from_locations(&locations)
    }
}

impl From<LocationRegistry> for Vec<Location> {
    fn from(registry: LocationRegistry) -> Self {
        registry.locations
    }
}

// ============================================================================
// Recording
// ============================================================================

/// One subject's observed electrode time series.
///
/// `samples` is time × channels; column `p` was recorded at
/// `locations[p]`. Immutable after creation; the engine reads a recording
/// during estimation and never retains it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    samples: DMatrix<f64>,
    locations: Vec<Location>,
    sample_rate: Option<f64>,
    sessions: Option<Vec<String>>,
    meta: Option<String>,
}

impl Recording {
    /// Create a recording from a sample matrix and its electrode locations.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IncompatibleRecording`] if the sample matrix
    /// column count does not match the number of locations.
    pub fn new(samples: DMatrix<f64>, locations: Vec<Location>) -> ModelResult<Self> {
        if samples.ncols() != locations.len() {
            return Err(ModelError::IncompatibleRecording {
                columns: samples.ncols(),
                locations: locations.len(),
            });
        }
        Ok(Self {
            samples,
            locations,
            sample_rate: None,
            sessions: None,
            meta: None,
        })
    }

    /// Attach a sampling rate in Hz.
    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Attach per-sample session labels.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Vec<String>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Attach a free-form metadata tag (subject identifier, source file).
    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// The sample matrix (time × channels).
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &DMatrix<f64> {
        &self.samples
    }

    /// Electrode locations, in sample-column order.
    #[inline]
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Number of time points.
    #[inline]
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of recorded channels.
    #[inline]
    #[must_use]
    pub fn n_channels(&self) -> usize {
        self.samples.ncols()
    }

    /// Sampling rate in Hz, if known.
    #[inline]
    #[must_use]
    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_rate
    }

    /// Session labels, if attached.
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> Option<&[String]> {
        self.sessions.as_deref()
    }

    /// Metadata tag, if attached.
    #[inline]
    #[must_use]
    pub fn meta(&self) -> Option<&str> {
        self.meta.as_deref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dedup_and_stable_indices() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(1.0, 0.0, 0.0);
        let c = Location::new(0.0, 2.0, 0.0);

        let mut registry = LocationRegistry::new();
        let first = registry.register(&[a, b, a]);
        assert_eq!(first, vec![0, 1, 0]);

        // Appending keeps old indices stable.
        let second = registry.register(&[c, b]);
        assert_eq!(second, vec![2, 1]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.index_of(&b), Some(1));
    }

    #[test]
    fn test_registry_distance() {
        let registry = LocationRegistry::from_locations(&[
            Location::new(0.0, 0.0, 0.0),
            Location::new(3.0, 4.0, 0.0),
        ]);
        let d = registry.distance(0, 1);
        assert!(d.is_some());
        assert!((d.unwrap_or(0.0) - 5.0).abs() < 1e-12);
        assert!(registry.distance(0, 2).is_none());
    }

    #[test]
    fn test_registry_equality_is_order_sensitive() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(1.0, 0.0, 0.0);
        let fwd = LocationRegistry::from_locations(&[a, b]);
        let rev = LocationRegistry::from_locations(&[b, a]);
        assert_ne!(fwd, rev);
        assert_eq!(fwd, fwd.clone());
    }

    #[test]
    fn test_recording_rejects_mismatched_locations() {
        let samples = DMatrix::<f64>::zeros(10, 3);
        let locations = vec![Location::new(0.0, 0.0, 0.0)];
        let err = Recording::new(samples, locations);
        assert!(matches!(
            err,
            Err(ModelError::IncompatibleRecording {
                columns: 3,
                locations: 1
            })
        ));
    }

    #[test]
    fn test_recording_metadata() {
        let samples = DMatrix::<f64>::zeros(4, 2);
        let locations = vec![Location::new(0.0, 0.0, 0.0), Location::new(1.0, 1.0, 1.0)];
        let recording = Recording::new(samples, locations)
            .expect("valid recording")
            .with_sample_rate(512.0)
            .with_meta("CH003");
        assert_eq!(recording.n_samples(), 4);
        assert_eq!(recording.n_channels(), 2);
        assert_eq!(recording.sample_rate(), Some(512.0));
        assert_eq!(recording.meta(), Some("CH003"));
    }
}
