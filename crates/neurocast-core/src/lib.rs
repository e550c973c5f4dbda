//! Neurocast Core - full-brain correlation reconstruction from sparse
//! electrode recordings
//!
//! Each subject's electrodes cover only a handful of locations, but the
//! correlations they exhibit decay smoothly with distance. This crate
//! expands every subject's observed pairwise correlations onto a shared
//! dense reference grid (kernel-weighted in Fisher z-space) and
//! accumulates the expansions into a single aggregate model that supports
//! merging, subtracting, and incrementally updating subject cohorts
//! without ever touching the raw data again.
//!
//! # Modules
//!
//! - [`types`]: Locations, the shared location registry, and recordings
//! - [`error`]: Error types for estimation, algebra, and queries
//! - [`stats`]: Fisher z-transform and sample correlation
//! - [`kernel`]: Distance-to-weight kernel
//! - [`estimator`]: Per-subject expansion to the full grid
//! - [`model`]: The aggregate model and its combine/remove/update algebra
//! - [`reconstruct`]: Correlation-matrix queries with explicit missing cells
//! - [`sim`]: Synthetic cohorts for tests and demos
//!
//! # Example
//!
//! ```
//! use neurocast_core::{LocationRegistry, Model, RbfKernel};
//! use neurocast_core::sim::{simulate_locations, simulate_subject};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let grid = simulate_locations(10, &mut rng);
//! let registry = LocationRegistry::from_locations(&grid);
//!
//! // Two cohorts of simulated subjects, merged into one model.
//! let cohort: Vec<_> = (0..4)
//!     .map(|_| simulate_subject(&grid, 5, 50, &mut rng).unwrap())
//!     .collect();
//! let first = Model::from_cohort(&cohort[0..2], registry.clone(), RbfKernel::default())?;
//! let merged = first.update(&cohort[2..4])?;
//! assert_eq!(merged.n_subs(), 4);
//!
//! let correlation = merged.reconstruct();
//! assert_eq!(correlation.get(0, 0), Some(1.0));
//! # Ok::<(), neurocast_core::ModelError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod estimator;
pub mod kernel;
pub mod model;
pub mod reconstruct;
pub mod sim;
pub mod stats;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ModelError, ModelResult};
pub use estimator::{estimate_subject, Contribution};
pub use kernel::RbfKernel;
pub use model::Model;
pub use reconstruct::Reconstruction;
pub use types::{Location, LocationRegistry, Recording};
