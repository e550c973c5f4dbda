//! Neurocast IO - persistence for models and recordings
//!
//! Thin serialization layer around [`neurocast_core`]: aggregate models
//! (`.mo`) and recordings (`.bo`) are written as bincode snapshots whose
//! numeric fields round-trip bit for bit, with `.json` variants for
//! inspection. All format dispatch on file extensions lives here; the
//! core never sees a path.
//!
//! # Example
//!
//! ```rust,ignore
//! use neurocast_io::{load_model, save_model};
//!
//! let model = load_model("pyfr_20mm.mo")?;
//! let bigger = model.update(&new_cohort)?;
//! save_model(&bigger, "pyfr_20mm_updated.mo")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod store;

pub use error::{IoError, IoResult};
pub use store::{load_model, load_recording, save_model, save_recording};
