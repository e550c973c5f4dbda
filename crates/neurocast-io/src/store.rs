//! File-backed save/load for models and recordings
//!
//! Formats are dispatched on the file extension, keeping that concern out
//! of the core entirely:
//!
//! - `.mo` — aggregate model, binary (bincode; bit-exact round trip)
//! - `.bo` — recording, binary
//! - `.json` — either object, human-inspectable JSON
//!
//! Binary is the canonical form: every matrix entry and count round-trips
//! bit for bit. JSON goes through decimal text and is for inspection, not
//! archival.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use neurocast_core::{Model, Recording};

use crate::error::{IoError, IoResult};

/// On-disk encoding, decided by file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Format {
    Binary,
    Json,
}

fn format_for(path: &Path, binary_ext: &'static str, expected: &'static str) -> IoResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == binary_ext => Ok(Format::Binary),
        Some("json") => Ok(Format::Json),
        _ => Err(IoError::UnsupportedExtension {
            path: path.to_path_buf(),
            expected,
        }),
    }
}

fn write_value<T: Serialize>(value: &T, path: &Path, format: Format) -> IoResult<()> {
    let file = File::create(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);
    match format {
        Format::Binary => bincode::serialize_into(writer, value).map_err(|e| IoError::Binary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Format::Json => {
            serde_json::to_writer_pretty(writer, value).map_err(|e| IoError::Json {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }
}

fn read_value<T: DeserializeOwned>(path: &Path, format: Format) -> IoResult<T> {
    let file = File::open(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    match format {
        Format::Binary => bincode::deserialize_from(reader).map_err(|e| IoError::Binary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Format::Json => serde_json::from_reader(reader).map_err(|e| IoError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Save an aggregate model to `.mo` (binary) or `.json`.
///
/// # Errors
///
/// Filesystem and serialization failures, or an unrecognized extension.
pub fn save_model<P: AsRef<Path>>(model: &Model, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_for(path, "mo", ".mo or .json")?;
    write_value(model, path, format)?;
    debug!(path = %path.display(), n_subs = model.n_subs(), "saved model");
    Ok(())
}

/// Load an aggregate model from `.mo` (binary) or `.json`.
///
/// # Errors
///
/// Filesystem and deserialization failures, or an unrecognized extension.
pub fn load_model<P: AsRef<Path>>(path: P) -> IoResult<Model> {
    let path = path.as_ref();
    let format = format_for(path, "mo", ".mo or .json")?;
    let model: Model = read_value(path, format)?;
    debug!(path = %path.display(), n_subs = model.n_subs(), "loaded model");
    Ok(model)
}

/// Save a recording to `.bo` (binary) or `.json`.
///
/// # Errors
///
/// Filesystem and serialization failures, or an unrecognized extension.
pub fn save_recording<P: AsRef<Path>>(recording: &Recording, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_for(path, "bo", ".bo or .json")?;
    write_value(recording, path, format)?;
    debug!(
        path = %path.display(),
        channels = recording.n_channels(),
        samples = recording.n_samples(),
        "saved recording"
    );
    Ok(())
}

/// Load a recording from `.bo` (binary) or `.json`.
///
/// # Errors
///
/// Filesystem and deserialization failures, or an unrecognized extension.
pub fn load_recording<P: AsRef<Path>>(path: P) -> IoResult<Recording> {
    let path = path.as_ref();
    let format = format_for(path, "bo", ".bo or .json")?;
    read_value(path, format)
}

// ============================================================================
// Tests
// ============================================================================
