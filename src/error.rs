//! Error types for the host-facing layer.
//!
//! The generation pipeline itself never fails; these cover loading
//! declarations, writing sources and maintaining the output cache.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("source directory '{}' does not exist", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid declarations in '{}': {}", .path.display(), join_errors(.errors))]
    Invalid {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
