//! Error taxonomy for level ingestion.
//!
//! `FormatError` and `LevelError::Io`/`LevelError::Json` on the terrain
//! inputs are the only errors that reach a caller. Everything else is
//! logged by the producer that hit it and the offending record is skipped.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The terrain container disagrees with its descriptor or is unreadable
/// under the selected layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("terrain file too small for header: {len} bytes")]
    TruncatedHeader { len: usize },

    #[error(
        "terrain header mismatch: file has version={found_version}, size={found_size}, \
         descriptor declares version={expected_version}, size={expected_size}"
    )]
    HeaderMismatch {
        expected_version: u8,
        expected_size: u32,
        found_version: u8,
        found_size: u32,
    },

    #[error("height payload truncated ({layout} layout): expected {expected} bytes, {available} available")]
    TruncatedHeights {
        layout: String,
        expected: usize,
        available: usize,
    },

    #[error("invalid terrain descriptor: {0}")]
    Descriptor(String),
}

/// A single Road or Material record that cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("road {id} has insufficient nodes: {count}")]
    TooFewNodes { id: String, count: usize },

    #[error("road {id} has no material assigned")]
    MissingMaterial { id: String },

    #[error("road {id} has a malformed node at index {index}")]
    MalformedNode { id: String, index: usize },

    #[error("malformed {kind} record: {reason}")]
    MalformedRecord { kind: &'static str, reason: String },
}

/// Top-level error returned by fallible operations.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no terrain found under {}", .0.display())]
    TerrainNotFound(PathBuf),
}

impl LevelError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LevelError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        LevelError::Json {
            path: path.into(),
            source,
        }
    }
}
