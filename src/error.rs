use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::document::DocumentId;
use crate::element::ElementId;

/// Errors raised by the document model when applying or reverting edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Index {index} out of bounds for {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Element already present: {0}")]
    DuplicateElement(ElementId),

    #[error("Cannot create an empty group")]
    EmptyGroup,

    #[error("Element {0} is not a group")]
    NotAGroup(ElementId),
}

/// Errors that prevent a single element from being encoded
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Image pixel buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    InvalidPixelBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Image of {width}x{height} pixels is too large to encode")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Non-finite value in {field}")]
    NonFinite { field: &'static str },

    #[error("Failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Typed failure reason delivered with a failed export.
///
/// Sources are shared so the same outcome can reach both the completion
/// callback and the export handle.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("Failed to serialize element {id}: {source}")]
    Serialization {
        id: ElementId,
        #[source]
        source: Arc<EncodeError>,
    },

    #[error("Invalid export destination {path}: {reason}")]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("Document {0} is already being exported")]
    AlreadyExporting(DocumentId),

    #[error("Export worker stopped without a result")]
    WorkerLost,
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// Errors that can occur while reading an archive back
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read archive: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid zip container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid embedded data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Archive has no manifest")]
    MissingManifest,

    #[error("Unsupported archive format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Corrupt archive: {0}")]
    Corrupt(String),
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
