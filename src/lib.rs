#![warn(clippy::all, rust_2018_idioms)]

pub mod archive;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod id_generator;
pub mod operation;
pub mod snapshot;
pub mod util;

pub use config::Config;
pub use document::{Document, DocumentId};
pub use element::{Element, ElementId, ElementKind};
pub use error::{ArchiveError, ExportError, HistoryError};
pub use export::{ExportCoordinator, ExportHandle, ExportOutcome, ExportStatus};
pub use operation::Operation;
pub use snapshot::Snapshot;
