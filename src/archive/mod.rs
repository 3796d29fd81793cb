//! Zip archive format for exported papers.
//!
//! An archive holds `manifest.json` plus one JSON entry per element, named
//! `elements/{z-index}-{element id}.json`.

mod codec;
mod manifest;
mod reader;
mod writer;

pub use codec::{decode_element, encode_element};
pub use manifest::{entry_name, Manifest, ManifestEntry, FORMAT_VERSION, MANIFEST_NAME};
pub use reader::{decode_archive, import_archive, read_archive, ArchiveContents};
pub use writer::{
    encode_snapshot, write_archive, SkippedElement, WriteError, WriteObserver, WriteOptions,
    WriteReport,
};
