use serde::{Deserialize, Serialize};

use crate::document::DocumentId;
use crate::element::{ElementId, ElementKind};

/// Current archive format version
pub const FORMAT_VERSION: u32 = 1;

/// Name of the manifest entry inside the archive
pub const MANIFEST_NAME: &str = "manifest.json";

/// Describes the content of an archive.
///
/// `entries` lists the element entry names in z-order; readers rebuild the
/// element sequence from it rather than from the container's own ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub document_id: DocumentId,
    /// Mutation counter of the document when the snapshot was captured
    pub sequence: u64,
    pub captured_at: u64,
    pub element_count: usize,
    pub entries: Vec<ManifestEntry>,
    /// Elements left out because they could not be serialized
    #[serde(default)]
    pub skipped: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub id: ElementId,
    pub kind: ElementKind,
}

/// Entry name for an element, sortable by z-order
pub fn entry_name(z_index: usize, id: ElementId) -> String {
    format!("elements/{:06}-{}.json", z_index, id)
}
