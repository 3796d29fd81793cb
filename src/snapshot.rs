use std::sync::Arc;

use crate::document::{Document, DocumentId};
use crate::element::Element;
use crate::util::time;

/// Immutable, point-in-time copy of a document's elements.
///
/// The element list is shared behind an [`Arc`] and each element shares its
/// payload with the live document, so capture costs one allocation plus a
/// reference count bump per element. Nothing can mutate a snapshot after
/// capture, which is what lets it cross to the export workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    document_id: DocumentId,
    sequence: u64,
    captured_at: u64,
    elements: Arc<[Element]>,
}

impl Snapshot {
    /// Capture the document's current content
    pub fn capture(document: &Document) -> Self {
        let elements: Arc<[Element]> = document.current_elements().iter().cloned().collect();
        let snapshot = Self {
            document_id: document.id(),
            sequence: document.mutation_count(),
            captured_at: time::timestamp_millis(),
            elements,
        };
        log::debug!(
            "Captured snapshot of document {} at sequence {} ({} elements)",
            snapshot.document_id,
            snapshot.sequence,
            snapshot.elements.len()
        );
        snapshot
    }

    /// Rebuild a snapshot from archived parts
    pub(crate) fn from_parts(
        document_id: DocumentId,
        sequence: u64,
        captured_at: u64,
        elements: Vec<Element>,
    ) -> Self {
        Self {
            document_id,
            sequence,
            captured_at,
            elements: elements.into(),
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Mutation counter of the document at capture time
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Capture time in milliseconds since the UNIX epoch
    pub fn captured_at(&self) -> u64 {
        self.captured_at
    }

    /// Captured elements in z-order, bottom first
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True when `document` has been mutated since this snapshot was taken
    pub fn is_stale(&self, document: &Document) -> bool {
        self.document_id != document.id() || self.sequence != document.mutation_count()
    }
}

impl Document {
    /// Rebuild a document holding the content of a snapshot, with empty history
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::from_elements(snapshot.elements().to_vec())
    }
}
