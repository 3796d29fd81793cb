use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::HistoryConfig;
use crate::element::{Element, ElementId};
use crate::error::HistoryError;
use crate::id_generator;
use crate::operation::{History, HistoryEntry, Operation};

/// Identifier of a paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(id_generator::generate_uuid())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// The live, undoable content of one paper.
///
/// All mutation goes through [`Document::apply_operation`], [`Document::undo`]
/// and [`Document::redo`], which take `&mut self`. A [`crate::Snapshot`]
/// borrows the document shared, so capturing can never overlap a mutation.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    elements: Vec<Element>,
    history: History,
    mutation_count: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    /// Create an empty document whose undo stack keeps at most `limit` entries
    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            id: DocumentId::new(),
            elements: Vec::new(),
            history: History::with_limit(limit),
            mutation_count: 0,
        }
    }

    /// Create an empty document using the configured history settings
    pub fn with_config(config: &HistoryConfig) -> Self {
        Self::with_history_limit(config.limit)
    }

    /// Create a document from existing content, with an empty history
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            ..Self::new()
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Apply an edit, record it for undo and drop anything that could be redone
    pub fn apply_operation(&mut self, operation: Operation) -> Result<(), HistoryError> {
        let label = self.history.apply(operation, &mut self.elements)?;
        log::trace!("Applied '{}' to document {}", label, self.id);
        self.mutation_count += 1;
        Ok(())
    }

    /// Revert the most recent operation
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let entry = self.history.undo(&mut self.elements)?;
        log::trace!("Undid '{}' on document {}", entry.label(), self.id);
        self.mutation_count += 1;
        Ok(())
    }

    /// Re-apply the most recently undone operation
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let entry = self.history.redo(&mut self.elements)?;
        log::trace!("Redid '{}' on document {}", entry.label(), self.id);
        self.mutation_count += 1;
        Ok(())
    }

    /// The live element sequence in z-order, bottom first
    pub fn current_elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Monotonic counter bumped by every successful mutation
    pub fn mutation_count(&self) -> u64 {
        self.mutation_count
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Forget all undo/redo entries without touching the content
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Most recent undoable entry, if any
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last_undo()
    }
}
