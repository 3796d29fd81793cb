use std::collections::VecDeque;

use super::{Change, Operation};
use crate::element::Element;
use crate::error::HistoryError;

/// An applied operation as kept on the undo/redo stacks
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    label: &'static str,
    change: Change,
}

impl HistoryEntry {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn change(&self) -> &Change {
        &self.change
    }
}

/// Manages the history of applied operations for undo/redo functionality
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Entries that can be undone, oldest first
    undo_stack: VecDeque<HistoryEntry>,
    /// Entries that can be redone, most recently undone last
    redo_stack: Vec<HistoryEntry>,
    /// Maximum number of undo entries kept, unbounded when `None`
    limit: Option<usize>,
}

impl History {
    /// Creates a new empty, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history that forgets the oldest entries beyond `limit`
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Apply an operation and record it if successful, returning its label.
    ///
    /// The edit stays applied even when a limit of zero means it cannot be
    /// undone.
    pub fn apply(&mut self, operation: Operation, elements: &mut Vec<Element>) -> Result<&'static str, HistoryError> {
        let label = operation.label();
        let change = operation.apply(elements)?;

        self.undo_stack.push_back(HistoryEntry { label, change });
        self.redo_stack.clear();

        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                if let Some(dropped) = self.undo_stack.pop_front() {
                    log::debug!("History limit {} reached, forgetting '{}'", limit, dropped.label);
                }
            }
        }

        Ok(label)
    }

    /// Undo the last applied operation
    pub fn undo(&mut self, elements: &mut Vec<Element>) -> Result<&HistoryEntry, HistoryError> {
        let entry = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        entry.change.revert(elements);
        self.redo_stack.push(entry);
        self.redo_stack.last().ok_or(HistoryError::NothingToRedo)
    }

    /// Redo the last undone operation
    pub fn redo(&mut self, elements: &mut Vec<Element>) -> Result<&HistoryEntry, HistoryError> {
        let entry = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        entry.change.reapply(elements);
        self.undo_stack.push_back(entry);
        self.undo_stack.back().ok_or(HistoryError::NothingToUndo)
    }

    /// Returns true if there are operations that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are operations that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The entry the next undo would revert
    pub fn last_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{factory, Color, Point};

    fn dot(x: f32) -> Element {
        factory::create_stroke(vec![Point::new(x, 0.0)], 2.0, Color::RED)
    }

    #[test]
    fn test_apply_clears_redo_stack() {
        let mut elements = Vec::new();
        let mut history = History::new();

        history.apply(Operation::add(dot(1.0)), &mut elements).unwrap();
        history.undo(&mut elements).unwrap();
        assert!(history.can_redo());

        history.apply(Operation::add(dot(2.0)), &mut elements).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut elements).unwrap_err(), HistoryError::NothingToRedo);
    }

    #[test]
    fn test_limit_drops_oldest_entries() {
        let mut elements = Vec::new();
        let mut history = History::with_limit(Some(2));

        for i in 0..4 {
            history.apply(Operation::add(dot(i as f32)), &mut elements).unwrap();
        }
        assert_eq!(history.undo_len(), 2);

        history.undo(&mut elements).unwrap();
        history.undo(&mut elements).unwrap();
        assert_eq!(history.undo(&mut elements).unwrap_err(), HistoryError::NothingToUndo);
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_zero_limit_applies_without_recording() {
        let mut elements = Vec::new();
        let mut history = History::with_limit(Some(0));

        assert_eq!(history.apply(Operation::add(dot(1.0)), &mut elements), Ok("add element"));
        assert_eq!(elements.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.undo(&mut elements).unwrap_err(), HistoryError::NothingToUndo);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_failed_apply_is_not_recorded() {
        let mut elements = Vec::new();
        let mut history = History::new();
        let missing = dot(0.0).id();

        assert!(history.apply(Operation::remove(missing), &mut elements).is_err());
        assert!(!history.can_undo());
    }
}
