use crate::element::{Element, ElementId, ElementPayload};
use crate::error::HistoryError;

/// Reversible edits that can be applied to a document
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert an element at `index`, or on top of the paper when `None`
    AddElement {
        element: Element,
        index: Option<usize>,
    },

    /// Remove an element from the paper
    RemoveElement { id: ElementId },

    /// Move an element so that it ends up at `to_index` in z-order
    Reorder { id: ElementId, to_index: usize },

    /// Replace the given elements with a single group holding them in z-order
    Group { ids: Vec<ElementId> },

    /// Replace a group with its children
    Ungroup { id: ElementId },
}

impl Operation {
    /// Add an element on top of the paper
    pub fn add(element: Element) -> Self {
        Operation::AddElement {
            element,
            index: None,
        }
    }

    pub fn remove(id: ElementId) -> Self {
        Operation::RemoveElement { id }
    }

    /// Short name for logs and UI labels
    pub fn label(&self) -> &'static str {
        match self {
            Operation::AddElement { .. } => "add element",
            Operation::RemoveElement { .. } => "remove element",
            Operation::Reorder { .. } => "reorder",
            Operation::Group { .. } => "group",
            Operation::Ungroup { .. } => "ungroup",
        }
    }

    /// Apply the operation, returning the record needed to undo it.
    ///
    /// Validation happens before any mutation, so on error `elements` is left
    /// untouched.
    pub(crate) fn apply(self, elements: &mut Vec<Element>) -> Result<Change, HistoryError> {
        match self {
            Operation::AddElement { element, index } => {
                if let Some(id) = first_collision(elements, &element) {
                    return Err(HistoryError::DuplicateElement(id));
                }
                let index = index.unwrap_or(elements.len());
                if index > elements.len() {
                    return Err(HistoryError::IndexOutOfBounds {
                        index,
                        len: elements.len(),
                    });
                }
                elements.insert(index, element.clone());
                Ok(Change::Inserted { element, index })
            }

            Operation::RemoveElement { id } => {
                let index = position_of(elements, id)?;
                let element = elements.remove(index);
                Ok(Change::Removed { element, index })
            }

            Operation::Reorder { id, to_index } => {
                let from = position_of(elements, id)?;
                if to_index >= elements.len() {
                    return Err(HistoryError::IndexOutOfBounds {
                        index: to_index,
                        len: elements.len(),
                    });
                }
                move_element(elements, from, to_index);
                Ok(Change::Moved {
                    id,
                    from,
                    to: to_index,
                })
            }

            Operation::Group { ids } => {
                if ids.is_empty() {
                    return Err(HistoryError::EmptyGroup);
                }
                let mut indices = Vec::with_capacity(ids.len());
                for id in &ids {
                    let index = position_of(elements, *id)?;
                    if indices.contains(&index) {
                        return Err(HistoryError::DuplicateElement(*id));
                    }
                    indices.push(index);
                }
                indices.sort_unstable();

                let members: Vec<(usize, Element)> = indices
                    .iter()
                    .map(|&i| (i, elements[i].clone()))
                    .collect();
                let children = members.iter().map(|(_, e)| e.clone()).collect();
                let group = Element::new(ElementPayload::Group(children));
                let index = indices[0];

                let change = Change::Grouped {
                    group,
                    index,
                    members,
                };
                change.reapply(elements);
                Ok(change)
            }

            Operation::Ungroup { id } => {
                let index = position_of(elements, id)?;
                let group = elements[index].clone();
                if !matches!(group.payload(), ElementPayload::Group(_)) {
                    return Err(HistoryError::NotAGroup(id));
                }
                let change = Change::Ungrouped { group, index };
                change.reapply(elements);
                Ok(change)
            }
        }
    }
}

/// What an applied operation did, with enough state to undo it exactly
#[derive(Debug, Clone)]
pub enum Change {
    Inserted {
        element: Element,
        index: usize,
    },
    Removed {
        element: Element,
        index: usize,
    },
    Moved {
        id: ElementId,
        from: usize,
        to: usize,
    },
    Grouped {
        group: Element,
        index: usize,
        /// Original positions, ascending
        members: Vec<(usize, Element)>,
    },
    Ungrouped {
        group: Element,
        index: usize,
    },
}

impl Change {
    /// Redo the change on a sequence in the state it was originally applied to
    pub(crate) fn reapply(&self, elements: &mut Vec<Element>) {
        match self {
            Change::Inserted { element, index } => elements.insert(*index, element.clone()),
            Change::Removed { index, .. } => {
                elements.remove(*index);
            }
            Change::Moved { from, to, .. } => move_element(elements, *from, *to),
            Change::Grouped {
                group,
                index,
                members,
            } => {
                for (i, _) in members.iter().rev() {
                    elements.remove(*i);
                }
                elements.insert(*index, group.clone());
            }
            Change::Ungrouped { group, index } => {
                elements.remove(*index);
                for (offset, child) in group.children().iter().enumerate() {
                    elements.insert(*index + offset, child.clone());
                }
            }
        }
    }

    /// Undo the change on a sequence in the state it left behind
    pub(crate) fn revert(&self, elements: &mut Vec<Element>) {
        match self {
            Change::Inserted { index, .. } => {
                elements.remove(*index);
            }
            Change::Removed { element, index } => elements.insert(*index, element.clone()),
            Change::Moved { from, to, .. } => move_element(elements, *to, *from),
            Change::Grouped { index, members, .. } => {
                elements.remove(*index);
                for (i, member) in members {
                    elements.insert(*i, member.clone());
                }
            }
            Change::Ungrouped { group, index } => {
                let count = group.children().len();
                elements.drain(*index..*index + count);
                elements.insert(*index, group.clone());
            }
        }
    }
}

fn position_of(elements: &[Element], id: ElementId) -> Result<usize, HistoryError> {
    elements
        .iter()
        .position(|e| e.id() == id)
        .ok_or(HistoryError::ElementNotFound(id))
}

fn contains_id(elements: &[Element], id: ElementId) -> bool {
    elements
        .iter()
        .any(|e| e.id() == id || contains_id(e.children(), id))
}

/// First id in `element`'s tree, itself included, already present in `elements`
fn first_collision(elements: &[Element], element: &Element) -> Option<ElementId> {
    if contains_id(elements, element.id()) {
        return Some(element.id());
    }
    element
        .children()
        .iter()
        .find_map(|child| first_collision(elements, child))
}

fn move_element(elements: &mut Vec<Element>, from: usize, to: usize) {
    let element = elements.remove(from);
    elements.insert(to, element);
}
