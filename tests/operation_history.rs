use paper_export::element::{factory, Color, Element, Point};
use paper_export::config::HistoryConfig;
use paper_export::{Config, Document, HistoryError, Operation, Snapshot};

fn stroke_at(x: f32) -> Element {
    factory::create_stroke(vec![Point::new(x, 0.0), Point::new(x, 10.0)], 2.0, Color::BLACK)
}

// Helper to create a test document with some predefined elements
fn create_test_document(count: usize) -> Document {
    let mut document = Document::new();
    for i in 0..count {
        document.apply_operation(Operation::add(stroke_at(i as f32))).unwrap();
    }
    document
}

/// Deterministic pseudo-random sequence for property-style tests
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn random_operation(document: &Document, rng: &mut Lcg) -> Operation {
    let elements = document.current_elements();
    if elements.is_empty() {
        return Operation::add(stroke_at(rng.next(100) as f32));
    }
    let pick = |rng: &mut Lcg| elements[rng.next(elements.len())].id();
    match rng.next(6) {
        0 => Operation::add(stroke_at(rng.next(100) as f32)),
        1 => Operation::AddElement {
            element: stroke_at(1.5),
            index: Some(rng.next(elements.len() + 1)),
        },
        2 => Operation::remove(pick(rng)),
        3 => Operation::Reorder {
            id: pick(rng),
            to_index: rng.next(elements.len()),
        },
        4 => {
            let mut ids = vec![pick(rng), pick(rng)];
            ids.dedup();
            Operation::Group { ids }
        }
        _ => match elements.iter().find(|e| !e.children().is_empty()) {
            Some(group) => Operation::Ungroup { id: group.id() },
            None => Operation::remove(pick(rng)),
        },
    }
}

#[test]
fn test_apply_then_undo_restores_previous_state() {
    let mut document = create_test_document(8);
    let mut rng = Lcg(42);

    for _ in 0..300 {
        let before = document.current_elements().to_vec();
        let operation = random_operation(&document, &mut rng);
        if document.apply_operation(operation).is_err() {
            assert_eq!(document.current_elements(), before.as_slice());
            continue;
        }
        let after = document.current_elements().to_vec();

        document.undo().unwrap();
        assert_eq!(document.current_elements(), before.as_slice());

        document.redo().unwrap();
        assert_eq!(document.current_elements(), after.as_slice());
    }
}

#[test]
fn test_undo_all_returns_to_empty() {
    let mut document = Document::new();
    let mut rng = Lcg(7);
    let mut applied = 0;
    for _ in 0..50 {
        let operation = random_operation(&document, &mut rng);
        if document.apply_operation(operation).is_ok() {
            applied += 1;
        }
    }

    for _ in 0..applied {
        document.undo().unwrap();
    }
    assert!(document.is_empty());
    assert_eq!(document.undo(), Err(HistoryError::NothingToUndo));
}

#[test]
fn test_mutation_counter() {
    let mut document = Document::new();
    assert_eq!(document.mutation_count(), 0);

    assert_eq!(document.undo(), Err(HistoryError::NothingToUndo));
    assert_eq!(document.redo(), Err(HistoryError::NothingToRedo));
    assert_eq!(document.mutation_count(), 0);

    let stroke = stroke_at(1.0);
    let id = stroke.id();
    document.apply_operation(Operation::add(stroke)).unwrap();
    assert_eq!(document.mutation_count(), 1);

    document.undo().unwrap();
    document.redo().unwrap();
    assert_eq!(document.mutation_count(), 3);

    // Rejected operations don't count
    let missing = stroke_at(2.0).id();
    assert_eq!(
        document.apply_operation(Operation::remove(missing)),
        Err(HistoryError::ElementNotFound(missing))
    );
    assert_eq!(document.mutation_count(), 3);

    document.apply_operation(Operation::remove(id)).unwrap();
    assert_eq!(document.mutation_count(), 4);
    assert!(document.is_empty());
}

#[test]
fn test_new_operation_discards_redo() {
    let mut document = create_test_document(2);
    document.undo().unwrap();
    assert!(document.can_redo());

    document.apply_operation(Operation::add(stroke_at(9.0))).unwrap();
    assert!(!document.can_redo());
    assert_eq!(document.redo(), Err(HistoryError::NothingToRedo));
}

#[test]
fn test_group_and_ungroup_round_trip() {
    let mut document = create_test_document(4);
    let before = document.current_elements().to_vec();
    let ids = vec![before[0].id(), before[2].id()];

    document.apply_operation(Operation::Group { ids }).unwrap();
    assert_eq!(document.len(), 3);
    let group = document.current_elements()[0].clone();
    assert_eq!(group.children(), &[before[0].clone(), before[2].clone()]);
    assert_eq!(document.last_entry().map(|e| e.label()), Some("group"));

    document.apply_operation(Operation::Ungroup { id: group.id() }).unwrap();
    assert_eq!(document.len(), 4);
    assert_eq!(document.current_elements()[0], before[0]);
    assert_eq!(document.current_elements()[1], before[2]);

    document.undo().unwrap();
    document.undo().unwrap();
    assert_eq!(document.current_elements(), before.as_slice());
}

#[test]
fn test_history_limit() {
    let mut document = Document::with_history_limit(Some(3));
    for i in 0..5 {
        document.apply_operation(Operation::add(stroke_at(i as f32))).unwrap();
    }
    assert_eq!(document.history().undo_len(), 3);
    for _ in 0..3 {
        document.undo().unwrap();
    }
    assert!(!document.can_undo());
    assert_eq!(document.len(), 2);
}

#[test]
fn test_zero_history_limit_still_counts_mutations() {
    let mut document = Document::with_history_limit(Some(0));
    let snapshot = Snapshot::capture(&document);

    document.apply_operation(Operation::add(stroke_at(1.0))).unwrap();
    assert_eq!(document.len(), 1);
    assert_eq!(document.mutation_count(), 1);
    assert!(!document.can_undo());
    assert!(snapshot.is_stale(&document));
    assert_eq!(document.undo(), Err(HistoryError::NothingToUndo));
    assert_eq!(document.mutation_count(), 1);
}

#[test]
fn test_document_from_history_config() {
    let config = Config::from_json_str(r#"{ "history": { "limit": 2 } }"#).unwrap();
    let mut document = Document::with_config(&config.history);
    for i in 0..4 {
        document.apply_operation(Operation::add(stroke_at(i as f32))).unwrap();
    }
    assert_eq!(document.history().undo_len(), 2);

    let mut unbounded = Document::with_config(&HistoryConfig::default());
    for i in 0..4 {
        unbounded.apply_operation(Operation::add(stroke_at(i as f32))).unwrap();
    }
    assert_eq!(unbounded.history().undo_len(), 4);
}

#[test]
fn test_clear_history_keeps_content() {
    let mut document = create_test_document(3);
    document.clear_history();
    assert!(!document.can_undo());
    assert_eq!(document.len(), 3);
    assert!(document.element(document.current_elements()[1].id()).is_some());
}
