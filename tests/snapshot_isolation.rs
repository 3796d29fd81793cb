use paper_export::archive::{self, WriteOptions};
use paper_export::element::{factory, Color, Element, Point};
use paper_export::{Document, Operation, Snapshot};

fn stroke_at(x: f32) -> Element {
    factory::create_stroke(vec![Point::new(x, x), Point::new(x + 4.0, x)], 1.5, Color::BLACK)
}

fn create_test_document(count: usize) -> Document {
    let mut document = Document::new();
    for i in 0..count {
        document.apply_operation(Operation::add(stroke_at(i as f32))).unwrap();
    }
    document
}

#[test]
fn test_snapshot_is_tagged_with_mutation_count() {
    let mut document = create_test_document(3);
    let first = Snapshot::capture(&document);
    assert_eq!(first.sequence(), 3);
    assert_eq!(first.document_id(), document.id());
    assert!(!first.is_stale(&document));

    document.undo().unwrap();
    let second = Snapshot::capture(&document);
    assert!(first.is_stale(&document));
    assert!(second.sequence() > first.sequence());
    assert_eq!(second.len(), 2);
}

#[test]
fn test_snapshot_unaffected_by_later_operations() {
    let mut document = create_test_document(5);
    let snapshot = Snapshot::capture(&document);
    let captured = snapshot.elements().to_vec();

    let first = document.current_elements()[0].id();
    document.apply_operation(Operation::remove(first)).unwrap();
    document.apply_operation(Operation::add(stroke_at(99.0))).unwrap();
    let ids = document.current_elements().iter().map(Element::id).collect();
    document.apply_operation(Operation::Group { ids }).unwrap();
    document.undo().unwrap();

    assert_eq!(snapshot.elements(), captured.as_slice());
    assert_eq!(snapshot.sequence(), 5);
}

#[test]
fn test_snapshot_serializes_identically_after_mutation() {
    let mut document = create_test_document(10);
    let snapshot = Snapshot::capture(&document);
    let (before, _) = archive::encode_snapshot(&snapshot, WriteOptions::default()).unwrap();

    for i in 0..5 {
        document.apply_operation(Operation::add(stroke_at(100.0 + i as f32))).unwrap();
    }
    let last = document.current_elements()[0].id();
    document.apply_operation(Operation::Reorder { id: last, to_index: 9 }).unwrap();
    document.undo().unwrap();
    document.undo().unwrap();

    let (after, _) = archive::encode_snapshot(&snapshot, WriteOptions::default()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_capture_shares_payloads() {
    let document = create_test_document(3);
    let snapshot = Snapshot::capture(&document);
    for (live, captured) in document.current_elements().iter().zip(snapshot.elements()) {
        assert!(live.shares_payload(captured));
    }
}

#[test]
fn test_snapshot_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + 'static>(_: &T) {}
    let snapshot = Snapshot::capture(&create_test_document(1));
    assert_send_sync(&snapshot);

    let handle = std::thread::spawn(move || snapshot.len());
    assert_eq!(handle.join().unwrap(), 1);
}

#[test]
fn test_document_from_snapshot() {
    let document = create_test_document(4);
    let snapshot = Snapshot::capture(&document);
    let restored = Document::from_snapshot(&snapshot);
    assert_eq!(restored.current_elements(), document.current_elements());
    assert_ne!(restored.id(), document.id());
    assert!(!restored.can_undo());
}
