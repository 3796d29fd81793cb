use paper_export::element::{factory, Color, ElementKind, ElementPayload, MutableStroke, Point};

fn create_test_stroke() -> paper_export::Element {
    let points = vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)];
    factory::create_stroke(points, 2.0, Color::RED)
}

#[test]
fn test_element_creation() {
    let stroke = create_test_stroke();
    assert_eq!(stroke.kind(), ElementKind::Stroke);
    assert_eq!(stroke.kind().as_str(), "stroke");
    assert!(stroke.created_at() > 0);

    let image = factory::create_image(Point::new(5.0, 5.0), 2, 2, vec![255; 16]);
    assert_eq!(image.kind(), ElementKind::Image);

    let text = factory::create_text("hello", Point::new(0.0, 0.0), 14.0, Color::BLACK);
    assert_eq!(text.kind(), ElementKind::Text);
    match text.payload() {
        ElementPayload::Text(t) => assert_eq!(t.content(), "hello"),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_element_ids_are_unique() {
    let a = create_test_stroke();
    let b = create_test_stroke();
    assert_ne!(a.id(), b.id());
    // Same content, different identity
    assert_ne!(a, b);
}

#[test]
fn test_clone_shares_payload() {
    let stroke = create_test_stroke();
    let copy = stroke.clone();
    assert!(copy.shares_payload(&stroke));
    assert_eq!(copy, stroke);
}

#[test]
fn test_group_children() {
    let children = vec![create_test_stroke(), create_test_stroke()];
    let group = factory::create_group(children.clone());
    assert_eq!(group.kind(), ElementKind::Group);
    assert_eq!(group.children(), children.as_slice());
    assert!(create_test_stroke().children().is_empty());
}

#[test]
fn test_mutable_stroke_commits_points() {
    let mut pending = MutableStroke::new(Color::BLUE, 3.0);
    pending.add_point(Point::new(1.0, 1.0));
    pending.add_point(Point::new(2.0, 3.0));
    assert_eq!(pending.points().len(), 2);

    let stroke = pending.finish();
    assert_eq!(stroke.points(), &[Point::new(1.0, 1.0), Point::new(2.0, 3.0)]);
    assert_eq!(stroke.color(), Color::BLUE);
    assert_eq!(stroke.thickness(), 3.0);
}

#[test]
fn test_image_pixel_validation() {
    let complete = factory::create_image(Point::default(), 2, 1, vec![0; 8]);
    let truncated = factory::create_image(Point::default(), 2, 1, vec![0; 5]);
    match (complete.payload(), truncated.payload()) {
        (ElementPayload::Image(ok), ElementPayload::Image(bad)) => {
            assert!(ok.has_valid_pixels());
            assert!(!bad.has_valid_pixels());
            assert_eq!(bad.expected_len(), Some(8));
        }
        _ => panic!("expected images"),
    }
}
