use super::*;
use pretty_assertions::assert_eq;

#[test]
fn span_new() {
    let span = Span::new(10, 25);
    assert_eq!(span.start, 10);
    assert_eq!(span.end, 25);
    assert_eq!(span.len(), 15);
    assert!(!span.is_empty());
}

#[test]
fn span_dummy_is_empty() {
    assert_eq!(Span::DUMMY.start, 0);
    assert_eq!(Span::DUMMY.end, 0);
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::default(), Span::DUMMY);
}

#[test]
fn span_contains() {
    let span = Span::new(5, 10);
    assert!(span.contains(5));
    assert!(span.contains(9));
    assert!(!span.contains(10));
    assert!(!span.contains(4));
}

#[test]
fn span_merge() {
    let a = Span::new(5, 10);
    let b = Span::new(8, 20);
    assert_eq!(a.merge(b), Span::new(5, 20));
    assert_eq!(b.merge(a), Span::new(5, 20));
}

#[test]
fn span_display() {
    let span = Span::new(100, 200);
    assert_eq!(format!("{span:?}"), "100..200");
    assert_eq!(format!("{span}"), "100..200");
}
