use std::cell::RefCell;

use ascension_primitives::{Handle, Position, Region, new_handle};
use ascension_text::{Document, DocumentChange, DocumentListener};

#[derive(Default)]
struct RecordingListener {
    about_to_change_calls: RefCell<Vec<DocumentChange>>,
    changed_calls: RefCell<Vec<DocumentChange>>,
}

impl DocumentListener for RecordingListener {
    fn about_to_change(&mut self, _doc: &Document, change: &DocumentChange) {
        self.about_to_change_calls.borrow_mut().push(*change);
    }

    fn changed(&mut self, _doc: &Document, change: &DocumentChange) {
        self.changed_calls.borrow_mut().push(*change);
    }
}

#[test]
fn listener_sees_before_and_after_states_in_order() {
    let mut doc = Document::new();
    let recording = new_handle(RecordingListener::default());
    let listener: Handle<dyn DocumentListener> = recording.clone();
    doc.add_listener(&listener);

    doc.insert(Position::origin(), "hi\nbye").unwrap();

    assert_eq!(recording.borrow().about_to_change_calls.borrow().len(), 1);
    assert_eq!(recording.borrow().changed_calls.borrow().len(), 1);
}

#[test]
fn narrow_then_undo_restores_full_access() {
    let mut doc = Document::new();
    doc.insert(Position::origin(), "one\ntwo\nthree").unwrap();
    doc.narrow_to_region(Region::new(Position::new(1, 0), Position::new(2, 5)))
        .unwrap();
    assert!(doc.is_narrowed());

    // Undoing the insert that created the narrowed lines is still allowed;
    // narrowing constrains edits, not history navigation.
    doc.widen();
    assert!(doc.undo().unwrap());
    assert_eq!(doc.number_of_lines(), 1);
    assert!(!doc.is_narrowed());
}

#[test]
fn replace_all_of_document_in_one_compound_change() {
    let mut doc = Document::new();
    doc.insert(Position::origin(), "hello world").unwrap();

    doc.begin_compound_change();
    doc.erase(Region::new(Position::new(0, 0), Position::new(0, 5)))
        .unwrap();
    doc.insert(Position::new(0, 0), "goodbye").unwrap();
    doc.end_compound_change().unwrap();

    assert_eq!(doc.text(doc.region()).unwrap(), "goodbye world");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(doc.region()).unwrap(), "hello world");
}
