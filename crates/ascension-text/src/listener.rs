use crate::change::DocumentChange;
use crate::document::Document;

/// Observes edits to a [`Document`] (spec §3.6, §5).
///
/// `about_to_change` fires before the buffer is mutated, with the document
/// still in its pre-edit state; `changed` fires after, with the document
/// already updated. Both receive the same [`DocumentChange`] describing
/// what was erased and what replaced it.
pub trait DocumentListener {
    fn about_to_change(&mut self, doc: &Document, change: &DocumentChange);
    fn changed(&mut self, doc: &Document, change: &DocumentChange);
}
