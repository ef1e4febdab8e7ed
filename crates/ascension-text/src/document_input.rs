use crate::document::Document;

/// The document's binding to whatever owns its on-disk (or otherwise
/// external) representation (spec component F). `ascension-fileio`'s
/// `TextFileDocumentInput` is the concrete implementation; `Document`
/// itself only needs to ask whether a first modification should be let
/// through.
pub trait DocumentInput {
    /// Called once, the moment a document that has never been modified is
    /// about to receive its first edit. Returning `false` rejects the edit
    /// with `AscensionError::ChangeRejected` (e.g. the backing file was
    /// deleted out from under the document and the input wants a revert
    /// first).
    fn is_changeable(&self, doc: &Document) -> bool {
        let _ = doc;
        true
    }
}
