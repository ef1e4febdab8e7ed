use ascension_primitives::{Position, Region};

use crate::change::DocumentChange;
use crate::document::Document;

/// A partitioner's opinion of what's at a given document position. The
/// identity of a content type is up to the caller; `ContentType::default()`
/// ("DEFAULT_CONTENT") is the one partition a document with no partitioner
/// installed reports for its entire length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentType(pub u32);

impl ContentType {
    pub const DEFAULT: ContentType = ContentType(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub content_type: ContentType,
    pub region: Region,
}

/// Divides a document's content into typed regions (spec §4.4,
/// "partitioner hook"). Installed partitioners are notified before and
/// after every edit so they can keep cached partition boundaries in sync
/// without rescanning the whole document.
pub trait DocumentPartitioner {
    fn partition(&self, doc: &Document, at: Position) -> Partition;
    fn about_to_change(&mut self, doc: &Document);
    fn changed(&mut self, doc: &Document, change: &DocumentChange);
}

/// The partitioner installed on a fresh document: everything is one
/// partition of [`ContentType::DEFAULT`] spanning the whole document.
#[derive(Debug, Default)]
pub struct NullPartitioner;

impl DocumentPartitioner for NullPartitioner {
    fn partition(&self, doc: &Document, _at: Position) -> Partition {
        Partition {
            content_type: ContentType::DEFAULT,
            region: doc.region(),
        }
    }

    fn about_to_change(&mut self, _doc: &Document) {}

    fn changed(&mut self, _doc: &Document, _change: &DocumentChange) {}
}
