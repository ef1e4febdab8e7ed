use crate::{Position, Region};

/// The closed error taxonomy shared by the document, encoding and search
/// layers (spec §6.3). Each component re-exports the variants it raises
/// rather than inventing parallel enums, so callers crossing component
/// boundaries match on one type.
#[derive(Debug, thiserror::Error)]
pub enum AscensionError {
    #[error("position {0} lies outside the document")]
    BadPosition(Position),

    #[error("region {0:?} lies outside the document")]
    BadRegion(Region),

    #[error("attempted to mutate a read-only document")]
    ReadOnlyDocument,

    #[error("edit crosses the accessible-region boundary")]
    DocumentAccessViolation,

    #[error("the document input rejected the change")]
    ChangeRejected,

    #[error("no codec is registered for encoding \"{0}\"")]
    UnsupportedEncoding(String),

    #[error("character is not representable in the target encoding")]
    UnmappableCharacter,

    #[error("input is not well-formed in the source encoding")]
    MalformedInput,

    #[error("pattern syntax error at index {index:?} in \"{pattern}\": {message}")]
    PatternSyntax {
        message: String,
        index: Option<usize>,
        pattern: String,
    },

    #[error("operation is not valid in the current state: {0}")]
    IllegalState(&'static str),
}

/// Raised when [`replace_all`](../ascension_search/struct.TextSearcher.html)-style
/// batch operations are interrupted partway through. Carries the number of
/// replacements already committed so the caller can decide whether to keep
/// them or roll back via `Document::undo`.
#[derive(Debug, thiserror::Error)]
#[error("operation interrupted after {count_so_far} replacement(s): {source}")]
pub struct ReplacementInterrupted<E: std::error::Error + 'static> {
    pub count_so_far: usize,
    #[source]
    pub source: E,
}

impl<E: std::error::Error + 'static> ReplacementInterrupted<E> {
    pub fn new(count_so_far: usize, source: E) -> Self {
        Self {
            count_so_far,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AscensionError>;
