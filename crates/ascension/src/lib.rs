//! Facade crate: re-exports the Ascension text-editing engine's
//! components under one name and wires up structured logging.
//!
//! Application entry points depend on this crate alone; library code
//! that only needs one component (e.g. just the encoding framework)
//! should depend on that `ascension-*` crate directly instead.

pub use ascension_config as config;
pub use ascension_encoding as encoding;
pub use ascension_fileio as fileio;
pub use ascension_primitives as primitives;
pub use ascension_rules as rules;
pub use ascension_search as search;
pub use ascension_text as text;
pub use ascension_unicode as unicode;
pub use ascension_viewport as viewport;

pub use ascension_primitives::{
    AscensionError, Direction, Handle, Newline, Position, Region, ReplacementInterrupted, Result,
    WeakHandle, downgrade, new_handle,
};
pub use ascension_text::{Document, DocumentChange, DocumentInput, DocumentListener, Point};

/// Installs a `tracing` subscriber reading its filter from `RUST_LOG`
/// (default `info`), in the same style as the teacher's
/// `configure_logging`, minus the rolling file appender: library embedders
/// decide where logs go, core has no CLI surface to own a log file (spec
/// §6.4).
///
/// Safe to call more than once; only the first call installs a global
/// subscriber, later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn facade_reexports_are_wired() {
        let doc = Document::new();
        assert_eq!(doc.region(), Region::new(Position::origin(), Position::origin()));
    }
}
