//! Literal and regular-expression search over `ascension-text` documents:
//! Boyer-Moore-Horspool literal matching, whole-match boundary checks,
//! `TextSearcher` (search/replace-all with history), and
//! `IncrementalSearcher` (type-as-you-go search with undo) — spec §4.8.

mod incremental_searcher;
mod literal_pattern;
mod materialize;
mod text_searcher;
mod whole_match;

pub use incremental_searcher::{Event, IncrementalSearcher, PatternKind};
pub use literal_pattern::{Direction, LiteralPattern};
pub use materialize::Materialized;
pub use text_searcher::{Pattern, ReplaceAction, TextSearcher};
pub use whole_match::{WholeMatch, is_whole_match};
