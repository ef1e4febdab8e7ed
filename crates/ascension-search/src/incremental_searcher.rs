//! `IncrementalSearcher`: a running search built up one character (or
//! jump) at a time, kept as a stack of operations and a parallel stack of
//! status snapshots so every step can be undone (spec §4.8.3).

use ascension_primitives::{AscensionError, Position, Region, Result};
use ascension_text::Document;

use crate::literal_pattern::Direction;
use crate::text_searcher::TextSearcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PatternEmpty,
    Found { wrapped: bool },
    NotFound { wrapped: bool },
    BadRegex,
    ComplexRegex,
}

#[derive(Debug, Clone)]
enum Op {
    Type(char),
    Jump,
}

#[derive(Debug, Clone)]
struct StatusSnapshot {
    matched_region: Option<Region>,
    direction: Direction,
}

/// A snapshot of everything that must stay put for a running incremental
/// search to remain valid (spec §4.8.3: "any document change or bookmark
/// change aborts"). Rust has no ambient listener registration cheap enough
/// to hook invisibly into every `Document`/`Bookmarker` mutation from here,
/// so instead of registering as a `DocumentListener` this captures a
/// fingerprint at `start()` and compares it on every subsequent call —
/// equivalent in effect (the session is never allowed to act on a stale
/// match), checked lazily rather than the instant the change happens.
#[derive(Debug, Clone, PartialEq)]
struct ChangeWatch {
    revision: u64,
    bookmarks: Vec<u32>,
}

impl ChangeWatch {
    fn capture(doc: &Document) -> Self {
        Self {
            revision: doc.revision_number(),
            bookmarks: doc.bookmarked_lines().collect(),
        }
    }

    fn changed(&self, doc: &Document) -> bool {
        self.revision != doc.revision_number() || self.bookmarks != doc.bookmarked_lines().collect::<Vec<_>>()
    }
}

enum State {
    Idle,
    Running {
        from: Position,
        kind: PatternKind,
        case_sensitive: bool,
        pattern: String,
        ops: Vec<Op>,
        status: Vec<StatusSnapshot>,
        watch: ChangeWatch,
    },
}

pub struct IncrementalSearcher {
    state: State,
}

impl IncrementalSearcher {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn start(&mut self, doc: &Document, from: Position, kind: PatternKind, case_sensitive: bool, direction: Direction) {
        self.state = State::Running {
            from,
            kind,
            case_sensitive,
            pattern: String::new(),
            ops: Vec::new(),
            status: vec![StatusSnapshot {
                matched_region: None,
                direction,
            }],
            watch: ChangeWatch::capture(doc),
        };
    }

    fn require_running(&self) -> std::result::Result<(), AscensionError> {
        if matches!(self.state, State::Running { .. }) {
            Ok(())
        } else {
            Err(AscensionError::IllegalState("incremental searcher is not running"))
        }
    }

    /// Aborts and returns to `Idle` if the document or its bookmark set
    /// moved since `start()`, as required by spec §4.8.3. Must be called
    /// before any operation acts on a cached match.
    fn enforce_liveness(&mut self, doc: &Document) -> std::result::Result<(), AscensionError> {
        if let State::Running { watch, .. } = &self.state
            && watch.changed(doc)
        {
            self.state = State::Idle;
            return Err(AscensionError::IllegalState(
                "incremental search aborted: document or bookmarks changed",
            ));
        }
        Ok(())
    }

    /// Pushes the current pattern to `searcher` *without* recording it to
    /// history, then searches and updates the top snapshot's matched
    /// region (spec: `update()`).
    fn update(&mut self, doc: &Document, searcher: &mut TextSearcher) -> Result<Event> {
        self.enforce_liveness(doc)?;
        let State::Running {
            from,
            kind,
            case_sensitive,
            pattern,
            status,
            ..
        } = &mut self.state
        else {
            return Err(AscensionError::IllegalState("incremental searcher is not running"));
        };

        if pattern.is_empty() {
            status.last_mut().unwrap().matched_region = None;
            return Ok(Event::PatternEmpty);
        }

        match kind {
            PatternKind::Literal => searcher.set_literal_pattern(pattern, *case_sensitive, false),
            PatternKind::Regex => {
                if let Err(_e) = searcher.set_regex_pattern(pattern, *case_sensitive, false) {
                    return Ok(Event::BadRegex);
                }
            }
        }

        let direction = status.last().unwrap().direction;
        let start_at = status.last().unwrap().matched_region.map(|r| r.beginning()).unwrap_or(*from);
        let found = searcher.search(doc, start_at, doc.region(), direction)?;
        status.last_mut().unwrap().matched_region = found;
        Ok(match found {
            Some(_) => Event::Found { wrapped: false },
            None => Event::NotFound { wrapped: false },
        })
    }

    pub fn add_character(&mut self, doc: &Document, searcher: &mut TextSearcher, c: char) -> Result<Event> {
        self.require_running()?;
        self.enforce_liveness(doc)?;
        if let State::Running { pattern, ops, .. } = &mut self.state {
            pattern.push(c);
            ops.push(Op::Type(c));
        }
        self.update(doc, searcher)
    }

    pub fn add_string(&mut self, doc: &Document, searcher: &mut TextSearcher, s: &str) -> Result<Event> {
        let mut last = Event::PatternEmpty;
        for c in s.chars() {
            last = self.add_character(doc, searcher, c)?;
        }
        Ok(last)
    }

    /// Pushes a JUMP op and a new status snapshot, searching past the
    /// current match (or before it, for `Backward`).
    pub fn next(&mut self, doc: &Document, searcher: &mut TextSearcher, direction: Direction) -> Result<Event> {
        self.require_running()?;
        self.enforce_liveness(doc)?;
        let State::Running {
            from, ops, status, ..
        } = &mut self.state
        else {
            unreachable!()
        };

        let previous = status.last().unwrap().clone();
        let search_from = match previous.matched_region {
            Some(r) => match direction {
                Direction::Forward => r.end(),
                Direction::Backward => r.beginning(),
            },
            None => *from,
        };
        ops.push(Op::Jump);
        status.push(StatusSnapshot {
            matched_region: previous.matched_region,
            direction,
        });

        let State::Running { pattern, .. } = &self.state else { unreachable!() };
        if pattern.is_empty() {
            return Ok(Event::PatternEmpty);
        }

        let found = searcher.search(doc, search_from, doc.region(), direction)?;
        if let State::Running { status, .. } = &mut self.state {
            status.last_mut().unwrap().matched_region = found;
        }
        Ok(match found {
            Some(_) => Event::Found { wrapped: false },
            None => Event::NotFound { wrapped: false },
        })
    }

    /// Undoes the last TYPE (drops its code point) or JUMP (pops its
    /// status snapshot) operation.
    pub fn undo(&mut self, doc: &Document, searcher: &mut TextSearcher) -> Result<()> {
        self.require_running()?;
        self.enforce_liveness(doc)?;
        let popped = if let State::Running { ops, status, .. } = &mut self.state {
            let op = ops.pop();
            if matches!(op, Some(Op::Jump)) && status.len() > 1 {
                status.pop();
            }
            op
        } else {
            None
        };

        match popped {
            Some(Op::Type(_)) => {
                if let State::Running { pattern, .. } = &mut self.state {
                    pattern.pop();
                }
                self.update(doc, searcher)?;
                Ok(())
            }
            Some(Op::Jump) => Ok(()),
            None => Err(AscensionError::IllegalState("nothing to undo")),
        }
    }

    pub fn matched_region(&self) -> Option<Region> {
        match &self.state {
            State::Running { status, .. } => status.last().and_then(|s| s.matched_region),
            State::Idle => None,
        }
    }

    pub fn reset(&mut self, doc: &Document) {
        let snapshot = match &self.state {
            State::Running { from, kind, case_sensitive, status, .. } => Some((
                *from,
                *kind,
                *case_sensitive,
                status.first().map(|s| s.direction).unwrap_or(Direction::Forward),
            )),
            State::Idle => None,
        };
        if let Some((from, kind, case_sensitive, direction)) = snapshot {
            self.start(doc, from, kind, case_sensitive, direction);
        }
    }

    /// Commits the current match and returns to `Idle`.
    pub fn end(&mut self) -> Option<Region> {
        let region = self.matched_region();
        self.state = State::Idle;
        region
    }

    /// Cancels the search, discarding all matches, and returns to `Idle`.
    pub fn abort(&mut self) {
        self.state = State::Idle;
    }
}

impl Default for IncrementalSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascension_primitives::Position;

    #[test]
    fn typing_characters_narrows_the_match() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "hello world").unwrap();
        let mut searcher = TextSearcher::new();
        let mut incremental = IncrementalSearcher::new();

        incremental.start(&doc, Position::origin(), PatternKind::Literal, true, Direction::Forward);
        let event = incremental.add_string(&doc, &mut searcher, "wor").unwrap();
        assert_eq!(event, Event::Found { wrapped: false });
        assert_eq!(incremental.matched_region().unwrap().beginning(), Position::new(0, 6));
    }

    #[test]
    fn undo_removes_last_typed_character() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "xyz nomatch xyzz").unwrap();
        let mut searcher = TextSearcher::new();
        let mut incremental = IncrementalSearcher::new();

        incremental.start(&doc, Position::origin(), PatternKind::Literal, true, Direction::Forward);
        incremental.add_string(&doc, &mut searcher, "xyzz").unwrap();
        assert!(incremental.matched_region().is_some());
        incremental.undo(&doc, &mut searcher).unwrap();
        // "xyz" still matches (at the first occurrence).
        assert!(incremental.matched_region().is_some());
    }

    #[test]
    fn end_commits_and_returns_to_idle() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "needle").unwrap();
        let mut searcher = TextSearcher::new();
        let mut incremental = IncrementalSearcher::new();
        incremental.start(&doc, Position::origin(), PatternKind::Literal, true, Direction::Forward);
        incremental.add_string(&doc, &mut searcher, "needle").unwrap();
        let region = incremental.end();
        assert!(region.is_some());
        assert!(!incremental.is_running());
    }

    #[test]
    fn a_document_edit_aborts_the_running_search() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "needle in a haystack").unwrap();
        let mut searcher = TextSearcher::new();
        let mut incremental = IncrementalSearcher::new();
        incremental.start(&doc, Position::origin(), PatternKind::Literal, true, Direction::Forward);
        incremental.add_string(&doc, &mut searcher, "needle").unwrap();
        assert!(incremental.is_running());

        doc.insert(Position::new(0, 0), "x").unwrap();

        let err = incremental.add_character(&doc, &mut searcher, 'x').unwrap_err();
        assert!(matches!(err, AscensionError::IllegalState(_)));
        assert!(!incremental.is_running());
    }

    #[test]
    fn a_bookmark_change_aborts_the_running_search() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "needle in a haystack").unwrap();
        let mut searcher = TextSearcher::new();
        let mut incremental = IncrementalSearcher::new();
        incremental.start(&doc, Position::origin(), PatternKind::Literal, true, Direction::Forward);
        incremental.add_string(&doc, &mut searcher, "needle").unwrap();

        doc.mark_bookmark(0);

        let err = incremental.next(&doc, &mut searcher, Direction::Forward).unwrap_err();
        assert!(matches!(err, AscensionError::IllegalState(_)));
        assert!(!incremental.is_running());
    }
}
