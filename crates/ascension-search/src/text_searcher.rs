//! `TextSearcher`: literal/regex search plus `replace_all` over a document
//! scope (spec §4.8.2).

use std::collections::VecDeque;

use ascension_primitives::{AscensionError, Position, Region, Result};
use ascension_text::Document;
use regex::Regex;

use crate::literal_pattern::{Direction, LiteralPattern};
use crate::materialize::Materialized;
use crate::whole_match::{WholeMatch, is_whole_match};

pub enum Pattern {
    Literal(LiteralPattern),
    Regex(Regex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAction {
    Replace,
    Skip,
    ReplaceAll,
    Exit,
    ReplaceAndExit,
    /// Rolls back the last replacement this run made and re-presents it as
    /// the next match (spec §4.8.2: "supports undo of the last individual
    /// replacement via the callback"). A no-op if nothing has been
    /// replaced yet this run.
    Undo,
}

pub struct TextSearcher {
    pattern: Option<Pattern>,
    whole_match: WholeMatch,
    pattern_history: VecDeque<String>,
    replacement_history: VecDeque<String>,
    history_capacity: usize,
    last_result: Option<(Region, u64, Direction)>,
}

const MIN_HISTORY: usize = 4;
const DEFAULT_HISTORY: usize = 16;

impl TextSearcher {
    pub fn new() -> Self {
        Self {
            pattern: None,
            whole_match: WholeMatch::CodeUnit,
            pattern_history: VecDeque::new(),
            replacement_history: VecDeque::new(),
            history_capacity: DEFAULT_HISTORY,
            last_result: None,
        }
    }

    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history_capacity = capacity.max(MIN_HISTORY);
    }

    pub fn set_whole_match(&mut self, mode: WholeMatch) {
        self.whole_match = mode;
    }

    pub fn whole_match(&self) -> WholeMatch {
        self.whole_match
    }

    pub fn pattern_history(&self) -> impl Iterator<Item = &str> {
        self.pattern_history.iter().map(String::as_str)
    }

    pub fn replacement_history(&self) -> impl Iterator<Item = &str> {
        self.replacement_history.iter().map(String::as_str)
    }

    fn push_history(queue: &mut VecDeque<String>, capacity: usize, entry: &str) {
        queue.retain(|existing| existing != entry);
        queue.push_front(entry.to_string());
        while queue.len() > capacity {
            queue.pop_back();
        }
    }

    pub fn set_literal_pattern(&mut self, text: &str, case_sensitive: bool, record_history: bool) {
        if record_history {
            Self::push_history(&mut self.pattern_history, self.history_capacity, text);
        }
        self.pattern = Some(Pattern::Literal(LiteralPattern::new(text, case_sensitive)));
        self.last_result = None;
    }

    pub fn set_regex_pattern(&mut self, source: &str, case_sensitive: bool, record_history: bool) -> Result<()> {
        if record_history {
            Self::push_history(&mut self.pattern_history, self.history_capacity, source);
        }
        let pattern = if case_sensitive { source.to_string() } else { format!("(?i){source}") };
        let regex = Regex::new(&pattern).map_err(|e| AscensionError::PatternSyntax {
            message: e.to_string(),
            index: None,
            pattern: source.to_string(),
        })?;
        self.pattern = Some(Pattern::Regex(regex));
        self.last_result = None;
        Ok(())
    }

    pub fn record_replacement(&mut self, replacement: &str) {
        Self::push_history(&mut self.replacement_history, self.history_capacity, replacement);
    }

    pub fn search(&mut self, doc: &Document, from: Position, scope: Region, direction: Direction) -> Result<Option<Region>> {
        let Some(pattern) = &self.pattern else {
            return Err(AscensionError::IllegalState("no pattern set"));
        };

        if let Some((region, revision, cached_direction)) = self.last_result {
            if revision == doc.revision_number() && cached_direction == direction && region.beginning() == from {
                return Ok(Some(region));
            }
        }

        let material = Materialized::scope(doc, scope);
        let from_idx = material.index_of_position(from);

        let found = match pattern {
            Pattern::Literal(literal) => {
                self.search_literal(literal, &material, from_idx, direction)
            }
            Pattern::Regex(regex) => self.search_regex(regex, &material, from_idx, direction),
        };

        if let Some(region) = found {
            self.last_result = Some((region, doc.revision_number(), direction));
        }
        Ok(found)
    }

    fn search_literal(
        &self,
        pattern: &LiteralPattern,
        material: &Materialized,
        from_idx: usize,
        direction: Direction,
    ) -> Option<Region> {
        if pattern.is_empty() {
            return None;
        }
        let mut cursor = from_idx;
        loop {
            let (start, end) = pattern.search(&material.codepoints, cursor, direction)?;
            if is_whole_match(&material.chars, start, end, self.whole_match) {
                return Some(material.region_for(start, end));
            }
            cursor = match direction {
                Direction::Forward => start + 1,
                Direction::Backward => {
                    if start == 0 {
                        return None;
                    }
                    start
                }
            };
        }
    }

    fn search_regex(&self, regex: &Regex, material: &Materialized, from_idx: usize, direction: Direction) -> Option<Region> {
        let from_byte = material.byte_offsets[from_idx];
        match direction {
            Direction::Forward => {
                let mut at = from_byte;
                while let Some(m) = regex.find_at(&material.text, at) {
                    let start = material.index_of_byte(m.start());
                    let end = material.index_of_byte(m.end());
                    if is_whole_match(&material.chars, start, end, self.whole_match) {
                        return Some(material.region_for(start, end));
                    }
                    at = (m.start() + 1).max(m.end());
                    if at > material.text.len() {
                        break;
                    }
                }
                None
            }
            Direction::Backward => {
                // Emulated: scan every match in the scope and keep the
                // last one that starts at or before `from`.
                let mut best: Option<(usize, usize)> = None;
                for m in regex.find_iter(&material.text) {
                    if m.start() > from_byte {
                        break;
                    }
                    let start = material.index_of_byte(m.start());
                    let end = material.index_of_byte(m.end());
                    if is_whole_match(&material.chars, start, end, self.whole_match) {
                        best = Some((start, end));
                    }
                }
                best.map(|(s, e)| material.region_for(s, e))
            }
        }
    }

    /// Iteratively finds matches in `scope`, optionally asking `callback`
    /// per match. Does not wrap the run in a compound change — the caller
    /// does that. Interruptions from the document input propagate as
    /// `ReplacementInterrupted` wrapping the count of replacements
    /// already committed (spec §4.8.2).
    pub fn replace_all(
        &mut self,
        doc: &mut Document,
        scope: Region,
        replacement: &str,
        mut callback: Option<&mut dyn FnMut(&Document, Region) -> ReplaceAction>,
    ) -> std::result::Result<usize, ascension_primitives::ReplacementInterrupted<AscensionError>> {
        let scope_end_point = doc.create_point(scope.normalized().end());
        let mut cursor = scope.normalized().beginning();
        let mut count = 0usize;
        let mut force_replace_rest = false;
        let mut last_replacement_start: Option<Position> = None;

        loop {
            let current_scope = Region::new(cursor, scope_end_point.position());
            let found = self
                .search(doc, cursor, current_scope, Direction::Forward)
                .map_err(|e| ascension_primitives::ReplacementInterrupted::new(count, e))?;
            let Some(region) = found else { break };

            let action = if force_replace_rest {
                ReplaceAction::Replace
            } else if let Some(cb) = callback.as_deref_mut() {
                cb(doc, region)
            } else {
                ReplaceAction::Replace
            };

            match action {
                ReplaceAction::Skip => {
                    cursor = region.end();
                    continue;
                }
                ReplaceAction::Exit => break,
                ReplaceAction::Undo => {
                    let Some(prev_start) = last_replacement_start.take() else {
                        cursor = region.end();
                        continue;
                    };
                    doc.undo().map_err(|e| ascension_primitives::ReplacementInterrupted::new(count, e))?;
                    count -= 1;
                    cursor = prev_start;
                    continue;
                }
                ReplaceAction::Replace | ReplaceAction::ReplaceAll | ReplaceAction::ReplaceAndExit => {
                    if action == ReplaceAction::ReplaceAll {
                        force_replace_rest = true;
                    }
                    last_replacement_start = Some(region.beginning());
                    let new_end = doc
                        .replace(region, replacement)
                        .map_err(|e| ascension_primitives::ReplacementInterrupted::new(count, e))?;
                    count += 1;
                    cursor = new_end;
                    if action == ReplaceAction::ReplaceAndExit {
                        break;
                    }
                }
            }
        }

        Ok(count)
    }
}

impl Default for TextSearcher {
    fn default() -> Self {
        Self::new()
    }
}
