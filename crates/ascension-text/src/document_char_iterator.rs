use ascension_primitives::{Position, Region};
use ascension_unicode::{CharacterIterator, CodePoint, Utf16CodepointIter};

use crate::document::Document;

/// The code point a [`DocumentCharacterIterator`] reports in place of each
/// line break, regardless of what terminator the line actually has (spec
/// §4.5). Callers that need the literal terminator go through
/// [`Document::line`] directly.
pub const LINE_SEPARATOR: CodePoint = 0x2028;

/// A [`CharacterIterator`] walking a document's content across line
/// boundaries, synthesizing [`LINE_SEPARATOR`] at every line break and
/// reporting `DONE` at the end of its bound region.
///
/// Unlike [`crate::Point`], this cursor does not track edits: it borrows
/// the document for its lifetime and is meant to be constructed fresh for
/// each read (e.g. once per search match), matching the source's
/// "snapshot" character iterators.
#[derive(Clone)]
pub struct DocumentCharacterIterator<'a> {
    doc: &'a Document,
    region: Region,
    position: Position,
}

impl<'a> DocumentCharacterIterator<'a> {
    pub fn new(doc: &'a Document, region: Region) -> Self {
        let region = region.normalized();
        let position = region.beginning();
        Self { doc, region, position }
    }

    pub fn at(doc: &'a Document, region: Region, position: Position) -> Self {
        let region = region.normalized();
        let position = position.clamp(region.beginning(), region.end());
        Self { doc, region, position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn line_len(&self, line_no: u32) -> u32 {
        self.doc.line(line_no).map(|l| l.len()).unwrap_or(0)
    }

    fn is_done(&self) -> bool {
        self.position >= self.region.end()
    }
}

impl PartialEq for DocumentCharacterIterator<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.position == other.position
    }
}

impl PartialOrd for DocumentCharacterIterator<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if std::ptr::eq(self.doc, other.doc) {
            Some(self.position.cmp(&other.position))
        } else {
            None
        }
    }
}

impl CharacterIterator for DocumentCharacterIterator<'_> {
    fn current(&self) -> Option<CodePoint> {
        if self.is_done() {
            return None;
        }
        let len = self.line_len(self.position.line);
        if self.position.offset_in_line >= len {
            return Some(LINE_SEPARATOR);
        }
        let line = self.doc.line(self.position.line).ok()?;
        Utf16CodepointIter::at(line.text(), self.position.offset_in_line as usize).current()
    }

    fn has_next(&self) -> bool {
        self.position < self.region.end()
    }

    fn has_previous(&self) -> bool {
        self.position > self.region.beginning()
    }

    fn advance(&mut self) -> &mut Self {
        if self.is_done() {
            return self;
        }
        let len = self.line_len(self.position.line);
        if self.position.offset_in_line >= len {
            self.position = Position::new(self.position.line + 1, 0);
            return self;
        }
        if let Ok(line) = self.doc.line(self.position.line) {
            let mut it = Utf16CodepointIter::at(line.text(), self.position.offset_in_line as usize);
            it.next();
            self.position.offset_in_line = it.position() as u32;
        }
        self
    }

    fn retreat(&mut self) -> &mut Self {
        if !self.has_previous() {
            return self;
        }
        if self.position.offset_in_line == 0 {
            let prev_line = self.position.line - 1;
            self.position = Position::new(prev_line, self.line_len(prev_line));
            return self;
        }
        if let Ok(line) = self.doc.line(self.position.line) {
            let mut it = Utf16CodepointIter::at(line.text(), self.position.offset_in_line as usize);
            it.previous();
            self.position.offset_in_line = it.position() as u32;
        }
        self
    }

    fn first(&mut self) -> &mut Self {
        self.position = self.region.beginning();
        self
    }

    fn last(&mut self) -> &mut Self {
        self.position = self.region.end();
        self.retreat()
    }

    /// A flattened, monotonically increasing offset counting each line
    /// break as one unit. `O(position.line)`: computing it walks every
    /// preceding line's length, which is fine for the occasional
    /// comparison this trait method exists for but not for a hot loop.
    fn offset(&self) -> usize {
        let mut total = 0usize;
        for line_no in 0..self.position.line {
            total += self.line_len(line_no) as usize + 1;
        }
        total + self.position.offset_in_line as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascension_primitives::Position;

    #[test]
    fn walks_across_line_break_as_line_separator() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "ab\ncd").unwrap();
        let mut it = DocumentCharacterIterator::new(&doc, doc.region());
        assert_eq!(it.current(), Some('a' as u32));
        it.advance();
        assert_eq!(it.current(), Some('b' as u32));
        it.advance();
        assert_eq!(it.current(), Some(LINE_SEPARATOR));
        it.advance();
        assert_eq!(it.current(), Some('c' as u32));
        it.advance();
        assert_eq!(it.current(), Some('d' as u32));
        it.advance();
        assert_eq!(it.current(), None);
    }

    #[test]
    fn retreat_from_end_lands_on_last_character() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "ab\ncd").unwrap();
        let mut it = DocumentCharacterIterator::new(&doc, doc.region());
        it.last();
        assert_eq!(it.current(), Some('d' as u32));
    }

    #[test]
    fn respects_bound_region() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "abcdef").unwrap();
        let region = Region::new(Position::new(0, 1), Position::new(0, 4));
        let mut it = DocumentCharacterIterator::new(&doc, region);
        let mut collected = Vec::new();
        while let Some(cp) = it.current() {
            collected.push(char::from_u32(cp).unwrap());
            it.advance();
        }
        assert_eq!(collected, vec!['b', 'c', 'd']);
    }
}
