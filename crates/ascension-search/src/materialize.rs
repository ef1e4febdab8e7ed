//! Flattens a document scope into parallel code-point/position/byte-offset
//! arrays so [`crate::LiteralPattern`]'s Boyer-Moore-Horspool search and
//! `regex`'s byte-oriented matcher can both operate on it, with a way back
//! to document [`Position`]s for the regions they report.

use ascension_primitives::{Position, Region};
use ascension_text::{Document, DocumentCharacterIterator};
use ascension_unicode::{CharacterIterator, CodePoint};

pub struct Materialized {
    pub codepoints: Vec<CodePoint>,
    pub chars: Vec<char>,
    pub positions: Vec<Position>,
    pub text: String,
    pub byte_offsets: Vec<usize>,
}

impl Materialized {
    pub fn scope(doc: &Document, scope: Region) -> Self {
        let scope = scope.normalized();
        let mut codepoints = Vec::new();
        let mut chars = Vec::new();
        let mut positions = Vec::new();
        let mut text = String::new();
        let mut byte_offsets = Vec::new();

        let mut iter = DocumentCharacterIterator::new(doc, scope);
        loop {
            positions.push(iter.position());
            byte_offsets.push(text.len());
            let Some(cp) = iter.current() else { break };
            codepoints.push(cp);
            let c = char::from_u32(cp).unwrap_or('\u{FFFD}');
            chars.push(c);
            text.push(c);
            iter.advance();
        }

        Self {
            codepoints,
            chars,
            positions,
            text,
            byte_offsets,
        }
    }

    /// The code-point index whose position is `at`, or the insertion point
    /// if `at` doesn't fall exactly on a code-point boundary (can't
    /// happen for positions produced by this same materialization).
    pub fn index_of_position(&self, at: Position) -> usize {
        self.positions.partition_point(|&p| p < at)
    }

    pub fn index_of_byte(&self, byte: usize) -> usize {
        self.byte_offsets.partition_point(|&b| b < byte)
    }

    pub fn region_for(&self, start_idx: usize, end_idx: usize) -> Region {
        Region::new(self.positions[start_idx], self.positions[end_idx])
    }
}
