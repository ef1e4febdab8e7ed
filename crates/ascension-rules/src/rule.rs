use crate::token::{Scanner, Token};

/// A rule attempts to recognize one token at the scanner's current
/// position. `text` is the remaining input of the current line; a
/// successful match's region always starts at `scanner.position()`
/// (spec §4.7).
pub trait Rule {
    fn parse(&self, scanner: &dyn Scanner, text: &str) -> Option<Token>;
}

/// UTF-16 code-unit length of a `&str` slice, used to turn a byte-offset
/// match into an `offset_in_line` delta.
pub(crate) fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}
