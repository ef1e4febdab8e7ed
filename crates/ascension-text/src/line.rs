use ascension_primitives::Newline;
use ascension_unicode::Char;

/// One line of document content (spec §3.2).
///
/// `text` holds the line's UTF-16 code units, excluding its terminator.
/// `newline` names the terminator that follows this line (meaningless for
/// the last line, which has none). `revision` is the document revision
/// number at which this line's content was last touched, used by
/// partitioners and renderers to cheaply detect unchanged lines.
#[derive(Debug, Clone)]
pub struct Line {
    text: Vec<Char>,
    pub newline: Newline,
    pub revision: u64,
}

impl Line {
    pub fn new(text: Vec<Char>, newline: Newline, revision: u64) -> Self {
        Self {
            text,
            newline,
            revision,
        }
    }

    pub fn empty(newline: Newline, revision: u64) -> Self {
        Self::new(Vec::new(), newline, revision)
    }

    pub fn from_str(s: &str, newline: Newline, revision: u64) -> Self {
        Self::new(s.encode_utf16().collect(), newline, revision)
    }

    pub fn text(&self) -> &[Char] {
        &self.text
    }

    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.text)
    }

    pub(crate) fn splice(&mut self, range: std::ops::Range<usize>, units: &[Char]) {
        self.text.splice(range, units.iter().copied());
    }
}
