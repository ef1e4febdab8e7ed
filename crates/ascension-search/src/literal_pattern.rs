//! Boyer-Moore-Horspool matching over code-point buffers (spec §4.8.1).
//! Comparisons are code-point-level, so a surrogate pair is always
//! treated as one atomic unit rather than two matchable halves.

use std::collections::HashMap;

use ascension_unicode::{CharacterIterator, CodePoint, case_fold};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

pub struct LiteralPattern {
    pattern: Vec<CodePoint>,
    case_sensitive: bool,
    last_occurrence: HashMap<CodePoint, usize>,
    first_occurrence: HashMap<CodePoint, usize>,
}

fn fold(cp: CodePoint, case_sensitive: bool) -> CodePoint {
    if case_sensitive { cp } else { case_fold(cp) }
}

impl LiteralPattern {
    pub fn new(text: &str, case_sensitive: bool) -> Self {
        let pattern: Vec<CodePoint> = text.chars().map(|c| fold(c as CodePoint, case_sensitive)).collect();

        let mut last_occurrence = HashMap::new();
        for (i, &c) in pattern.iter().enumerate().take(pattern.len().saturating_sub(1)) {
            last_occurrence.insert(c, pattern.len() - 1 - i);
        }

        let mut first_occurrence = HashMap::new();
        for (i, &c) in pattern.iter().enumerate().skip(1) {
            first_occurrence.entry(c).or_insert(i);
        }

        Self {
            pattern,
            case_sensitive,
            last_occurrence,
            first_occurrence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    fn codepoint_at(&self, c: CodePoint) -> CodePoint {
        fold(c, self.case_sensitive)
    }

    /// Whether `haystack[at..]` begins with the pattern.
    pub fn matches_at(&self, haystack: &[CodePoint], at: usize) -> bool {
        if at + self.pattern.len() > haystack.len() {
            return false;
        }
        self.pattern
            .iter()
            .enumerate()
            .all(|(i, &p)| self.codepoint_at(haystack[at + i]) == p)
    }

    /// Boyer-Moore-Horspool search over `haystack` starting at `from`,
    /// returning the matched `[start, end)` code-point range.
    pub fn search(&self, haystack: &[CodePoint], from: usize, direction: Direction) -> Option<(usize, usize)> {
        if self.pattern.is_empty() {
            return None;
        }
        match direction {
            Direction::Forward => self.search_forward(haystack, from),
            Direction::Backward => self.search_backward(haystack, from),
        }
    }

    fn search_forward(&self, haystack: &[CodePoint], from: usize) -> Option<(usize, usize)> {
        let m = self.pattern.len();
        let mut i = from;
        while i + m <= haystack.len() {
            let window_end = i + m - 1;
            if self.matches_at(haystack, i) {
                return Some((i, i + m));
            }
            let last = self.codepoint_at(haystack[window_end]);
            let shift = self.last_occurrence.get(&last).copied().unwrap_or(m);
            i += shift.max(1);
        }
        None
    }

    fn search_backward(&self, haystack: &[CodePoint], from: usize) -> Option<(usize, usize)> {
        let m = self.pattern.len();
        let limit = from.min(haystack.len());
        if limit < m {
            return None;
        }
        let mut end = limit;
        while end >= m {
            let start = end - m;
            if self.matches_at(haystack, start) {
                return Some((start, end));
            }
            let first = self.codepoint_at(haystack[start]);
            let shift = self.first_occurrence.get(&first).copied().unwrap_or(m);
            if end < shift + 1 {
                break;
            }
            end -= shift.max(1);
        }
        None
    }

    /// Whether the full iterator content (from its current position to
    /// its end) matches the pattern exactly (spec's `matches(iter)`).
    pub fn matches_iter<I: CharacterIterator>(&self, mut iter: I) -> bool {
        for &expected in &self.pattern {
            let Some(actual) = iter.current() else {
                return false;
            };
            if self.codepoint_at(actual) != expected {
                return false;
            }
            iter.advance();
        }
        iter.current().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codepoints(s: &str) -> Vec<CodePoint> {
        s.chars().map(|c| c as CodePoint).collect()
    }

    #[test]
    fn forward_search_finds_first_occurrence() {
        let pattern = LiteralPattern::new("needle", true);
        let haystack = codepoints("a needle in a needle stack");
        let (start, end) = pattern.search(&haystack, 0, Direction::Forward).unwrap();
        assert_eq!(&haystack[start..end], codepoints("needle").as_slice());
        assert_eq!(start, 2);
    }

    #[test]
    fn backward_search_finds_last_occurrence_before_from() {
        let pattern = LiteralPattern::new("needle", true);
        let haystack = codepoints("a needle in a needle stack");
        let (start, _) = pattern.search(&haystack, haystack.len(), Direction::Backward).unwrap();
        assert_eq!(start, 14);
    }

    #[test]
    fn case_insensitive_matching() {
        let pattern = LiteralPattern::new("Needle", false);
        let haystack = codepoints("a NEEDLE here");
        assert!(pattern.search(&haystack, 0, Direction::Forward).is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let pattern = LiteralPattern::new("xyz", true);
        let haystack = codepoints("abcdef");
        assert!(pattern.search(&haystack, 0, Direction::Forward).is_none());
    }
}
