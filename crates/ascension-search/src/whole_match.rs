//! Whole-match boundary checks (spec §4.8.2). `CodeUnit` is trivially
//! satisfied; `GraphemeCluster`/`Word` check both match endpoints against
//! UAX #29 boundaries via `unicode-segmentation`.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WholeMatch {
    CodeUnit,
    GraphemeCluster,
    Word,
}

/// `chars` is the scope's materialized content (one `char` per matched
/// code point; the document's synthetic line separators fold to `'\n'`).
/// `start`/`end` are code-point indices into `chars`.
pub fn is_whole_match(chars: &[char], start: usize, end: usize, mode: WholeMatch) -> bool {
    match mode {
        WholeMatch::CodeUnit => true,
        WholeMatch::GraphemeCluster => {
            let text: String = chars.iter().collect();
            let boundaries = grapheme_boundaries(&text);
            boundaries.contains(&char_index_to_byte(chars, start)) && boundaries.contains(&char_index_to_byte(chars, end))
        }
        WholeMatch::Word => {
            let text: String = chars.iter().collect();
            let boundaries = word_boundaries(&text);
            boundaries.contains(&char_index_to_byte(chars, start)) && boundaries.contains(&char_index_to_byte(chars, end))
        }
    }
}

fn char_index_to_byte(chars: &[char], index: usize) -> usize {
    chars[..index.min(chars.len())].iter().map(|c| c.len_utf8()).sum()
}

fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    boundaries.push(text.len());
    boundaries
}

fn word_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.split_word_bound_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_unit_mode_always_whole() {
        let chars: Vec<char> = "anything".chars().collect();
        assert!(is_whole_match(&chars, 2, 5, WholeMatch::CodeUnit));
    }

    #[test]
    fn word_mode_rejects_mid_identifier_match() {
        let chars: Vec<char> = "foobar".chars().collect();
        assert!(!is_whole_match(&chars, 1, 4, WholeMatch::Word));
        assert!(is_whole_match(&chars, 0, 6, WholeMatch::Word));
    }

    #[test]
    fn grapheme_mode_rejects_splitting_a_combining_sequence() {
        // "e\u{0301}" (e + combining acute) is one grapheme cluster.
        let chars: Vec<char> = "e\u{0301}x".chars().collect();
        assert!(!is_whole_match(&chars, 1, 3, WholeMatch::GraphemeCluster));
        assert!(is_whole_match(&chars, 0, 3, WholeMatch::GraphemeCluster));
    }
}
