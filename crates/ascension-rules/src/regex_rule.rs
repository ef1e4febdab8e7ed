use ascension_primitives::{Position, Region};
use regex::Regex;

use crate::rule::{Rule, utf16_len};
use crate::token::{Scanner, Token, TokenId};

/// Matches a compiled pattern anchored at the scanner's current position
/// (spec §4.7). The pattern is expected to be anchor-free; this rule
/// anchors it to the start of `text` itself rather than scanning ahead.
pub struct RegexRule {
    id: TokenId,
    pattern: Regex,
}

impl RegexRule {
    pub fn new(id: TokenId, pattern: Regex) -> Self {
        Self { id, pattern }
    }
}

impl Rule for RegexRule {
    fn parse(&self, scanner: &dyn Scanner, text: &str) -> Option<Token> {
        let m = self.pattern.find(text)?;
        if m.start() != 0 {
            return None;
        }
        let pos = scanner.position();
        let matched_len = utf16_len(m.as_str());
        Some(Token {
            id: self.id,
            region: Region::new(pos, Position::new(pos.line, pos.offset_in_line + matched_len)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScanner(Position);
    impl Scanner for FixedScanner {
        fn position(&self) -> Position {
            self.0
        }

        fn preceding_char(&self) -> Option<char> {
            None
        }
    }

    #[test]
    fn matches_anchored_pattern() {
        let rule = RegexRule::new(1, Regex::new(r"^[A-Z][a-z]+").unwrap());
        let scanner = FixedScanner(Position::origin());
        let token = rule.parse(&scanner, "Hello world").unwrap();
        assert_eq!(token.region.end().offset_in_line, 5);
    }

    #[test]
    fn rejects_a_match_not_at_the_start() {
        let rule = RegexRule::new(1, Regex::new(r"world").unwrap());
        let scanner = FixedScanner(Position::origin());
        assert!(rule.parse(&scanner, "hello world").is_none());
    }
}
