use ascension_primitives::{Position, Region};

use crate::rule::{Rule, utf16_len};
use crate::token::{Scanner, Token, TokenId};
use crate::uri_detector::UriDetector;

pub struct URIRule<'a> {
    id: TokenId,
    detector: &'a UriDetector,
}

impl<'a> URIRule<'a> {
    pub fn new(id: TokenId, detector: &'a UriDetector) -> Self {
        Self { id, detector }
    }
}

impl Rule for URIRule<'_> {
    fn parse(&self, scanner: &dyn Scanner, text: &str) -> Option<Token> {
        let end = self.detector.detect(text);
        if end == 0 {
            return None;
        }
        let pos = scanner.position();
        let matched_len = utf16_len(&text[..end]);
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
    fn recognizes_a_uri_at_the_current_position() {
        let detector = UriDetector::default_iana_instance();
        let rule = URIRule::new(7, detector);
        let scanner = FixedScanner(Position::origin());
        let token = rule.parse(&scanner, "https://example.com trailing text").unwrap();
        assert_eq!(token.id, 7);
        assert_eq!(token.region.end().offset_in_line, "https://example.com".len() as u32);
    }
}
