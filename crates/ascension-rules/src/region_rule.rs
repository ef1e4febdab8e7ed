use ascension_primitives::{Position, Region};

use crate::rule::{Rule, utf16_len};
use crate::token::{Scanner, Token, TokenId};

/// Matches `start`, then scans for `end` honoring an optional escape
/// character (the escape and the character following it are always
/// passed over, even if that character would otherwise start `end`). An
/// empty `end` means "until end of line" (spec §4.7).
pub struct RegionRule {
    id: TokenId,
    start: String,
    end: String,
    escape: Option<char>,
    case_sensitive: bool,
}

impl RegionRule {
    pub fn new(id: TokenId, start: &str, end: &str, escape: Option<char>, case_sensitive: bool) -> Self {
        Self {
            id,
            start: start.to_string(),
            end: end.to_string(),
            escape,
            case_sensitive,
        }
    }

    fn eq_fold(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}

impl Rule for RegionRule {
    fn parse(&self, scanner: &dyn Scanner, text: &str) -> Option<Token> {
        if text.len() < self.start.len() {
            return None;
        }
        if !self.eq_fold(&text[..self.start.len()], &self.start) {
            return None;
        }

        let body = &text[self.start.len()..];

        if self.end.is_empty() {
            let matched_len = utf16_len(text);
            let start_pos = scanner.position();
            return Some(Token {
                id: self.id,
                region: Region::new(start_pos, Position::new(start_pos.line, start_pos.offset_in_line + matched_len)),
            });
        }

        let mut chars = body.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if Some(c) == self.escape {
                chars.next();
                continue;
            }
            let rest = &body[i..];
            if rest.len() >= self.end.len() && self.eq_fold(&rest[..self.end.len()], &self.end) {
                let consumed = &text[..self.start.len() + i + self.end.len()];
                let matched_len = utf16_len(consumed);
                let start_pos = scanner.position();
                return Some(Token {
                    id: self.id,
                    region: Region::new(
                        start_pos,
                        Position::new(start_pos.line, start_pos.offset_in_line + matched_len),
                    ),
                });
            }
        }

        None
    }
}
