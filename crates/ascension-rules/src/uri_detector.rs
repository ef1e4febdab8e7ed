//! RFC 3987 IRI recognition: a small recursive-descent recognizer with
//! `scheme → hier-part → query? → fragment?` stages (spec §4.7).

use std::collections::HashSet;
use std::sync::OnceLock;

/// A byte range within the text handed to [`UriDetector::detect`]/
/// [`UriDetector::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

pub struct UriDetector {
    valid_schemes: Option<HashSet<String>>,
    case_sensitive: bool,
}

const IANA_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "file", "mailto", "news", "nntp", "irc", "gopher", "telnet",
    "ldap", "data", "urn", "tel", "sip", "sips", "ws", "wss", "git", "ssh", "magnet",
];

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'
}

fn is_ucschar_or_unreserved(c: char) -> bool {
    c.is_alphanumeric() || "-._~!$&'()*+,;=:@/%".contains(c)
}

impl UriDetector {
    pub fn new() -> Self {
        Self {
            valid_schemes: None,
            case_sensitive: false,
        }
    }

    pub fn set_valid_schemes(&mut self, schemes: &[&str], case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
        self.valid_schemes = Some(
            schemes
                .iter()
                .map(|s| if case_sensitive { s.to_string() } else { s.to_lowercase() })
                .collect(),
        );
    }

    pub fn default_iana_instance() -> &'static UriDetector {
        static INSTANCE: OnceLock<UriDetector> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut detector = UriDetector::new();
            detector.set_valid_schemes(IANA_SCHEMES, false);
            detector
        })
    }

    fn scheme_allowed(&self, scheme: &str) -> bool {
        match &self.valid_schemes {
            None => true,
            Some(schemes) => {
                let key = if self.case_sensitive { scheme.to_string() } else { scheme.to_lowercase() };
                schemes.contains(&key)
            }
        }
    }

    fn handle_scheme(&self, text: &str) -> Option<usize> {
        let mut chars = text.char_indices();
        let (_, first) = chars.next()?;
        if !first.is_ascii_alphabetic() {
            return None;
        }
        let mut end = first.len_utf8();
        for (i, c) in chars {
            if c == ':' {
                if self.scheme_allowed(&text[..i]) {
                    return Some(i + 1);
                }
                return None;
            }
            if !is_scheme_char(c) {
                return None;
            }
            end = i + c.len_utf8();
        }
        let _ = end;
        None
    }

    fn handle_hier_part(&self, text: &str) -> usize {
        let mut end = 0;
        for (i, c) in text.char_indices() {
            if c == '?' || c == '#' || c.is_whitespace() || "<>\"".contains(c) {
                return i;
            }
            if !is_ucschar_or_unreserved(c) {
                return i;
            }
            end = i + c.len_utf8();
        }
        end
    }

    fn handle_query(&self, text: &str) -> usize {
        if !text.starts_with('?') {
            return 0;
        }
        let body = &text[1..];
        let mut end = 1;
        for (i, c) in body.char_indices() {
            if c == '#' || c.is_whitespace() || "<>\"".contains(c) {
                return end;
            }
            end = 1 + i + c.len_utf8();
        }
        end
    }

    fn handle_fragment(&self, text: &str) -> usize {
        if !text.starts_with('#') {
            return 0;
        }
        let body = &text[1..];
        let mut end = 1;
        for (i, c) in body.char_indices() {
            if c.is_whitespace() || "<>\"".contains(c) {
                return end;
            }
            end = 1 + i + c.len_utf8();
        }
        end
    }

    /// Tries to parse an IRI starting at `text`'s beginning. Returns the
    /// byte offset just past the match, or `0` if no IRI starts there.
    pub fn detect(&self, text: &str) -> usize {
        let Some(after_scheme) = self.handle_scheme(text) else {
            return 0;
        };
        let rest = &text[after_scheme..];
        let hier_len = self.handle_hier_part(rest);
        let mut consumed = after_scheme + hier_len;
        consumed += self.handle_query(&text[consumed..]);
        consumed += self.handle_fragment(&text[consumed..]);
        consumed
    }

    /// Scans for a colon and retries `detect` at each candidate scheme
    /// start, returning the first successful span.
    pub fn search(&self, text: &str) -> Option<Span> {
        for (i, c) in text.char_indices() {
            if c != ':' {
                continue;
            }
            let candidate_start = text[..i]
                .char_indices()
                .rev()
                .take_while(|&(_, c)| is_scheme_char(c))
                .last()
                .map(|(j, _)| j)
                .unwrap_or(i);
            let end = self.detect(&text[candidate_start..]);
            if end > 0 {
                return Some(Span {
                    start: candidate_start,
                    end: candidate_start + end,
                });
            }
        }
        None
    }
}

impl Default for UriDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_http_url() {
        let detector = UriDetector::default_iana_instance();
        let end = detector.detect("https://example.com/path?x=1#frag");
        assert_eq!(end, "https://example.com/path?x=1#frag".len());
    }

    #[test]
    fn rejects_unregistered_scheme() {
        let mut detector = UriDetector::new();
        detector.set_valid_schemes(&["http"], false);
        assert_eq!(detector.detect("xyz://host"), 0);
    }

    #[test]
    fn search_finds_embedded_url() {
        let detector = UriDetector::default_iana_instance();
        let span = detector.search("see https://example.com for more").unwrap();
        assert_eq!(&"see https://example.com for more"[span.start..span.end], "https://example.com");
    }

    #[test]
    fn search_returns_none_without_a_scheme() {
        let detector = UriDetector::default_iana_instance();
        assert!(detector.search("no links here, just a ratio 3:2").is_none());
    }
}
