/// Line terminator kind.
///
/// `Lf`, `Cr`, `CrLf`, `Nel`, `Ls` and `Ps` are literal terminators that can
/// be written to a line as-is. `Raw` and `DocumentInput` are policy markers:
/// `Raw` means "keep whatever terminator this particular line already has"
/// (used when a file with mixed terminators is rewritten unchanged), and
/// `DocumentInput` means "use whatever the owning document's input binding
/// considers default" (usually the terminator detected on load). Both
/// resolve to a literal value before anything is actually written; see
/// [`Newline::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Newline {
    Lf,
    Cr,
    CrLf,
    Nel,
    Ls,
    Ps,
    Raw,
    DocumentInput,
}

impl Newline {
    pub const fn is_literal(&self) -> bool {
        !matches!(self, Newline::Raw | Newline::DocumentInput)
    }

    /// The UTF-8 text of a literal newline. Panics on a policy marker since
    /// those must be resolved first; this mirrors the source's assumption
    /// that policy values never reach the point where bytes are emitted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::Cr => "\r",
            Newline::CrLf => "\r\n",
            Newline::Nel => "\u{0085}",
            Newline::Ls => "\u{2028}",
            Newline::Ps => "\u{2029}",
            Newline::Raw | Newline::DocumentInput => {
                panic!("policy newline marker has no literal representation")
            }
        }
    }

    /// Number of UTF-16 code units the literal terminator occupies.
    pub fn len_utf16(&self) -> u32 {
        match self {
            Newline::CrLf => 2,
            Newline::Raw | Newline::DocumentInput => 0,
            _ => 1,
        }
    }

    /// A representative scalar value used to ask a codec whether it can
    /// encode this terminator (NEL/LS/PS are only legal in encodings that
    /// can represent the corresponding code point).
    pub fn representative_char(&self) -> Option<char> {
        match self {
            Newline::Lf => Some('\n'),
            Newline::Cr => Some('\r'),
            Newline::CrLf => Some('\n'),
            Newline::Nel => Some('\u{0085}'),
            Newline::Ls => Some('\u{2028}'),
            Newline::Ps => Some('\u{2029}'),
            Newline::Raw | Newline::DocumentInput => None,
        }
    }

    /// Resolve a policy marker to a literal newline, given the document's
    /// current default. Literal values resolve to themselves.
    pub fn resolve(&self, document_default: Newline) -> Newline {
        match self {
            Newline::Raw | Newline::DocumentInput => document_default,
            literal => *literal,
        }
    }
}

impl Default for Newline {
    fn default() -> Self {
        Newline::Lf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_markers_resolve_to_default() {
        assert_eq!(Newline::Raw.resolve(Newline::CrLf), Newline::CrLf);
        assert_eq!(Newline::DocumentInput.resolve(Newline::Lf), Newline::Lf);
        assert_eq!(Newline::Cr.resolve(Newline::CrLf), Newline::Cr);
    }

    #[test]
    fn literal_lengths() {
        assert_eq!(Newline::Lf.len_utf16(), 1);
        assert_eq!(Newline::CrLf.len_utf16(), 2);
        assert_eq!(Newline::Raw.len_utf16(), 0);
    }
}
