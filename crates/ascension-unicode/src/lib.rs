//! UTF-16 surrogate arithmetic, simple case folding, code-point iteration,
//! and the `CharacterIterator` abstraction (spec components A and E).

mod case_fold;
mod char_iterator;
mod codepoint_iter;
mod surrogate;

pub use case_fold::{case_fold, case_fold_eq};
pub use char_iterator::{CharacterIterator, StringCharacterIterator};
pub use codepoint_iter::{Utf16CodepointIter, Utf32ToUtf16Iter};
pub use surrogate::{
    Char, CodePoint, HIGH_SURROGATE_MAX, HIGH_SURROGATE_MIN, InvalidScalarValue,
    LOW_SURROGATE_MAX, LOW_SURROGATE_MIN, decode, encode, is_high_surrogate, is_low_surrogate,
    is_scalar, is_surrogate,
};
