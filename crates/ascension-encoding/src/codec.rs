//! The `Codec` trait and the small value types its `from_unicode`/
//! `to_unicode` contract is built from (spec §4.2).

use ascension_unicode::Char;

bitflags::bitflags! {
    /// Per-call hints threaded through a conversion (spec §4.2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// `src`/`dst` is the start of a logical stream; BOM handling only
        /// triggers when this is set.
        const BEGINNING_OF_BUFFER = 0b001;
        /// `src` contains everything left in the logical stream, so the
        /// codec should flush trailing state (e.g. UTF-7's BASE64 run)
        /// rather than waiting for more input.
        const END_OF_BUFFER = 0b010;
        /// Set by the caller to request a BOM on encode, or returned by
        /// the codec to report one was consumed on decode.
        const UNICODE_BOM = 0b100;
    }
}

/// What a caller does with a character the target encoding can't
/// represent, or with malformed input on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionPolicy {
    /// Stop and return the matching error result.
    Abort,
    /// Write the codec's substitution byte(s)/character and continue.
    Replace,
    /// Drop the offending unit and continue.
    Ignore,
}

/// Outcome of one `from_unicode`/`to_unicode` call. `from_unicode` never
/// returns `MalformedInput` — invalid UTF-16 going in is a caller bug, not
/// a codec-reported condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionResult {
    Completed,
    InsufficientBuffer,
    UnmappableCharacter,
    MalformedInput,
}

/// Static facts about a codec, returned by [`Codec::properties`].
#[derive(Debug, Clone)]
pub struct CodecProperties {
    pub name: &'static str,
    pub mib_enum: i32,
    pub aliases: &'static [&'static str],
    pub max_native_bytes_per_char: u8,
    pub max_chars_per_native: u8,
    pub substitution_byte: u8,
    pub display_name: &'static str,
}

/// Progress report from a conversion call: how far into `src` and `dst`
/// the codec got before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub src_next: usize,
    pub dst_next: usize,
    pub result: ConversionResult,
}

/// A bidirectional converter between UTF-16 code units and a native byte
/// encoding. Implementations may carry one byte of cross-call state (e.g.
/// UTF-7's in-BASE64 flag); `reset_encoding_state`/`reset_decoding_state`
/// clear it between unrelated streams.
pub trait Codec {
    fn properties(&self) -> CodecProperties;

    /// `src` is UTF-16 code units, `dst` is native bytes.
    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        flags: Flags,
        policy: SubstitutionPolicy,
    ) -> Progress;

    /// `src` is native bytes, `dst` is UTF-16 code units.
    fn to_unicode(
        &mut self,
        dst: &mut [Char],
        src: &[u8],
        flags: Flags,
        policy: SubstitutionPolicy,
    ) -> Progress;

    fn reset_encoding_state(&mut self) {}
    fn reset_decoding_state(&mut self) {}
}
