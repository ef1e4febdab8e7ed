//! `TextFileStreamBuffer`: presents a UTF-16 character stream over a
//! file's raw bytes, chunking them through a `Codec` and handling BOM
//! detect-on-read / emit-on-write (spec §4.6).

use ascension_encoding::{Codec, ConversionResult, EncodingDetector, Flags, SubstitutionPolicy, UnicodeAutoDetect};
use ascension_primitives::AscensionError;
use ascension_unicode::Char;

use crate::error::FileIoError;

const CHUNK_UNITS: usize = 16 * 1024;

pub struct ReadOutcome {
    pub text: String,
    pub bom_detected: bool,
}

/// Decodes `bytes` fully through `codec`, reassembling the UTF-8 text.
/// `codec` carries cross-call state, so this always starts from a fresh
/// decoding state and runs to completion in one pass.
pub fn decode_all(mut codec: Box<dyn Codec + Send>, bytes: &[u8]) -> Result<ReadOutcome, FileIoError> {
    codec.reset_decoding_state();
    let bom_detected = starts_with_known_bom(bytes);
    let mut units: Vec<Char> = Vec::with_capacity(bytes.len());
    let mut dst = [0u16; CHUNK_UNITS];
    let mut src_pos = 0;
    let mut first = true;

    loop {
        let remaining = &bytes[src_pos..];
        let mut flags = Flags::empty();
        if first {
            flags.insert(Flags::BEGINNING_OF_BUFFER);
        }
        flags.insert(Flags::END_OF_BUFFER);

        let progress = codec.to_unicode(&mut dst, remaining, flags, SubstitutionPolicy::Replace);
        first = false;
        units.extend_from_slice(&dst[..progress.dst_next]);
        src_pos += progress.src_next;

        match progress.result {
            ConversionResult::Completed => break,
            ConversionResult::InsufficientBuffer => {
                if progress.src_next == 0 && progress.dst_next == 0 {
                    return Err(AscensionError::MalformedInput.into());
                }
                continue;
            }
            ConversionResult::UnmappableCharacter => return Err(AscensionError::UnmappableCharacter.into()),
            ConversionResult::MalformedInput => return Err(AscensionError::MalformedInput.into()),
        }
    }

    let text: String = char::decode_utf16(units).map(|r| r.unwrap_or('\u{FFFD}')).collect();
    Ok(ReadOutcome { text, bom_detected })
}

/// Encodes `text` through `codec`, requesting a leading BOM when
/// `emit_bom` is set and the codec honors `Flags::UNICODE_BOM`.
pub fn encode_all(mut codec: Box<dyn Codec + Send>, text: &str, emit_bom: bool) -> Result<Vec<u8>, FileIoError> {
    codec.reset_encoding_state();
    let units: Vec<Char> = text.encode_utf16().collect();
    let mut out = Vec::with_capacity(units.len() * 2);
    let mut dst = [0u8; CHUNK_UNITS * 4];
    let mut src_pos = 0;
    let mut first = true;

    loop {
        let remaining = &units[src_pos..];
        let mut flags = Flags::empty();
        if first {
            flags.insert(Flags::BEGINNING_OF_BUFFER);
            if emit_bom {
                flags.insert(Flags::UNICODE_BOM);
            }
        }
        flags.insert(Flags::END_OF_BUFFER);

        let progress = codec.from_unicode(&mut dst, remaining, flags, SubstitutionPolicy::Replace);
        first = false;
        out.extend_from_slice(&dst[..progress.dst_next]);
        src_pos += progress.src_next;

        match progress.result {
            ConversionResult::Completed => break,
            ConversionResult::InsufficientBuffer => continue,
            ConversionResult::UnmappableCharacter => return Err(AscensionError::UnmappableCharacter.into()),
            ConversionResult::MalformedInput => unreachable!("from_unicode never reports malformed input"),
        }
    }

    Ok(out)
}

/// The MIBenum `UnicodeAutoDetect` would pick for `bytes`, used when the
/// caller doesn't name an explicit encoding for `revert`.
pub fn sniff_mib_enum(bytes: &[u8]) -> i32 {
    UnicodeAutoDetect.detect(bytes).mib_enum
}

fn starts_with_known_bom(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xEF, 0xBB, 0xBF])
        || bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00])
        || bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF])
        || bytes.starts_with(&[0xFF, 0xFE])
        || bytes.starts_with(&[0xFE, 0xFF])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascension_encoding::Utf8Codec;

    #[test]
    fn round_trips_ascii_through_utf8() {
        let encoded = encode_all(Box::new(Utf8Codec::default()), "hello, world", false).unwrap();
        let decoded = decode_all(Box::new(Utf8Codec::default()), &encoded).unwrap();
        assert_eq!(decoded.text, "hello, world");
        assert!(!decoded.bom_detected);
    }

    #[test]
    fn sniffs_utf8_bom() {
        let encoded = encode_all(Box::new(Utf8Codec::default()), "hi", true).unwrap();
        assert_eq!(sniff_mib_enum(&encoded), 106);
        let decoded = decode_all(Box::new(Utf8Codec::default()), &encoded).unwrap();
        assert!(decoded.bom_detected);
        assert_eq!(decoded.text, "hi");
    }
}
