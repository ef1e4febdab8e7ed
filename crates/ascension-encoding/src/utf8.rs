//! UTF-8 codec: a per-byte decode table keyed on the first byte's high
//! bits distinguishes the well-formed 1..4-byte classes and rejects
//! overlongs, isolated surrogates and code points beyond U+10FFFF
//! (spec §4.2, "UTF-8 encoder").

use ascension_unicode::{Char, decode, encode, is_high_surrogate, is_low_surrogate};

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};

pub const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Default)]
pub struct Utf8Codec;

/// First-byte classification: how many continuation bytes follow, and the
/// valid range for the *second* byte (tighter than 0x80..=0xBF for the
/// overlong/surrogate/out-of-range boundary cases).
fn first_byte_class(b: u8) -> Option<(usize, u8, u8)> {
    match b {
        0x00..=0x7F => Some((0, 0, 0)),
        0xC2..=0xDF => Some((1, 0x80, 0xBF)),
        0xE0 => Some((2, 0xA0, 0xBF)),
        0xE1..=0xEC => Some((2, 0x80, 0xBF)),
        0xED => Some((2, 0x80, 0x9F)), // excludes the surrogate range D800..DFFF
        0xEE..=0xEF => Some((2, 0x80, 0xBF)),
        0xF0 => Some((3, 0x90, 0xBF)),
        0xF1..=0xF3 => Some((3, 0x80, 0xBF)),
        0xF4 => Some((3, 0x80, 0x8F)), // caps the scalar value at 0x10FFFF
        _ => None,
    }
}

fn decode_one(src: &[u8]) -> Option<(u32, usize)> {
    let b0 = *src.first()?;
    let (extra, lo, hi) = first_byte_class(b0)?;
    if extra == 0 {
        return Some((b0 as u32, 1));
    }
    if src.len() < extra + 1 {
        return None;
    }
    let b1 = src[1];
    if b1 < lo || b1 > hi {
        return None;
    }
    for &b in &src[2..extra + 1] {
        if !(0x80..=0xBF).contains(&b) {
            return None;
        }
    }
    let cp = match extra {
        1 => ((b0 as u32 & 0x1F) << 6) | (b1 as u32 & 0x3F),
        2 => {
            ((b0 as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | (src[2] as u32 & 0x3F)
        }
        3 => {
            ((b0 as u32 & 0x07) << 18)
                | ((b1 as u32 & 0x3F) << 12)
                | ((src[2] as u32 & 0x3F) << 6)
                | (src[3] as u32 & 0x3F)
        }
        _ => unreachable!(),
    };
    Some((cp, extra + 1))
}

fn encode_one(cp: u32, dst: &mut [u8]) -> Option<usize> {
    let len = match cp {
        0x00..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        0x10000..=0x10FFFF => 4,
        _ => return None,
    };
    if dst.len() < len {
        return None;
    }
    match len {
        1 => dst[0] = cp as u8,
        2 => {
            dst[0] = 0xC0 | (cp >> 6) as u8;
            dst[1] = 0x80 | (cp & 0x3F) as u8;
        }
        3 => {
            dst[0] = 0xE0 | (cp >> 12) as u8;
            dst[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            dst[2] = 0x80 | (cp & 0x3F) as u8;
        }
        4 => {
            dst[0] = 0xF0 | (cp >> 18) as u8;
            dst[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            dst[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            dst[3] = 0x80 | (cp & 0x3F) as u8;
        }
        _ => unreachable!(),
    }
    Some(len)
}

impl Codec for Utf8Codec {
    fn properties(&self) -> CodecProperties {
        CodecProperties {
            name: "UTF-8",
            mib_enum: 106,
            aliases: &["UTF8", "unicode-1-1-utf-8"],
            max_native_bytes_per_char: 4,
            max_chars_per_native: 1,
            substitution_byte: b'?',
            display_name: "Unicode (UTF-8)",
        }
    }

    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        flags: Flags,
        _policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        if flags.contains(Flags::BEGINNING_OF_BUFFER) && flags.contains(Flags::UNICODE_BOM) {
            if dst.len() - dst_i < BOM.len() {
                return Progress {
                    src_next: 0,
                    dst_next: 0,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + BOM.len()].copy_from_slice(&BOM);
            dst_i += BOM.len();
        }

        while src_i < src.len() {
            let unit = src[src_i];
            let (cp, consumed) = if is_high_surrogate(unit) {
                if src_i + 1 >= src.len() {
                    // Unpaired high surrogate with no lookahead yet: stop
                    // without consuming it, the caller may feed more input.
                    break;
                }
                let low = src[src_i + 1];
                if is_low_surrogate(low) {
                    (decode(unit, low), 2)
                } else {
                    (unit as u32, 1)
                }
            } else {
                (unit as u32, 1)
            };

            match encode_one(cp, &mut dst[dst_i..]) {
                Some(n) => {
                    dst_i += n;
                    src_i += consumed;
                }
                None => {
                    return Progress {
                        src_next: src_i,
                        dst_next: dst_i,
                        result: ConversionResult::InsufficientBuffer,
                    };
                }
            }
        }

        Progress {
            src_next: src_i,
            dst_next: dst_i,
            result: ConversionResult::Completed,
        }
    }

    fn to_unicode(
        &mut self,
        dst: &mut [Char],
        src: &[u8],
        flags: Flags,
        policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        if flags.contains(Flags::BEGINNING_OF_BUFFER) && src.starts_with(&BOM) {
            src_i += BOM.len();
        }

        loop {
            if src_i >= src.len() {
                break;
            }
            match decode_one(&src[src_i..]) {
                Some((cp, consumed)) => {
                    let mut buf = [0u16; 2];
                    let Ok(n) = encode(cp, &mut buf) else {
                        unreachable!("decode_one never yields a non-scalar value")
                    };
                    if dst.len() - dst_i < n {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i..dst_i + n].copy_from_slice(&buf[..n]);
                    dst_i += n;
                    src_i += consumed;
                }
                None => {
                    if !flags.contains(Flags::END_OF_BUFFER) && src.len() - src_i < 4 {
                        // Might be a truncated valid sequence; wait for more bytes.
                        break;
                    }
                    match policy {
                        SubstitutionPolicy::Abort => {
                            return Progress {
                                src_next: src_i,
                                dst_next: dst_i,
                                result: ConversionResult::MalformedInput,
                            };
                        }
                        SubstitutionPolicy::Ignore => {
                            src_i += 1;
                        }
                        SubstitutionPolicy::Replace => {
                            if dst_i >= dst.len() {
                                return Progress {
                                    src_next: src_i,
                                    dst_next: dst_i,
                                    result: ConversionResult::InsufficientBuffer,
                                };
                            }
                            dst[dst_i] = 0xFFFD;
                            dst_i += 1;
                            src_i += 1;
                        }
                    }
                }
            }
        }

        Progress {
            src_next: src_i,
            dst_next: dst_i,
            result: ConversionResult::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ascii_and_supplementary() {
        let mut codec = Utf8Codec;
        let units: Vec<Char> = "A\u{1F600}".encode_utf16().collect();
        let mut bytes = [0u8; 16];
        let enc = codec.from_unicode(&mut bytes, &units, Flags::empty(), SubstitutionPolicy::Abort);
        assert_eq!(enc.result, ConversionResult::Completed);

        let mut back = [0u16; 16];
        let dec = codec.to_unicode(
            &mut back,
            &bytes[..enc.dst_next],
            Flags::empty(),
            SubstitutionPolicy::Abort,
        );
        assert_eq!(dec.result, ConversionResult::Completed);
        assert_eq!(&back[..dec.dst_next], units.as_slice());
    }

    #[test]
    fn consumes_bom_and_reports_it() {
        let mut codec = Utf8Codec;
        let mut src = BOM.to_vec();
        src.extend_from_slice(b"hi");
        let mut dst = [0u16; 8];
        let prog = codec.to_unicode(&mut dst, &src, Flags::BEGINNING_OF_BUFFER, SubstitutionPolicy::Abort);
        assert_eq!(prog.result, ConversionResult::Completed);
        assert_eq!(&dst[..prog.dst_next], &[b'h' as u16, b'i' as u16]);
    }

    #[test]
    fn rejects_overlong_and_unpaired_surrogate() {
        let mut codec = Utf8Codec;
        let mut dst = [0u16; 4];
        // C0 80 is an overlong encoding of NUL.
        let prog = codec.to_unicode(
            &mut dst,
            &[0xC0, 0x80],
            Flags::END_OF_BUFFER,
            SubstitutionPolicy::Abort,
        );
        assert_eq!(prog.result, ConversionResult::MalformedInput);
    }

    #[test]
    fn insufficient_destination_reports_short_write() {
        let mut codec = Utf8Codec;
        let units: Vec<Char> = "ab".encode_utf16().collect();
        let mut dst = [0u8; 1];
        let prog = codec.from_unicode(&mut dst, &units, Flags::empty(), SubstitutionPolicy::Abort);
        assert_eq!(prog.result, ConversionResult::InsufficientBuffer);
        assert_eq!(prog.src_next, 1);
    }
}
