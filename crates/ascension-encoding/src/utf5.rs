//! UTF-5: an Ascension-specific hex encoding where the first nibble of a
//! code point's run lives in `G..V` (marking "more nibbles follow" via the
//! high bit) and continuation nibbles live in `0..9A..F` (spec §4.2,
//! "UTF-5"). Each run is 1..8 characters: a 32-bit code point needs at
//! most 8 hex nibbles, each carried by one output character.

use ascension_unicode::{Char, decode, encode, is_high_surrogate, is_low_surrogate};

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};

fn nibble_to_lead(n: u8) -> u8 {
    b'G' + n
}

fn lead_to_nibble(c: u8) -> Option<u8> {
    if (b'G'..=b'V').contains(&c) {
        Some(c - b'G')
    } else {
        None
    }
}

fn nibble_to_cont(n: u8) -> u8 {
    if n < 10 { b'0' + n } else { b'A' + (n - 10) }
}

fn cont_to_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Nibbles of `cp`, most-significant first, with leading zero nibbles
/// trimmed (but at least one nibble is always kept).
fn nibbles_of(cp: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    for shift in (0..8).rev() {
        out.push(((cp >> (shift * 4)) & 0xF) as u8);
    }
    while out.len() > 1 && out[0] == 0 {
        out.remove(0);
    }
    out
}

#[derive(Debug, Default)]
pub struct Utf5Codec;

impl Codec for Utf5Codec {
    fn properties(&self) -> CodecProperties {
        CodecProperties {
            name: "UTF-5",
            mib_enum: -1,
            aliases: &[],
            max_native_bytes_per_char: 8,
            max_chars_per_native: 1,
            substitution_byte: b'?',
            display_name: "Ascension UTF-5",
        }
    }

    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        _flags: Flags,
        _policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        while src_i < src.len() {
            let unit = src[src_i];
            let (cp, consumed) = if is_high_surrogate(unit) && src_i + 1 < src.len() && is_low_surrogate(src[src_i + 1]) {
                (decode(unit, src[src_i + 1]), 2)
            } else {
                (unit as u32, 1)
            };

            let nibbles = nibbles_of(cp);
            if dst.len() - dst_i < nibbles.len() {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i] = nibble_to_lead(nibbles[0]);
            dst_i += 1;
            for &n in &nibbles[1..] {
                dst[dst_i] = nibble_to_cont(n);
                dst_i += 1;
            }
            src_i += consumed;
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
        _flags: Flags,
        policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        while src_i < src.len() {
            let Some(mut value) = lead_to_nibble(src[src_i]).map(u32::from) else {
                return match policy {
                    SubstitutionPolicy::Abort => Progress {
                        src_next: src_i,
                        dst_next: dst_i,
                        result: ConversionResult::MalformedInput,
                    },
                    SubstitutionPolicy::Ignore => {
                        src_i += 1;
                        continue;
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
                        continue;
                    }
                };
            };
            let mut consumed = 1;
            while src_i + consumed < src.len() {
                match cont_to_nibble(src[src_i + consumed]) {
                    Some(n) => {
                        value = (value << 4) | n as u32;
                        consumed += 1;
                    }
                    None => break,
                }
            }

            let mut buf = [0u16; 2];
            match encode(value, &mut buf) {
                Ok(n) => {
                    if dst.len() - dst_i < n {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i..dst_i + n].copy_from_slice(&buf[..n]);
                    dst_i += n;
                }
                Err(_) => {
                    if policy == SubstitutionPolicy::Abort {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::MalformedInput,
                        };
                    }
                }
            }
            src_i += consumed;
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
        let mut codec = Utf5Codec;
        let units: Vec<Char> = "a\u{1F600}".encode_utf16().collect();
        let mut bytes = [0u8; 32];
        let enc = codec.from_unicode(&mut bytes, &units, Flags::empty(), SubstitutionPolicy::Abort);
        let mut back = [0u16; 8];
        let dec = codec.to_unicode(
            &mut back,
            &bytes[..enc.dst_next],
            Flags::empty(),
            SubstitutionPolicy::Abort,
        );
        assert_eq!(&back[..dec.dst_next], units.as_slice());
    }

    #[test]
    fn leading_nibble_marks_run_start() {
        let mut codec = Utf5Codec;
        let units: Vec<Char> = vec![0x41];
        let mut bytes = [0u8; 8];
        let prog = codec.from_unicode(&mut bytes, &units, Flags::empty(), SubstitutionPolicy::Abort);
        assert!((b'G'..=b'V').contains(&bytes[0]));
        assert_eq!(prog.dst_next, 2); // 0x41 needs 2 nibbles: 4, 1
    }
}
