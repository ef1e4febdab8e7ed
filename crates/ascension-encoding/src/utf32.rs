//! UTF-32LE/BE codecs: fixed 4-byte-per-scalar encodings. Non-scalar or
//! surrogate code points are handled per `SubstitutionPolicy` rather than
//! silently passed through (spec §4.2).

use ascension_unicode::{Char, decode, encode, is_high_surrogate, is_low_surrogate};

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};
use crate::utf16::Endian;

#[derive(Debug)]
pub struct Utf32Codec {
    endian: Endian,
}

impl Utf32Codec {
    pub fn new(endian: Endian) -> Self {
        Self { endian }
    }

    fn bom(&self) -> [u8; 4] {
        match self.endian {
            Endian::Little => [0xFF, 0xFE, 0x00, 0x00],
            Endian::Big => [0x00, 0x00, 0xFE, 0xFF],
        }
    }

    fn read(&self, b: [u8; 4]) -> u32 {
        match self.endian {
            Endian::Little => u32::from_le_bytes(b),
            Endian::Big => u32::from_be_bytes(b),
        }
    }

    fn write(&self, v: u32) -> [u8; 4] {
        match self.endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }
}

impl Codec for Utf32Codec {
    fn properties(&self) -> CodecProperties {
        match self.endian {
            Endian::Little => CodecProperties {
                name: "UTF-32LE",
                mib_enum: 1019,
                aliases: &["UTF32LE"],
                max_native_bytes_per_char: 4,
                max_chars_per_native: 1,
                substitution_byte: 0xFD,
                display_name: "Unicode (UTF-32LE)",
            },
            Endian::Big => CodecProperties {
                name: "UTF-32BE",
                mib_enum: 1018,
                aliases: &["UTF32BE"],
                max_native_bytes_per_char: 4,
                max_chars_per_native: 1,
                substitution_byte: 0xFD,
                display_name: "Unicode (UTF-32BE)",
            },
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
            if dst.len() - dst_i < 4 {
                return Progress {
                    src_next: 0,
                    dst_next: 0,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + 4].copy_from_slice(&self.bom());
            dst_i += 4;
        }

        while src_i < src.len() {
            let unit = src[src_i];
            let (cp, consumed) = if is_high_surrogate(unit) && src_i + 1 < src.len() && is_low_surrogate(src[src_i + 1]) {
                (decode(unit, src[src_i + 1]), 2)
            } else {
                (unit as u32, 1)
            };

            if dst.len() - dst_i < 4 {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + 4].copy_from_slice(&self.write(cp));
            dst_i += 4;
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
        flags: Flags,
        policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        if flags.contains(Flags::BEGINNING_OF_BUFFER) && src.len() >= 4 && src[..4] == self.bom() {
            src_i += 4;
        }

        while src.len() - src_i >= 4 {
            let cp = self.read([src[src_i], src[src_i + 1], src[src_i + 2], src[src_i + 3]]);
            let mut buf = [0u16; 2];
            match encode(cp, &mut buf) {
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
                    src_i += 4;
                }
                Err(_) => match policy {
                    SubstitutionPolicy::Abort => {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::MalformedInput,
                        };
                    }
                    SubstitutionPolicy::Ignore => src_i += 4,
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
                        src_i += 4;
                    }
                },
            }
        }

        if !src[src_i..].is_empty() && flags.contains(Flags::END_OF_BUFFER) {
            return Progress {
                src_next: src_i,
                dst_next: dst_i,
                result: ConversionResult::MalformedInput,
            };
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
    fn round_trips_supplementary_plane() {
        let mut codec = Utf32Codec::new(Endian::Big);
        let units: Vec<Char> = "\u{1F600}z".encode_utf16().collect();
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
    fn rejects_surrogate_scalar_with_abort_policy() {
        let mut codec = Utf32Codec::new(Endian::Little);
        let mut dst = [0u16; 4];
        let surrogate_bytes = 0xD800u32.to_le_bytes();
        let prog = codec.to_unicode(&mut dst, &surrogate_bytes, Flags::empty(), SubstitutionPolicy::Abort);
        assert_eq!(prog.result, ConversionResult::MalformedInput);
    }
}
