//! UTF-16LE/BE codecs: byte-for-byte reorderings of the UTF-16 code unit
//! stream (spec §4.2, "UTF-16/32 LE/BE encoders").

use ascension_unicode::Char;

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn bom(self) -> [u8; 2] {
        match self {
            Endian::Little => [0xFF, 0xFE],
            Endian::Big => [0xFE, 0xFF],
        }
    }

    fn read(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        }
    }

    fn write(self, value: u16) -> [u8; 2] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }
}

#[derive(Debug)]
pub struct Utf16Codec {
    endian: Endian,
}

impl Utf16Codec {
    pub fn new(endian: Endian) -> Self {
        Self { endian }
    }
}

impl Codec for Utf16Codec {
    fn properties(&self) -> CodecProperties {
        match self.endian {
            Endian::Little => CodecProperties {
                name: "UTF-16LE",
                mib_enum: 1014,
                aliases: &["UTF16LE"],
                max_native_bytes_per_char: 4,
                max_chars_per_native: 1,
                substitution_byte: 0xFD,
                display_name: "Unicode (UTF-16LE)",
            },
            Endian::Big => CodecProperties {
                name: "UTF-16BE",
                mib_enum: 1013,
                aliases: &["UTF16BE"],
                max_native_bytes_per_char: 4,
                max_chars_per_native: 1,
                substitution_byte: 0xFD,
                display_name: "Unicode (UTF-16BE)",
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
            if dst.len() - dst_i < 2 {
                return Progress {
                    src_next: 0,
                    dst_next: 0,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + 2].copy_from_slice(&self.endian.bom());
            dst_i += 2;
        }

        while src_i < src.len() {
            if dst.len() - dst_i < 2 {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + 2].copy_from_slice(&self.endian.write(src[src_i]));
            dst_i += 2;
            src_i += 1;
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
        _policy: SubstitutionPolicy,
    ) -> Progress {
        let mut src_i = 0;
        let mut dst_i = 0;

        if flags.contains(Flags::BEGINNING_OF_BUFFER)
            && src.len() >= 2
            && src[..2] == self.endian.bom()
        {
            src_i += 2;
        }

        while src.len() - src_i >= 2 {
            if dst_i >= dst.len() {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            let bytes = [src[src_i], src[src_i + 1]];
            dst[dst_i] = self.endian.read(bytes);
            dst_i += 1;
            src_i += 2;
        }

        if src.len() - src_i == 1 && flags.contains(Flags::END_OF_BUFFER) {
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
    fn round_trips_le_and_be() {
        for endian in [Endian::Little, Endian::Big] {
            let mut codec = Utf16Codec::new(endian);
            let units: Vec<Char> = "hello".encode_utf16().collect();
            let mut bytes = [0u8; 32];
            let enc = codec.from_unicode(&mut bytes, &units, Flags::empty(), SubstitutionPolicy::Abort);
            let mut back = [0u16; 16];
            let dec = codec.to_unicode(
                &mut back,
                &bytes[..enc.dst_next],
                Flags::empty(),
                SubstitutionPolicy::Abort,
            );
            assert_eq!(&back[..dec.dst_next], units.as_slice());
        }
    }

    #[test]
    fn bom_round_trips() {
        let mut codec = Utf16Codec::new(Endian::Little);
        let units: Vec<Char> = "hi".encode_utf16().collect();
        let mut bytes = [0u8; 16];
        let enc = codec.from_unicode(
            &mut bytes,
            &units,
            Flags::BEGINNING_OF_BUFFER | Flags::UNICODE_BOM,
            SubstitutionPolicy::Abort,
        );
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        let mut back = [0u16; 8];
        let dec = codec.to_unicode(
            &mut back,
            &bytes[..enc.dst_next],
            Flags::BEGINNING_OF_BUFFER,
            SubstitutionPolicy::Abort,
        );
        assert_eq!(&back[..dec.dst_next], units.as_slice());
    }
}
