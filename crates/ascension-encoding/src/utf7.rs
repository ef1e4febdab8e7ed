//! UTF-7 codec (RFC 2152-style modified BASE64), spec §4.2 "UTF-7".
//!
//! Direct-encodable code units pass through as-is; `+` becomes `+-`;
//! everything else is packed into modified BASE64 runs. The in/out-of-
//! BASE64 state, plus the partial bit buffer, survives across calls so a
//! caller can feed the codec one chunk at a time.

use ascension_unicode::Char;

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn base64_value(byte: u8) -> Option<u8> {
    BASE64_ALPHABET.iter().position(|&b| b == byte).map(|i| i as u8)
}

fn is_direct(unit: Char) -> bool {
    if unit > 0x7F {
        return false;
    }
    let c = unit as u8 as char;
    c.is_ascii_alphanumeric() || "'(),-./:? \t\r\n".contains(c)
}

#[derive(Debug, Default)]
pub struct Utf7Codec {
    enc_in_base64: bool,
    enc_bits: u32,
    enc_bit_count: u32,
    dec_in_base64: bool,
    dec_bits: u32,
    dec_bit_count: u32,
}

impl Utf7Codec {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_encoder_run(&mut self, dst: &mut [u8], dst_i: &mut usize) -> bool {
        if self.enc_bit_count > 0 {
            if *dst_i >= dst.len() {
                return false;
            }
            let shift = 6 - self.enc_bit_count;
            let value = ((self.enc_bits << shift) & 0x3F) as u8;
            dst[*dst_i] = BASE64_ALPHABET[value as usize];
            *dst_i += 1;
            self.enc_bits = 0;
            self.enc_bit_count = 0;
        }
        if self.enc_in_base64 {
            if *dst_i >= dst.len() {
                return false;
            }
            dst[*dst_i] = b'-';
            *dst_i += 1;
            self.enc_in_base64 = false;
        }
        true
    }
}

impl Codec for Utf7Codec {
    fn properties(&self) -> CodecProperties {
        CodecProperties {
            name: "UTF-7",
            mib_enum: 1012,
            aliases: &["UTF7", "csUnicode11UTF7"],
            max_native_bytes_per_char: 8,
            max_chars_per_native: 1,
            substitution_byte: b'?',
            display_name: "Unicode (UTF-7)",
        }
    }

    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        flags: Flags,
        _policy: SubstitutionPolicy,
    ) -> Progress {
        if flags.contains(Flags::BEGINNING_OF_BUFFER) {
            *self = Self::default();
        }

        let mut src_i = 0;
        let mut dst_i = 0;

        while src_i < src.len() {
            let unit = src[src_i];
            let checkpoint = dst_i;

            if is_direct(unit) {
                if !self.flush_encoder_run(dst, &mut dst_i) {
                    dst_i = checkpoint;
                    break;
                }
                if dst_i >= dst.len() {
                    break;
                }
                dst[dst_i] = unit as u8;
                dst_i += 1;
            } else if unit == b'+' as Char {
                if !self.flush_encoder_run(dst, &mut dst_i) {
                    dst_i = checkpoint;
                    break;
                }
                if dst.len() - dst_i < 2 {
                    dst_i = checkpoint;
                    break;
                }
                dst[dst_i] = b'+';
                dst[dst_i + 1] = b'-';
                dst_i += 2;
            } else {
                if !self.enc_in_base64 {
                    if dst_i >= dst.len() {
                        break;
                    }
                    dst[dst_i] = b'+';
                    dst_i += 1;
                    self.enc_in_base64 = true;
                }
                self.enc_bits = (self.enc_bits << 16) | unit as u32;
                self.enc_bit_count += 16;
                while self.enc_bit_count >= 6 {
                    if dst_i >= dst.len() {
                        return Progress {
                            src_next: src_i,
                            dst_next: checkpoint,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    let shift = self.enc_bit_count - 6;
                    let value = ((self.enc_bits >> shift) & 0x3F) as u8;
                    dst[dst_i] = BASE64_ALPHABET[value as usize];
                    dst_i += 1;
                    self.enc_bit_count -= 6;
                }
            }
            src_i += 1;
        }

        if src_i >= src.len() && flags.contains(Flags::END_OF_BUFFER) {
            let checkpoint = dst_i;
            if !self.flush_encoder_run(dst, &mut dst_i) {
                dst_i = checkpoint;
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
        if flags.contains(Flags::BEGINNING_OF_BUFFER) {
            *self = Self::default();
        }

        let mut src_i = 0;
        let mut dst_i = 0;

        while src_i < src.len() {
            let byte = src[src_i];

            if !self.dec_in_base64 {
                if byte == b'+' {
                    self.dec_in_base64 = true;
                    self.dec_bits = 0;
                    self.dec_bit_count = 0;
                    src_i += 1;
                } else {
                    if dst_i >= dst.len() {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i] = byte as Char;
                    dst_i += 1;
                    src_i += 1;
                }
                continue;
            }

            // In a BASE64 run.
            if byte == b'-' {
                if self.dec_bit_count == 0 {
                    // "+-" is the literal '+'.
                    if dst_i >= dst.len() {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i] = b'+' as Char;
                    dst_i += 1;
                }
                self.dec_in_base64 = false;
                src_i += 1;
                continue;
            }

            match base64_value(byte) {
                Some(value) => {
                    self.dec_bits = (self.dec_bits << 6) | value as u32;
                    self.dec_bit_count += 6;
                    if self.dec_bit_count >= 16 {
                        let shift = self.dec_bit_count - 16;
                        let unit = ((self.dec_bits >> shift) & 0xFFFF) as Char;
                        if dst_i >= dst.len() {
                            return Progress {
                                src_next: src_i,
                                dst_next: dst_i,
                                result: ConversionResult::InsufficientBuffer,
                            };
                        }
                        dst[dst_i] = unit;
                        dst_i += 1;
                        self.dec_bit_count -= 16;
                    }
                    src_i += 1;
                }
                None => {
                    // Non-BASE64, non-'-' byte ends the run implicitly.
                    self.dec_in_base64 = false;
                }
            }
        }

        if flags.contains(Flags::END_OF_BUFFER) && self.dec_in_base64 {
            self.dec_in_base64 = false;
            if self.dec_bit_count >= 6 {
                return match policy {
                    SubstitutionPolicy::Abort => Progress {
                        src_next: src_i,
                        dst_next: dst_i,
                        result: ConversionResult::MalformedInput,
                    },
                    _ => Progress {
                        src_next: src_i,
                        dst_next: dst_i,
                        result: ConversionResult::Completed,
                    },
                };
            }
        }

        Progress {
            src_next: src_i,
            dst_next: dst_i,
            result: ConversionResult::Completed,
        }
    }
}
