//! Legacy single- and double-byte codecs (spec §4.2, "Legacy codecs").
//!
//! A `SbcsTable` is a declarative 256-entry byte→char "wire" built from 16
//! rows of 16 code points (mirroring how the original maps a code page's
//! 16x16 glyph grid); the reverse char→byte table is derived once at
//! construction. `DbcsTable` is the double-byte analogue keyed by 16-bit
//! lead/trail pairs.

use std::collections::HashMap;

use ascension_unicode::{Char, decode, encode, is_high_surrogate, is_low_surrogate};

use crate::codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};

/// A 256-entry byte→codepoint table, given as 16 rows of 16 entries each
/// (`0xFFFD` marks an unmapped byte).
pub struct SbcsTable {
    pub name: &'static str,
    pub mib_enum: i32,
    pub aliases: &'static [&'static str],
    pub rows: [[u32; 16]; 16],
}

pub struct SbcsCodec {
    to_char: [u32; 256],
    from_char: HashMap<u32, u8>,
    name: &'static str,
    mib_enum: i32,
    aliases: &'static [&'static str],
}

impl SbcsCodec {
    pub fn new(table: &SbcsTable) -> Self {
        let mut to_char = [0xFFFDu32; 256];
        let mut from_char = HashMap::new();
        for (row_i, row) in table.rows.iter().enumerate() {
            for (col_i, &cp) in row.iter().enumerate() {
                let byte = (row_i * 16 + col_i) as u8;
                to_char[byte as usize] = cp;
                if cp != 0xFFFD {
                    from_char.entry(cp).or_insert(byte);
                }
            }
        }
        Self {
            to_char,
            from_char,
            name: table.name,
            mib_enum: table.mib_enum,
            aliases: table.aliases,
        }
    }
}

impl Codec for SbcsCodec {
    fn properties(&self) -> CodecProperties {
        CodecProperties {
            name: self.name,
            mib_enum: self.mib_enum,
            aliases: self.aliases,
            max_native_bytes_per_char: 1,
            max_chars_per_native: 1,
            substitution_byte: b'?',
            display_name: self.name,
        }
    }

    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        _flags: Flags,
        policy: SubstitutionPolicy,
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

            if dst_i >= dst.len() {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }

            match self.from_char.get(&cp) {
                Some(&byte) => {
                    dst[dst_i] = byte;
                    dst_i += 1;
                }
                None => match policy {
                    SubstitutionPolicy::Abort => {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::UnmappableCharacter,
                        };
                    }
                    SubstitutionPolicy::Ignore => {}
                    SubstitutionPolicy::Replace => {
                        dst[dst_i] = b'?';
                        dst_i += 1;
                    }
                },
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
            let cp = self.to_char[src[src_i] as usize];
            if cp == 0xFFFD && policy == SubstitutionPolicy::Abort {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::MalformedInput,
                };
            }
            if cp == 0xFFFD && policy == SubstitutionPolicy::Ignore {
                src_i += 1;
                continue;
            }
            let mut buf = [0u16; 2];
            let n = encode(cp, &mut buf).unwrap_or(1);
            if dst.len() - dst_i < n {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i..dst_i + n].copy_from_slice(&buf[..n]);
            dst_i += n;
            src_i += 1;
        }

        Progress {
            src_next: src_i,
            dst_next: dst_i,
            result: ConversionResult::Completed,
        }
    }
}

pub const ISO_8859_1: SbcsTable = SbcsTable {
    name: "ISO-8859-1",
    mib_enum: 4,
    aliases: &["latin1", "ISO_8859-1", "l1"],
    // ISO-8859-1 maps byte N to code point N for the entire range.
    rows: identity_rows(),
};

pub const US_ASCII: SbcsTable = SbcsTable {
    name: "US-ASCII",
    mib_enum: 3,
    aliases: &["ASCII", "us", "ANSI_X3.4-1968"],
    rows: ascii_rows(),
};

const fn identity_rows() -> [[u32; 16]; 16] {
    let mut rows = [[0u32; 16]; 16];
    let mut r = 0;
    while r < 16 {
        let mut c = 0;
        while c < 16 {
            rows[r][c] = (r * 16 + c) as u32;
            c += 1;
        }
        r += 1;
    }
    rows
}

const fn ascii_rows() -> [[u32; 16]; 16] {
    let mut rows = identity_rows();
    let mut r = 8;
    while r < 16 {
        let mut c = 0;
        while c < 16 {
            rows[r][c] = 0xFFFD;
            c += 1;
        }
        r += 1;
    }
    rows
}

/// A double-byte lead/trail table: `leads` marks which bytes start a
/// two-byte sequence, `map` gives the code point for each (lead, trail)
/// pair actually assigned. Real CJK code pages assign tens of thousands
/// of pairs; this generic machinery is exercised in tests with a small
/// synthetic table rather than a full Shift_JIS/GB2312/Big5 mapping.
pub struct DbcsTable {
    pub name: &'static str,
    pub mib_enum: i32,
    pub aliases: &'static [&'static str],
    pub leads: fn(u8) -> bool,
    pub pairs: &'static [((u8, u8), u32)],
}

pub struct DbcsCodec {
    to_char: HashMap<(u8, u8), u32>,
    from_char: HashMap<u32, (u8, u8)>,
    leads: fn(u8) -> bool,
    name: &'static str,
    mib_enum: i32,
    aliases: &'static [&'static str],
}

impl DbcsCodec {
    pub fn new(table: &DbcsTable) -> Self {
        let mut to_char = HashMap::new();
        let mut from_char = HashMap::new();
        for &(pair, cp) in table.pairs {
            to_char.insert(pair, cp);
            from_char.entry(cp).or_insert(pair);
        }
        Self {
            to_char,
            from_char,
            leads: table.leads,
            name: table.name,
            mib_enum: table.mib_enum,
            aliases: table.aliases,
        }
    }
}

impl Codec for DbcsCodec {
    fn properties(&self) -> CodecProperties {
        CodecProperties {
            name: self.name,
            mib_enum: self.mib_enum,
            aliases: self.aliases,
            max_native_bytes_per_char: 2,
            max_chars_per_native: 1,
            substitution_byte: b'?',
            display_name: self.name,
        }
    }

    fn from_unicode(
        &mut self,
        dst: &mut [u8],
        src: &[Char],
        _flags: Flags,
        policy: SubstitutionPolicy,
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

            match self.from_char.get(&cp) {
                Some(&(lead, trail)) => {
                    if dst.len() - dst_i < 2 {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i] = lead;
                    dst[dst_i + 1] = trail;
                    dst_i += 2;
                }
                None if cp < 0x80 => {
                    if dst_i >= dst.len() {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::InsufficientBuffer,
                        };
                    }
                    dst[dst_i] = cp as u8;
                    dst_i += 1;
                }
                None => match policy {
                    SubstitutionPolicy::Abort => {
                        return Progress {
                            src_next: src_i,
                            dst_next: dst_i,
                            result: ConversionResult::UnmappableCharacter,
                        };
                    }
                    SubstitutionPolicy::Ignore => {}
                    SubstitutionPolicy::Replace => {
                        if dst_i >= dst.len() {
                            return Progress {
                                src_next: src_i,
                                dst_next: dst_i,
                                result: ConversionResult::InsufficientBuffer,
                            };
                        }
                        dst[dst_i] = b'?';
                        dst_i += 1;
                    }
                },
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
            let lead = src[src_i];
            if !(self.leads)(lead) {
                if dst_i >= dst.len() {
                    return Progress {
                        src_next: src_i,
                        dst_next: dst_i,
                        result: ConversionResult::InsufficientBuffer,
                    };
                }
                dst[dst_i] = lead as Char;
                dst_i += 1;
                src_i += 1;
                continue;
            }
            if src_i + 1 >= src.len() {
                break;
            }
            let trail = src[src_i + 1];
            let cp = *self.to_char.get(&(lead, trail)).unwrap_or(&0xFFFD);
            if cp == 0xFFFD && policy == SubstitutionPolicy::Abort {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::MalformedInput,
                };
            }
            if cp == 0xFFFD && policy == SubstitutionPolicy::Ignore {
                src_i += 2;
                continue;
            }
            if dst_i >= dst.len() {
                return Progress {
                    src_next: src_i,
                    dst_next: dst_i,
                    result: ConversionResult::InsufficientBuffer,
                };
            }
            dst[dst_i] = cp as Char;
            dst_i += 1;
            src_i += 2;
        }

        Progress {
            src_next: src_i,
            dst_next: dst_i,
            result: ConversionResult::Completed,
        }
    }
}
