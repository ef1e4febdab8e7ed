//! Encoding detection (spec §4.2 "Encoding detector"). Detectors are
//! registered by name; the built-in `UnicodeAutoDetect` tests BOM
//! signatures in the order that disambiguates UTF-32 from UTF-16 (both
//! can start with `FF FE`), falling back to a UTF-8 confidence scan.

/// The detector's best guess: the MIBenum it would hand to
/// [`CodecRegistry::for_mib`](crate::CodecRegistry::for_mib), plus how
/// many leading bytes of `input` that guess is confident about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub mib_enum: i32,
    pub confidence: usize,
}

pub trait EncodingDetector {
    fn name(&self) -> &'static str;
    fn detect(&self, input: &[u8]) -> Detection;
}

#[derive(Debug, Default)]
pub struct UnicodeAutoDetect;

/// First byte values that can never legally start a well-formed UTF-8
/// sequence, used as the fallback scan's stopping condition.
fn is_utf8_breaking_byte(b: u8) -> bool {
    b == 0xC0 || b == 0xC1 || b >= 0xF5
}

impl EncodingDetector for UnicodeAutoDetect {
    fn name(&self) -> &'static str {
        "UnicodeAutoDetect"
    }

    fn detect(&self, input: &[u8]) -> Detection {
        if input.starts_with(&crate::utf8::BOM) {
            return Detection {
                mib_enum: 106,
                confidence: input.len(),
            };
        }
        if input.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
            return Detection {
                mib_enum: 1019,
                confidence: 4,
            };
        }
        if input.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            return Detection {
                mib_enum: 1018,
                confidence: 4,
            };
        }
        if input.starts_with(&[0xFF, 0xFE]) {
            return Detection {
                mib_enum: 1014,
                confidence: 2,
            };
        }
        if input.starts_with(&[0xFE, 0xFF]) {
            return Detection {
                mib_enum: 1013,
                confidence: 2,
            };
        }

        let confidence = input
            .iter()
            .position(|&b| is_utf8_breaking_byte(b))
            .unwrap_or(input.len());
        Detection {
            mib_enum: 106,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_utf8_bom() {
        let detector = UnicodeAutoDetect;
        let detection = detector.detect(&[0xEF, 0xBB, 0xBF, b'h']);
        assert_eq!(detection.mib_enum, 106);
    }

    #[test]
    fn disambiguates_utf32_from_utf16_on_shared_prefix() {
        let detector = UnicodeAutoDetect;
        assert_eq!(detector.detect(&[0xFF, 0xFE, 0x00, 0x00]).mib_enum, 1019);
        assert_eq!(detector.detect(&[0xFF, 0xFE, b'h', 0x00]).mib_enum, 1014);
    }

    #[test]
    fn falls_back_to_utf8_confidence_scan() {
        let detector = UnicodeAutoDetect;
        let detection = detector.detect(b"hello\xC0world");
        assert_eq!(detection.mib_enum, 106);
        assert_eq!(detection.confidence, 5);
    }
}
