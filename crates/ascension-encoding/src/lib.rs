//! The encoding framework: the `Codec` trait, the Unicode transformation
//! formats, legacy SBCS/DBCS codecs, the codec registry and encoding
//! detection (spec component B).

mod codec;
mod detector;
mod legacy;
mod registry;
mod utf5;
mod utf7;
mod utf8;
mod utf16;
mod utf32;

pub use codec::{Codec, CodecProperties, ConversionResult, Flags, Progress, SubstitutionPolicy};
pub use detector::{Detection, EncodingDetector, UnicodeAutoDetect};
pub use legacy::{DbcsCodec, DbcsTable, ISO_8859_1, SbcsCodec, SbcsTable, US_ASCII};
pub use registry::{CodecRegistry, global as global_registry};
pub use utf5::Utf5Codec;
pub use utf7::Utf7Codec;
pub use utf8::Utf8Codec;
pub use utf16::{Endian, Utf16Codec};
pub use utf32::Utf32Codec;
