//! The codec registry: lookup by MIBenum, case-insensitive name, CCSID or
//! Windows code page, plus enumeration and a platform default (spec §4.2
//! "Registry", §6.2 "stable identifiers").

use std::collections::HashMap;
use std::sync::Mutex;

use ascension_primitives::{AscensionError, Result};
use tracing::trace;

use crate::codec::{Codec, CodecProperties};
use crate::legacy::{ISO_8859_1, SbcsCodec, US_ASCII};
use crate::utf7::Utf7Codec;
use crate::utf8::Utf8Codec;
use crate::utf16::{Endian, Utf16Codec};
use crate::utf32::Utf32Codec;

/// A codec factory: registries store how to *construct* a codec rather
/// than a shared instance, since codecs carry per-stream state.
type Factory = fn() -> Box<dyn Codec + Send>;

struct Entry {
    properties: CodecProperties,
    factory: Factory,
    ccsid: Option<i32>,
    windows_code_page: Option<u32>,
}

/// Registered codecs, keyed by MIBenum. Name/alias lookup matches UTS #22
/// §1.4: case-fold, drop non-alphanumerics, ignore leading zeros in any
/// numeric run.
pub struct CodecRegistry {
    by_mib: HashMap<i32, Entry>,
}

fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_number = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if c.is_ascii_digit() {
                if !in_number && c == '0' {
                    // Drop leading zeros: skip until a non-zero digit or
                    // the run ends, handled by just not pushing '0' at
                    // the start of a numeric run.
                    continue;
                }
                in_number = true;
            } else {
                in_number = false;
            }
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

impl CodecRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            by_mib: HashMap::new(),
        };
        registry.register::<Utf8Codec>(106, None, None);
        registry.register_with(
            1014,
            || Box::new(Utf16Codec::new(Endian::Little)) as Box<dyn Codec + Send>,
            None,
            None,
        );
        registry.register_with(
            1013,
            || Box::new(Utf16Codec::new(Endian::Big)) as Box<dyn Codec + Send>,
            None,
            None,
        );
        registry.register_with(
            1019,
            || Box::new(Utf32Codec::new(Endian::Little)) as Box<dyn Codec + Send>,
            None,
            None,
        );
        registry.register_with(
            1018,
            || Box::new(Utf32Codec::new(Endian::Big)) as Box<dyn Codec + Send>,
            None,
            None,
        );
        registry.register::<Utf7Codec>(1012, None, None);
        registry.register_with(
            3,
            || Box::new(SbcsCodec::new(&US_ASCII)) as Box<dyn Codec + Send>,
            Some(367),
            Some(20127),
        );
        registry.register_with(
            4,
            || Box::new(SbcsCodec::new(&ISO_8859_1)) as Box<dyn Codec + Send>,
            Some(819),
            Some(28591),
        );
        registry
    }

    fn register<C: Codec + Default + Send + 'static>(
        &mut self,
        mib: i32,
        ccsid: Option<i32>,
        windows_code_page: Option<u32>,
    ) {
        self.register_with(mib, || Box::new(C::default()), ccsid, windows_code_page);
    }

    fn register_with(
        &mut self,
        mib: i32,
        factory: Factory,
        ccsid: Option<i32>,
        windows_code_page: Option<u32>,
    ) {
        let properties = factory().properties();
        trace!(target: "encoding.registry", mib, name = properties.name, "codec_registered");
        self.by_mib.insert(
            mib,
            Entry {
                properties,
                factory,
                ccsid,
                windows_code_page,
            },
        );
    }

    pub fn for_mib(&self, id: i32) -> Result<Box<dyn Codec + Send>> {
        self.by_mib
            .get(&id)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| AscensionError::UnsupportedEncoding(format!("mib:{id}")))
    }

    pub fn for_name(&self, name: &str) -> Result<Box<dyn Codec + Send>> {
        let target = normalize_name(name);
        for entry in self.by_mib.values() {
            if normalize_name(entry.properties.name) == target {
                return Ok((entry.factory)());
            }
            if entry
                .properties
                .aliases
                .iter()
                .any(|alias| normalize_name(alias) == target)
            {
                return Ok((entry.factory)());
            }
        }
        trace!(target: "encoding.registry", name, "codec_lookup_failed");
        Err(AscensionError::UnsupportedEncoding(name.to_string()))
    }

    pub fn for_ccsid(&self, id: i32) -> Result<Box<dyn Codec + Send>> {
        self.by_mib
            .values()
            .find(|entry| entry.ccsid == Some(id))
            .map(|entry| (entry.factory)())
            .ok_or_else(|| AscensionError::UnsupportedEncoding(format!("ccsid:{id}")))
    }

    pub fn for_windows_code_page(&self, cp: u32) -> Result<Box<dyn Codec + Send>> {
        self.by_mib
            .values()
            .find(|entry| entry.windows_code_page == Some(cp))
            .map(|entry| (entry.factory)())
            .ok_or_else(|| AscensionError::UnsupportedEncoding(format!("windows-{cp}")))
    }

    pub fn available_encodings(&self) -> impl Iterator<Item = (i32, CodecProperties)> + '_ {
        self.by_mib
            .iter()
            .map(|(&mib, entry)| (mib, entry.properties.clone()))
    }

    pub fn default_instance(&self) -> Box<dyn Codec + Send> {
        self.for_mib(106).expect("UTF-8 is always registered")
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Mutex<Option<&'static CodecRegistry>> = Mutex::new(None);

/// The process-wide registry, built on first use. Grounded on the
/// teacher's `once`-style lazy singletons for shared read-only state.
pub fn global() -> &'static CodecRegistry {
    let mut guard = GLOBAL.lock().unwrap();
    if guard.is_none() {
        *guard = Some(Box::leak(Box::new(CodecRegistry::new())));
    }
    guard.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_by_mib_and_name_and_alias() {
        let registry = CodecRegistry::new();
        assert!(registry.for_mib(106).is_ok());
        assert!(registry.for_name("utf-8").is_ok());
        assert!(registry.for_name("UTF8").is_ok());
        assert!(registry.for_name("nonexistent-codec").is_err());
    }

    #[test]
    fn looks_up_by_ccsid_and_windows_code_page() {
        let registry = CodecRegistry::new();
        assert!(registry.for_ccsid(819).is_ok());
        assert!(registry.for_windows_code_page(20127).is_ok());
    }

    #[test]
    fn default_instance_is_utf8() {
        let registry = CodecRegistry::new();
        assert_eq!(registry.default_instance().properties().name, "UTF-8");
    }
}
