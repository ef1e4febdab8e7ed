//! `TextFileDocumentInput`: binds a `Document` to a filesystem path
//! (spec §4.6). Revert streams the file in; write goes out through a
//! sibling temp file and an atomic rename so a crash mid-write never
//! leaves a half-written target (spec §7).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ascension_encoding::Codec;
use ascension_primitives::{AscensionError, Newline, Position};
use ascension_text::{Document, DocumentInput};

use crate::error::FileIoError;
use crate::lock::{FileLock, LockMode};
use crate::stream_buffer::{decode_all, encode_all, sniff_mib_enum};

/// Consulted when the on-disk timestamp advanced since it was last
/// recorded, before a write (or the first edit after revert) proceeds.
pub trait TimeStampDirector {
    fn confirm_unsynchronized_timestamp(&self, path: &Path) -> bool;
}

pub struct WriteOptions<'a> {
    pub encoding_name: &'a str,
    /// `None` preserves each line's own stored newline (RAW semantics).
    pub newline: Option<Newline>,
    pub bom: bool,
}

impl Default for WriteOptions<'_> {
    fn default() -> Self {
        Self {
            encoding_name: "UTF-8",
            newline: None,
            bom: false,
        }
    }
}

pub struct TextFileDocumentInput {
    path: PathBuf,
    encoding_name: String,
    bom_detected: bool,
    last_write_time: Option<SystemTime>,
    lock: FileLock,
    director: Option<Box<dyn TimeStampDirector>>,
    changeable: bool,
}

impl TextFileDocumentInput {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: canonicalize(path.as_ref()),
            encoding_name: "UTF-8".to_string(),
            bom_detected: false,
            last_write_time: None,
            lock: FileLock::new(LockMode::NoLock, false),
            director: None,
            changeable: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding_name(&self) -> &str {
        &self.encoding_name
    }

    pub fn bom_detected(&self) -> bool {
        self.bom_detected
    }

    pub fn set_lock_mode(&mut self, mode: LockMode, only_as_editing: bool) {
        self.lock = FileLock::new(mode, only_as_editing);
    }

    pub fn lock(&self) -> &FileLock {
        &self.lock
    }

    pub fn set_timestamp_director(&mut self, director: Box<dyn TimeStampDirector>) {
        self.director = Some(director);
    }

    /// Rejects edits until the next successful `revert` (e.g. after the
    /// backing file disappeared out from under the document).
    pub fn set_changeable(&mut self, changeable: bool) {
        self.changeable = changeable;
    }

    /// Streams the file in, replacing `doc`'s content. On any error the
    /// document is reset to empty, mirroring the source's all-or-nothing
    /// revert contract.
    pub fn revert(&mut self, doc: &mut Document, encoding_name: Option<&str>) -> Result<(), FileIoError> {
        let bytes = fs::read(&self.path)?;

        let codec: Box<dyn Codec + Send> = match encoding_name {
            Some(name) => ascension_encoding::global_registry().for_name(name)?,
            None => ascension_encoding::global_registry().for_mib(sniff_mib_enum(&bytes))?,
        };
        let resolved_name = codec.properties().name.to_string();

        match decode_all(codec, &bytes) {
            Ok(outcome) => {
                doc.reset_content();
                doc.insert(Position::origin(), &outcome.text)?;
                self.encoding_name = resolved_name;
                self.bom_detected = outcome.bom_detected;
                self.last_write_time = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
                doc.mark_unmodified();
                self.changeable = true;
                self.lock.acquire();
                Ok(())
            }
            Err(e) => {
                doc.reset_content();
                Err(e)
            }
        }
    }

    /// Writes `doc` to a sibling temp file, then renames it over
    /// `self.path`. The temp file is removed on any failure path (a
    /// dropped, unpersisted `NamedTempFile` deletes itself).
    pub fn write(&mut self, doc: &mut Document, options: WriteOptions<'_>) -> Result<(), FileIoError> {
        self.check_timestamp()?;

        let codec = codec_for_name(options.encoding_name)?;
        if let Some(newline) = options.newline {
            if newline.is_literal() {
                validate_newline_encodable(codec.as_ref(), newline)?;
            }
        }

        let text = render_text(doc, options.newline)?;
        let bytes = encode_all(codec, &text, options.bom)?;

        let dir = self.path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let preserved_mode = fs::metadata(&self.path).ok().map(|m| m.permissions());

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        std::io::Write::write_all(&mut temp, &bytes)?;
        temp.flush()?;
        if let Some(mode) = preserved_mode {
            let _ = fs::set_permissions(temp.path(), mode);
        }
        temp.persist(&self.path).map_err(|e| e.error)?;

        self.encoding_name = options.encoding_name.to_string();
        self.last_write_time = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        doc.mark_unmodified();
        self.lock.on_modified_changed(false);
        Ok(())
    }

    fn check_timestamp(&self) -> Result<(), FileIoError> {
        let Some(recorded) = self.last_write_time else {
            return Ok(());
        };
        let Ok(current) = fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return Ok(());
        };
        if current == recorded {
            return Ok(());
        }
        let confirmed = self
            .director
            .as_deref()
            .map(|d| d.confirm_unsynchronized_timestamp(&self.path))
            .unwrap_or(false);
        if confirmed { Ok(()) } else { Err(FileIoError::TimestampMismatch) }
    }
}

impl DocumentInput for TextFileDocumentInput {
    fn is_changeable(&self, _doc: &Document) -> bool {
        self.changeable
    }
}

fn codec_for_name(name: &str) -> Result<Box<dyn Codec + Send>, FileIoError> {
    ascension_encoding::global_registry().for_name(name).map_err(Into::into)
}

/// NEL/LS/PS are only legal on write if the target encoding's repertoire
/// covers the representative code point; the Unicode transformation
/// formats always can, legacy single-byte encodings generally can't.
fn validate_newline_encodable(codec: &dyn Codec, newline: Newline) -> Result<(), FileIoError> {
    let representative = newline.as_str().chars().next().expect("newline text is non-empty");
    let mib = codec.properties().mib_enum;
    let is_unicode_tf = mib == 106 || (1012..=1019).contains(&mib);
    if !is_unicode_tf && representative as u32 > 0x7F {
        return Err(FileIoError::UnencodableNewline(newline));
    }
    Ok(())
}

/// RAW semantics (`newline_override == None`) preserve each line's own
/// stored newline; any other choice rewrites every line ending.
fn render_text(doc: &Document, newline_override: Option<Newline>) -> Result<String, FileIoError> {
    let raw = doc.text(doc.region())?;
    let Some(target) = newline_override.filter(Newline::is_literal) else {
        return Ok(raw);
    };

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.as_str();
    while !rest.is_empty() {
        if let Some(idx) = rest.find(['\n', '\r']) {
            out.push_str(&rest[..idx]);
            out.push_str(target.as_str());
            let consumed = if rest[idx..].starts_with("\r\n") { idx + 2 } else { idx + 1 };
            rest = &rest[consumed..];
        } else {
            out.push_str(rest);
            break;
        }
    }
    Ok(out)
}

fn canonicalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverts_and_writes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        fs::write(&path, "line one\nline two\n").unwrap();

        let mut input = TextFileDocumentInput::new(&path);
        let mut doc = Document::new();
        input.revert(&mut doc, None).unwrap();
        assert_eq!(doc.text(doc.region()).unwrap(), "line one\nline two\n");
        assert_eq!(input.encoding_name(), "UTF-8");

        doc.insert(Position::new(0, 4), "XXX ").unwrap();
        input.write(&mut doc, WriteOptions::default()).unwrap();
        assert!(!doc.is_modified());

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "lineXXX  one\nline two\n");
    }

    #[test]
    fn write_rewrites_newlines_when_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        fs::write(&path, "a\nb\nc").unwrap();

        let mut input = TextFileDocumentInput::new(&path);
        let mut doc = Document::new();
        input.revert(&mut doc, None).unwrap();
        input
            .write(
                &mut doc,
                WriteOptions {
                    newline: Some(Newline::CrLf),
                    ..WriteOptions::default()
                },
            )
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a\r\nb\r\nc");
    }

    #[test]
    fn rejects_unencodable_newline_in_legacy_codec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        fs::write(&path, "a\nb\n").unwrap();

        let mut input = TextFileDocumentInput::new(&path);
        let mut doc = Document::new();
        input.revert(&mut doc, None).unwrap();
        let result = input.write(
            &mut doc,
            WriteOptions {
                encoding_name: "US-ASCII",
                newline: Some(Newline::Ls),
                ..WriteOptions::default()
            },
        );
        assert!(matches!(result, Err(FileIoError::UnencodableNewline(_))));
    }
}
