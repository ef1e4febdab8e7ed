//! Cross-crate scenarios exercising the facade as a whole: document edits
//! driving undo, encoding round-trips, search/replace, URI detection, file
//! revert/write, and viewport scroll notification (spec §8).

use std::fs;

use ascension::encoding::{Codec, Flags, SubstitutionPolicy, UnicodeAutoDetect};
use ascension::encoding::EncodingDetector;
use ascension::fileio::{TextFileDocumentInput, WriteOptions};
use ascension::primitives::{Handle, Position, Region, new_handle};
use ascension::rules::UriDetector;
use ascension::search::{Direction as SearchDirection, TextSearcher};
use ascension::text::Document;
use ascension::viewport::{BoundsInView, ScrollListener, ScrollPosition, TextViewport};

#[test]
fn inserting_two_lines_then_undo_narrows_back_to_one() {
    let mut doc = Document::new();
    doc.insert(Position::origin(), "first\n").unwrap();
    doc.insert(Position::new(1, 0), "second\n").unwrap();
    assert_eq!(doc.number_of_lines(), 3);

    assert!(doc.undo().unwrap());
    assert_eq!(doc.number_of_lines(), 2);
    assert_eq!(doc.text(doc.region()).unwrap(), "first\n");
}

#[test]
fn detects_utf8_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("hello".as_bytes());
    let detection = UnicodeAutoDetect.detect(&bytes);
    assert_eq!(detection.mib_enum, 106);
    assert_eq!(detection.confidence, bytes.len());
}

#[test]
fn utf8_codec_round_trips_through_facade_reexport() {
    let mut codec = ascension::encoding::global_registry().for_name("UTF-8").unwrap();
    let text = "caf\u{e9}";
    let units: Vec<ascension::unicode::Char> = text.encode_utf16().collect();
    let mut out = vec![0u8; 64];
    let progress = codec.from_unicode(
        &mut out,
        &units,
        Flags::BEGINNING_OF_BUFFER | Flags::END_OF_BUFFER,
        SubstitutionPolicy::Replace,
    );
    assert_eq!(&out[..progress.dst_next], text.as_bytes());
}

#[test]
fn literal_case_insensitive_search_finds_match() {
    let mut doc = Document::new();
    doc.insert(Position::origin(), "The Quick Brown Fox").unwrap();
    let mut searcher = TextSearcher::new();
    searcher.set_literal_pattern("quick", false, true);
    let found = searcher
        .search(&doc, Position::origin(), doc.region(), SearchDirection::Forward)
        .unwrap()
        .unwrap();
    assert_eq!(doc.text(found).unwrap(), "Quick");
}

#[test]
fn regex_replace_all_rewrites_every_match() {
    let mut doc = Document::new();
    doc.insert(Position::origin(), "cat hat bat").unwrap();
    let mut searcher = TextSearcher::new();
    searcher.set_regex_pattern(r"\w+at", true, true).unwrap();
    let region = doc.region();
    let count = searcher.replace_all(&mut doc, region, "X", None).unwrap();
    assert_eq!(count, 3);
    assert_eq!(doc.text(doc.region()).unwrap(), "X X X");
}

#[test]
fn uri_detector_finds_embedded_link() {
    let detector = UriDetector::default_iana_instance();
    let span = detector.search("see https://example.com/path for details").unwrap();
    assert_eq!(&"see https://example.com/path for details"[span.start..span.end], "https://example.com/path");
}

#[test]
fn file_revert_then_edit_then_write_round_trips_through_a_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    fs::write(&path, "alpha\nbeta\n").unwrap();

    let mut input = TextFileDocumentInput::new(&path);
    let mut doc = Document::new();
    input.revert(&mut doc, None).unwrap();
    assert_eq!(doc.text(doc.region()).unwrap(), "alpha\nbeta\n");

    doc.replace(Region::new(Position::new(0, 0), Position::new(0, 5)), "ALPHA").unwrap();
    input.write(&mut doc, WriteOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "ALPHA\nbeta\n");
    assert!(!doc.is_modified());
}

struct LastScroll {
    last_old: Option<ScrollPosition>,
}

impl ScrollListener for LastScroll {
    fn scrolled(&mut self, old_position: ScrollPosition) {
        self.last_old = Some(old_position);
    }
}

#[test]
fn viewport_scroll_to_notifies_listener_exactly_once() {
    let mut viewport = TextViewport::new(BoundsInView::new(0, 0, 640, 480));
    let recording = new_handle(LastScroll { last_old: None });
    let listener: Handle<dyn ScrollListener> = recording.clone();
    viewport.add_scroll_listener(&listener);

    viewport.scroll_to(ScrollPosition::new(3, 4));
    viewport.scroll_to(ScrollPosition::new(3, 4));

    assert_eq!(recording.borrow().last_old, Some(ScrollPosition::new(3, 4)));
    assert_eq!(viewport.position(), ScrollPosition::new(3, 4));
}
