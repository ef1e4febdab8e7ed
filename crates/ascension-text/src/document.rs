use std::collections::HashMap;
use std::rc::Rc;

use ascension_primitives::{AscensionError, Handle, Newline, Position, Region, Result, WeakHandle};
use ascension_unicode::Char;

use crate::bookmarker::Bookmarker;
use crate::change::DocumentChange;
use crate::document_input::DocumentInput;
use crate::gap_vector::GapVector;
use crate::line::Line;
use crate::listener::DocumentListener;
use crate::partitioner::{DocumentPartitioner, NullPartitioner, Partition};
use crate::point::Point;
use crate::undo::{EditRecord, UndoManager};

/// Which part of the document edits and the `CharacterIterator` are
/// allowed to touch (spec §3.3, supplemented from the original narrowing
/// model): either the whole document, or a single contiguous sub-region.
#[derive(Debug, Clone, Copy)]
enum AccessibleRegion {
    Whole,
    Narrowed(Region),
}

/// The central mutable text buffer (spec §3, component D).
///
/// Content lives in a [`GapVector`] of [`Line`]s; every mutation goes
/// through the single [`Document::replace`] primitive, which is also
/// where undo recording, revision bookkeeping, partitioner/listener
/// notification and point adjustment all hook in (spec §5's fixed
/// notification order).
pub struct Document {
    lines: GapVector<Line>,
    revision_number: u64,
    last_unmodified_revision_number: u64,
    accessible: AccessibleRegion,
    points: Vec<WeakHandle<crate::point::PointState>>,
    partitioner: Option<Box<dyn DocumentPartitioner>>,
    listeners: Vec<WeakHandle<dyn DocumentListener>>,
    pre_notified_listeners: Vec<WeakHandle<dyn DocumentListener>>,
    undo: UndoManager,
    bookmarks: Bookmarker,
    read_only: bool,
    properties: HashMap<String, String>,
    input: Option<WeakHandle<dyn DocumentInput>>,
    recording_suppressed: bool,
    default_newline: Newline,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut lines = GapVector::new();
        lines.push(Line::empty(Newline::default(), 0));
        Self {
            lines,
            revision_number: 0,
            last_unmodified_revision_number: 0,
            accessible: AccessibleRegion::Whole,
            points: Vec::new(),
            partitioner: Some(Box::new(NullPartitioner)),
            listeners: Vec::new(),
            pre_notified_listeners: Vec::new(),
            undo: UndoManager::new(),
            bookmarks: Bookmarker::new(),
            read_only: false,
            properties: HashMap::new(),
            input: None,
            recording_suppressed: false,
            default_newline: Newline::default(),
        }
    }

    // ---- content access ----------------------------------------------

    pub fn number_of_lines(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn line(&self, line_number: u32) -> Result<&Line> {
        self.lines
            .get(line_number as usize)
            .ok_or(AscensionError::BadPosition(Position::new(line_number, 0)))
    }

    pub fn line_length(&self, line_number: u32) -> Result<u32> {
        Ok(self.line(line_number)?.len())
    }

    /// The region spanning the whole document.
    pub fn region(&self) -> Region {
        let last = self.number_of_lines() - 1;
        let last_len = self.lines[last as usize].len();
        Region::new(Position::origin(), Position::new(last, last_len))
    }

    pub fn accessible_region(&self) -> Region {
        match self.accessible {
            AccessibleRegion::Whole => self.region(),
            AccessibleRegion::Narrowed(r) => r,
        }
    }

    pub fn is_narrowed(&self) -> bool {
        matches!(self.accessible, AccessibleRegion::Narrowed(_))
    }

    pub fn narrow_to_region(&mut self, region: Region) -> Result<()> {
        let region = region.normalized();
        self.check_region_in_whole(&region)?;
        self.accessible = AccessibleRegion::Narrowed(region);
        Ok(())
    }

    pub fn widen(&mut self) {
        self.accessible = AccessibleRegion::Whole;
    }

    /// Reconstructs the text of `region`, with literal newlines inserted
    /// between lines. `region` need not lie inside the accessible region,
    /// only inside the document as a whole.
    pub fn text(&self, region: Region) -> Result<String> {
        let region = region.normalized();
        self.check_region_in_whole(&region)?;
        Ok(self.extract_text_raw(region))
    }

    fn extract_text_raw(&self, region: Region) -> String {
        if region.is_empty() {
            return String::new();
        }
        let start = region.beginning();
        let end = region.end();
        if start.line == end.line {
            let line = &self.lines[start.line as usize];
            let units = &line.text()[start.offset_in_line as usize..end.offset_in_line as usize];
            return String::from_utf16_lossy(units);
        }
        let mut out = String::new();
        let first = &self.lines[start.line as usize];
        out.push_str(&String::from_utf16_lossy(
            &first.text()[start.offset_in_line as usize..],
        ));
        out.push_str(first.newline.as_str());
        for line_no in (start.line + 1)..end.line {
            let line = &self.lines[line_no as usize];
            out.push_str(&line.to_string_lossy());
            out.push_str(line.newline.as_str());
        }
        let last = &self.lines[end.line as usize];
        out.push_str(&String::from_utf16_lossy(
            &last.text()[..end.offset_in_line as usize],
        ));
        out
    }

    // ---- modification state -------------------------------------------

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_modified(&self) -> bool {
        self.revision_number != self.last_unmodified_revision_number
    }

    pub fn mark_unmodified(&mut self) {
        self.last_unmodified_revision_number = self.revision_number;
    }

    pub fn revision_number(&self) -> u64 {
        self.revision_number
    }

    pub fn set_input(&mut self, input: Option<WeakHandle<dyn DocumentInput>>) {
        self.input = input;
    }

    /// Discards all content and history, as if the document had just been
    /// created (spec §4.4: used when an input source is reloaded from
    /// scratch). Goes through the same about-to-change/changed notification
    /// pair as `replace` so listeners see it as one edit spanning the whole
    /// old content, drops read-only (a reload is a fresh start, not an edit
    /// a read-only document should still refuse), and relocates rather than
    /// drops registered points so existing `Point` handles keep tracking
    /// the document instead of silently freezing at a stale position.
    pub fn reset_content(&mut self) {
        let old_region = self.region();
        let change = DocumentChange::new(old_region, Region::empty_at(Position::origin()));

        let pre_notified = self.pre_notified_listeners.clone();
        let public = self.listeners.clone();

        let mut partitioner = self.partitioner.take().expect("partitioner always present");
        partitioner.about_to_change(self);
        self.notify_about_to_change(&pre_notified, &change);
        self.notify_about_to_change(&public, &change);

        self.lines.clear();
        self.lines.push(Line::empty(self.default_newline, 0));
        self.revision_number = 0;
        self.last_unmodified_revision_number = 0;
        self.accessible = AccessibleRegion::Whole;
        self.read_only = false;
        self.bookmarks.clear();
        self.undo.clear();
        self.points.retain(|w| w.strong_count() > 0);
        for weak in &self.points {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().move_to_origin();
            }
        }

        partitioner.changed(self, &change);
        self.partitioner = Some(partitioner);

        self.notify_changed(&pre_notified, &change);
        self.notify_changed(&public, &change);
    }

    // ---- properties -----------------------------------------------------

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    // ---- partitioner ----------------------------------------------------

    pub fn set_partitioner(&mut self, partitioner: Box<dyn DocumentPartitioner>) {
        self.partitioner = Some(partitioner);
    }

    pub fn partition(&self, at: Position) -> Partition {
        self.partitioner
            .as_ref()
            .expect("partitioner always present")
            .partition(self, at)
    }

    // ---- listeners ------------------------------------------------------

    pub fn add_listener(&mut self, listener: &Handle<dyn DocumentListener>) {
        self.listeners.push(ascension_primitives::downgrade(listener));
    }

    pub fn remove_listener(&mut self, listener: &Handle<dyn DocumentListener>) {
        let target = Rc::as_ptr(listener);
        self.listeners.retain(|w| !std::ptr::eq(w.as_ptr(), target));
    }

    pub fn add_pre_notified_listener(&mut self, listener: &Handle<dyn DocumentListener>) {
        self.pre_notified_listeners
            .push(ascension_primitives::downgrade(listener));
    }

    pub fn remove_pre_notified_listener(&mut self, listener: &Handle<dyn DocumentListener>) {
        let target = Rc::as_ptr(listener);
        self.pre_notified_listeners
            .retain(|w| !std::ptr::eq(w.as_ptr(), target));
    }

    // ---- points ---------------------------------------------------------

    pub fn create_point(&mut self, position: Position) -> Point {
        let point = Point::new(position);
        self.points.push(point.weak());
        point
    }

    // ---- bookmarks ------------------------------------------------------

    pub fn mark_bookmark(&mut self, line: u32) {
        self.bookmarks.mark(line);
    }

    pub fn unmark_bookmark(&mut self, line: u32) {
        self.bookmarks.unmark(line);
    }

    pub fn toggle_bookmark(&mut self, line: u32) -> bool {
        self.bookmarks.toggle(line)
    }

    pub fn is_bookmarked(&self, line: u32) -> bool {
        self.bookmarks.is_marked(line)
    }

    pub fn bookmarked_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.bookmarks.iter()
    }

    pub fn next_bookmark_from(&self, line: u32) -> Option<u32> {
        self.bookmarks.next_from(line)
    }

    // ---- undo/redo --------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn clear_undo_buffer(&mut self) {
        self.undo.clear();
    }

    pub fn begin_compound_change(&mut self) {
        self.undo.begin_compound_change();
    }

    pub fn end_compound_change(&mut self) -> Result<()> {
        self.undo
            .end_compound_change()
            .map_err(AscensionError::IllegalState)
    }

    /// Reverts the most recent (possibly compound) edit. Every primitive
    /// edit the compound change grouped is individually replayed in
    /// reverse, so revision number decreases by 1 per grouped edit, the
    /// same way it increased by 1 per edit when the group was first
    /// applied.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(group) = self.undo.pop_undo_group() else {
            return Ok(false);
        };
        if self.read_only {
            self.undo.push_undo_group(group);
            return Err(AscensionError::ReadOnlyDocument);
        }
        self.recording_suppressed = true;
        for record in group.iter().rev() {
            let target_revision = self.revision_number - 1;
            let _ = self.perform_edit(record.inserted_region, &record.erased_text, target_revision);
            self.revision_number = target_revision;
        }
        self.recording_suppressed = false;
        self.undo.push_redo_group(group);
        tracing::debug!(target: "text.document", revision = self.revision_number, "undo applied");
        Ok(true)
    }

    /// Re-applies the most recently undone (possibly compound) edit.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(group) = self.undo.pop_redo_group() else {
            return Ok(false);
        };
        if self.read_only {
            self.undo.push_redo_group(group);
            return Err(AscensionError::ReadOnlyDocument);
        }
        self.recording_suppressed = true;
        for record in group.iter() {
            let target_revision = self.revision_number + 1;
            let _ = self.perform_edit(record.erased_region, &record.inserted_text, target_revision);
            self.revision_number = target_revision;
        }
        self.recording_suppressed = false;
        self.undo.push_undo_group(group);
        tracing::debug!(target: "text.document", revision = self.revision_number, "redo applied");
        Ok(true)
    }

    // ---- the single mutation primitive -----------------------------------

    pub fn insert(&mut self, at: Position, text: &str) -> Result<Position> {
        self.replace(Region::empty_at(at), text)
    }

    pub fn erase(&mut self, region: Region) -> Result<Position> {
        self.replace(region, "")
    }

    /// Replaces the content of `region` with `text` (spec §4.4). This is
    /// the only primitive that mutates document content; every other
    /// editing operation is sugar over it.
    pub fn replace(&mut self, region: Region, text: &str) -> Result<Position> {
        let region = region.normalized();
        self.check_region_in_accessible(&region)?;
        if self.read_only {
            return Err(AscensionError::ReadOnlyDocument);
        }
        if !self.is_modified()
            && let Some(input) = self.input.as_ref().and_then(|w| w.upgrade())
            && !input.borrow().is_changeable(self)
        {
            return Err(AscensionError::ChangeRejected);
        }
        let target_revision = self.revision_number + 1;
        let (end, change, erased_text) = self.perform_edit(region, text, target_revision);
        self.revision_number = target_revision;
        if !self.recording_suppressed {
            self.undo.push_edit(EditRecord {
                erased_region: change.erased,
                erased_text,
                inserted_region: change.inserted,
                inserted_text: text.to_string(),
            });
        }
        tracing::debug!(target: "text.document", revision = self.revision_number, "replace applied");
        Ok(end)
    }

    fn check_region_in_whole(&self, region: &Region) -> Result<()> {
        let whole = self.region();
        if region.beginning() < whole.beginning() || region.end() > whole.end() {
            return Err(AscensionError::BadRegion(*region));
        }
        Ok(())
    }

    fn check_region_in_accessible(&self, region: &Region) -> Result<()> {
        self.check_region_in_whole(region)?;
        let accessible = self.accessible_region();
        if region.beginning() < accessible.beginning() || region.end() > accessible.end() {
            return Err(AscensionError::DocumentAccessViolation);
        }
        Ok(())
    }

    /// Runs one content change through the full notification sequence
    /// from spec §5: partitioner aboutToChange, pre-notified listeners,
    /// public listeners, the buffer mutation itself, partitioner changed,
    /// point adjustment, pre-notified listeners changed, public listeners
    /// changed. Shared by `replace`, `undo` and `redo` so all three keep
    /// the same ordering guarantee.
    fn perform_edit(
        &mut self,
        erased_region: Region,
        text: &str,
        new_revision: u64,
    ) -> (Position, DocumentChange, String) {
        let segments = split_text_into_segments(text);
        let insertion_point = erased_region.beginning();
        let inserted_end = compute_inserted_end(insertion_point, &segments);
        let inserted_region = Region::new(insertion_point, inserted_end);
        let change = DocumentChange::new(erased_region, inserted_region);
        let erased_text = self.extract_text_raw(erased_region);

        let pre_notified = self.pre_notified_listeners.clone();
        let public = self.listeners.clone();

        let mut partitioner = self.partitioner.take().expect("partitioner always present");
        partitioner.about_to_change(self);
        self.notify_about_to_change(&pre_notified, &change);
        self.notify_about_to_change(&public, &change);

        self.apply_splice(erased_region, &segments);
        self.stamp_touched_lines(inserted_region, new_revision);
        self.bookmarks
            .shift(insertion_point, change.erased.lines(), change.inserted.lines());

        partitioner.changed(self, &change);
        self.partitioner = Some(partitioner);

        self.update_points(&change);

        self.notify_changed(&pre_notified, &change);
        self.notify_changed(&public, &change);

        (inserted_end, change, erased_text)
    }

    fn notify_about_to_change(&mut self, targets: &[WeakHandle<dyn DocumentListener>], change: &DocumentChange) {
        for handle in live_handles(targets) {
            handle.borrow_mut().about_to_change(self, change);
        }
    }

    fn notify_changed(&mut self, targets: &[WeakHandle<dyn DocumentListener>], change: &DocumentChange) {
        for handle in live_handles(targets) {
            handle.borrow_mut().changed(self, change);
        }
    }

    fn update_points(&mut self, change: &DocumentChange) {
        self.points.retain(|w| w.strong_count() > 0);
        for weak in &self.points {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().adjust(change);
            }
        }
    }

    fn apply_splice(&mut self, erased_region: Region, segments: &[(String, Option<Newline>)]) {
        let start = erased_region.beginning();
        let end = erased_region.end();
        let head: Vec<Char> = self.lines[start.line as usize].text()[..start.offset_in_line as usize].to_vec();
        let tail: Vec<Char> = self.lines[end.line as usize].text()[end.offset_in_line as usize..].to_vec();
        let tail_newline = self.lines[end.line as usize].newline;

        self.lines.remove_range(start.line as usize, end.line as usize + 1);

        let mut new_lines = Vec::with_capacity(segments.len());
        if segments.len() == 1 {
            let mut combined = head;
            combined.extend(segments[0].0.encode_utf16());
            combined.extend(tail);
            new_lines.push(Line::new(combined, tail_newline, 0));
        } else {
            let mut first = head;
            first.extend(segments[0].0.encode_utf16());
            new_lines.push(Line::new(
                first,
                segments[0].1.expect("non-final segment carries a terminator"),
                0,
            ));
            for seg in &segments[1..segments.len() - 1] {
                new_lines.push(Line::new(
                    seg.0.encode_utf16().collect(),
                    seg.1.expect("non-final segment carries a terminator"),
                    0,
                ));
            }
            let mut last: Vec<Char> = segments.last().unwrap().0.encode_utf16().collect();
            last.extend(tail);
            new_lines.push(Line::new(last, tail_newline, 0));
        }
        for (i, line) in new_lines.into_iter().enumerate() {
            self.lines.insert(start.line as usize + i, line);
        }
    }

    fn stamp_touched_lines(&mut self, inserted: Region, revision: u64) {
        for line_no in inserted.beginning().line..=inserted.end().line {
            if let Some(line) = self.lines.get_mut(line_no as usize) {
                line.revision = revision;
            }
        }
    }
}

fn live_handles<T: ?Sized>(weak: &[WeakHandle<T>]) -> Vec<Handle<T>> {
    weak.iter().filter_map(|w| w.upgrade()).collect()
}

/// Splits inserted text on every literal line terminator the engine
/// recognizes (LF, CR, CRLF, NEL, LS, PS). The final segment never carries
/// a terminator: it merges with whatever followed the erased region.
fn split_text_into_segments(text: &str) -> Vec<(String, Option<Newline>)> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    segments.push((std::mem::take(&mut current), Some(Newline::CrLf)));
                } else {
                    segments.push((std::mem::take(&mut current), Some(Newline::Cr)));
                }
            }
            '\n' => segments.push((std::mem::take(&mut current), Some(Newline::Lf))),
            '\u{0085}' => segments.push((std::mem::take(&mut current), Some(Newline::Nel))),
            '\u{2028}' => segments.push((std::mem::take(&mut current), Some(Newline::Ls))),
            '\u{2029}' => segments.push((std::mem::take(&mut current), Some(Newline::Ps))),
            _ => current.push(c),
        }
    }
    segments.push((current, None));
    segments
}

fn compute_inserted_end(start: Position, segments: &[(String, Option<Newline>)]) -> Position {
    if segments.len() == 1 {
        let width = segments[0].0.encode_utf16().count() as u32;
        Position::new(start.line, start.offset_in_line + width)
    } else {
        let last_width = segments.last().unwrap().0.encode_utf16().count() as u32;
        Position::new(start.line + (segments.len() - 1) as u32, last_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_two_lines_matches_scenario() {
        let mut doc = Document::new();
        let end = doc.insert(Position::origin(), "hi\nbye").unwrap();
        assert_eq!(end, Position::new(1, 3));
        assert_eq!(doc.number_of_lines(), 2);
        assert_eq!(doc.line(0).unwrap().to_string_lossy(), "hi");
        assert_eq!(doc.line(1).unwrap().to_string_lossy(), "bye");
        assert_eq!(doc.revision_number(), 1);
    }

    #[test]
    fn undo_restores_single_line_and_decrements_revision() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "hi\nbye").unwrap();
        assert!(doc.undo().unwrap());
        assert_eq!(doc.revision_number(), 0);
        assert_eq!(doc.number_of_lines(), 1);
        assert_eq!(doc.line(0).unwrap().to_string_lossy(), "");
    }

    #[test]
    fn redo_reapplies_undone_edit() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "hi\nbye").unwrap();
        doc.undo().unwrap();
        assert!(doc.redo().unwrap());
        assert_eq!(doc.revision_number(), 1);
        assert_eq!(doc.number_of_lines(), 2);
        assert_eq!(doc.line(1).unwrap().to_string_lossy(), "bye");
    }

    #[test]
    fn compound_change_undoes_as_one_step() {
        let mut doc = Document::new();
        doc.begin_compound_change();
        doc.insert(Position::origin(), "a").unwrap();
        doc.insert(Position::new(0, 1), "b").unwrap();
        doc.end_compound_change().unwrap();
        assert_eq!(doc.revision_number(), 2);
        assert!(doc.undo().unwrap());
        assert_eq!(doc.revision_number(), 0);
        assert_eq!(doc.line(0).unwrap().to_string_lossy(), "");
    }

    #[test]
    fn narrowing_rejects_edits_outside_accessible_region() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "abcdef").unwrap();
        doc.narrow_to_region(Region::new(Position::new(0, 1), Position::new(0, 4)))
            .unwrap();
        let err = doc.insert(Position::new(0, 0), "x").unwrap_err();
        assert!(matches!(err, AscensionError::DocumentAccessViolation));
        doc.widen();
        assert!(doc.insert(Position::new(0, 0), "x").is_ok());
    }

    #[test]
    fn read_only_document_rejects_edits() {
        let mut doc = Document::new();
        doc.set_read_only(true);
        let err = doc.insert(Position::origin(), "x").unwrap_err();
        assert!(matches!(err, AscensionError::ReadOnlyDocument));
    }

    #[test]
    fn bookmarks_shift_when_lines_are_inserted_above() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "a\nb\nc").unwrap();
        doc.mark_bookmark(2);
        doc.insert(Position::origin(), "x\n").unwrap();
        assert!(doc.is_bookmarked(3));
        assert!(!doc.is_bookmarked(2));
    }

    #[test]
    fn points_track_edits_before_and_after() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "hello world").unwrap();
        let point = doc.create_point(Position::new(0, 6));
        doc.replace(Region::new(Position::new(0, 0), Position::new(0, 5)), "hi").unwrap();
        assert_eq!(point.position(), Position::new(0, 3));
    }

    #[test]
    fn reset_content_clears_read_only_and_relocates_points() {
        let mut doc = Document::new();
        doc.insert(Position::origin(), "hello\nworld").unwrap();
        let point = doc.create_point(Position::new(1, 2));
        doc.mark_bookmark(1);
        doc.set_read_only(true);

        doc.reset_content();

        assert!(!doc.is_read_only());
        assert_eq!(doc.number_of_lines(), 1);
        assert_eq!(doc.text(doc.region()).unwrap(), "");
        assert_eq!(doc.revision_number(), 0);
        assert!(!doc.is_modified());
        assert!(!doc.is_bookmarked(1));
        assert_eq!(point.position(), Position::origin());
    }

    #[test]
    fn reset_content_notifies_listeners_with_old_region() {
        use std::cell::RefCell;

        #[derive(Default)]
        struct Recording {
            changed_erased: RefCell<Option<Region>>,
        }
        impl DocumentListener for Recording {
            fn about_to_change(&mut self, _doc: &Document, _change: &DocumentChange) {}
            fn changed(&mut self, _doc: &Document, change: &DocumentChange) {
                *self.changed_erased.borrow_mut() = Some(change.erased);
            }
        }

        let mut doc = Document::new();
        doc.insert(Position::origin(), "abc").unwrap();
        let old_region = doc.region();
        let recording = ascension_primitives::new_handle(Recording::default());
        let listener: Handle<dyn DocumentListener> = recording.clone();
        doc.add_listener(&listener);

        doc.reset_content();

        assert_eq!(*recording.borrow().changed_erased.borrow(), Some(old_region));
    }
}
