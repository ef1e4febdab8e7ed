use ascension_primitives::Position;

use crate::gap_vector::GapVector;

/// A sorted set of bookmarked line numbers that tracks edits (spec §4.3:
/// "Bookmarker uses the same structure for its sorted integer set").
///
/// Lines are kept in ascending order inside a [`GapVector`] so that
/// bookmarking near the last-touched line — the common case while a user
/// edits sequentially — stays cheap, the same locality argument that
/// motivates using it for the document's line store.
#[derive(Debug, Default)]
pub struct Bookmarker {
    lines: GapVector<u32>,
}

impl Bookmarker {
    pub fn new() -> Self {
        Self {
            lines: GapVector::new(),
        }
    }

    fn find(&self, line: u32) -> Result<usize, usize> {
        let mut lo = 0usize;
        let mut hi = self.lines.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match (*self.lines.get(mid).unwrap()).cmp(&line) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Equal => return Ok(mid),
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Err(lo)
    }

    pub fn is_marked(&self, line: u32) -> bool {
        self.find(line).is_ok()
    }

    pub fn mark(&mut self, line: u32) {
        if let Err(index) = self.find(line) {
            self.lines.insert(index, line);
        }
    }

    pub fn unmark(&mut self, line: u32) {
        if let Ok(index) = self.find(line) {
            self.lines.remove(index);
        }
    }

    pub fn toggle(&mut self, line: u32) -> bool {
        match self.find(line) {
            Ok(index) => {
                self.lines.remove(index);
                false
            }
            Err(index) => {
                self.lines.insert(index, line);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.iter().copied()
    }

    /// The nearest bookmarked line at or after `from`, wrapping around to
    /// the first bookmark if none qualifies (spec: cyclic "next bookmark"
    /// navigation).
    pub fn next_from(&self, from: u32) -> Option<u32> {
        if self.lines.is_empty() {
            return None;
        }
        let index = match self.find(from) {
            Ok(i) => i,
            Err(i) => i,
        };
        if index < self.lines.len() {
            self.lines.get(index).copied()
        } else {
            self.lines.get(0).copied()
        }
    }

    /// Renumber bookmarks after `erased_lines` lines starting at `at` were
    /// removed and `inserted_lines` were put in their place. Bookmarks
    /// inside the erased span collapse onto `at.line`; ones strictly after
    /// it shift by the net change in line count.
    ///
    /// A mark sitting exactly on `at.line` is column-sensitive only when
    /// nothing was erased there: a mid-line insert (`at.offset_in_line !=
    /// 0`) splits the line without moving a mark that was already on it,
    /// while a column-0 insert pushes the line — and the mark on it — down
    /// (spec §3.5, matching `kernel::Bookmarker::documentChanged`'s
    /// `offsetInLine != 0` check on the insert side).
    pub(crate) fn shift(&mut self, at: Position, erased_lines: u32, inserted_lines: u32) {
        if erased_lines == 0 && inserted_lines == 0 {
            return;
        }
        let first_line = at.line;
        let erased_end = first_line + erased_lines;
        let mut shifted: Vec<u32> = Vec::with_capacity(self.lines.len());
        for &line in self.lines.iter() {
            let new_line = if line < first_line {
                line
            } else if line < erased_end {
                first_line
            } else if line == first_line && at.offset_in_line != 0 {
                line
            } else {
                (line as i64 - erased_lines as i64 + inserted_lines as i64) as u32
            };
            shifted.push(new_line);
        }
        shifted.dedup();
        self.lines.clear();
        for (i, line) in shifted.into_iter().enumerate() {
            self.lines.insert(i, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_unmark_round_trip() {
        let mut b = Bookmarker::new();
        b.mark(5);
        b.mark(1);
        b.mark(3);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
        b.unmark(3);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn shift_collapses_bookmarks_inside_erased_span() {
        let mut b = Bookmarker::new();
        b.mark(2);
        b.mark(3);
        b.mark(10);
        b.shift(Position::new(2, 0), 2, 1);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![2, 9]);
    }

    #[test]
    fn mid_line_multi_line_insert_leaves_a_mark_on_the_split_line_in_place() {
        let mut b = Bookmarker::new();
        b.mark(5);
        b.mark(9);
        // inserting two extra lines' worth of text in the middle of line 5
        b.shift(Position::new(5, 3), 0, 2);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![5, 11]);
    }

    #[test]
    fn column_zero_multi_line_insert_pushes_a_mark_on_that_line_down() {
        let mut b = Bookmarker::new();
        b.mark(5);
        b.mark(9);
        b.shift(Position::new(5, 0), 0, 2);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![7, 11]);
    }

    #[test]
    fn next_from_wraps_around() {
        let mut b = Bookmarker::new();
        b.mark(2);
        b.mark(8);
        assert_eq!(b.next_from(3), Some(8));
        assert_eq!(b.next_from(9), Some(2));
    }
}
