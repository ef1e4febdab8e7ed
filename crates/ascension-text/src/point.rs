use ascension_primitives::{Handle, Position, WeakHandle, new_handle};

use crate::change::DocumentChange;

/// Which side of an insertion a point sitting exactly at the insertion
/// offset sticks to (spec §3.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    /// Stays before inserted text.
    Backward,
    /// Moves past inserted text, ending up after it.
    Forward,
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Backward
    }
}

/// The shared, document-adjustable state behind a [`Point`].
#[derive(Debug)]
pub struct PointState {
    position: Position,
    gravity: Gravity,
    adapts_to_document: bool,
}

impl PointState {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }

    pub fn adapts_to_document(&self) -> bool {
        self.adapts_to_document
    }

    pub fn set_adapts_to_document(&mut self, adapts: bool) {
        self.adapts_to_document = adapts;
    }

    /// Relocates this point to the document origin without going through
    /// `adjust`'s edit-relative math, for a full-content reset (spec §4.4).
    pub(crate) fn move_to_origin(&mut self) {
        self.position = Position::origin();
    }

    /// Shift this point's position to reflect a completed edit, following
    /// the same rule the source applies to `VisualPoint`/`DisjointPoint`:
    /// a point strictly inside the erased span collapses to the
    /// insertion point; one past it is carried forward by the net change
    /// in length; one before it is untouched. A point sitting exactly at
    /// the boundary between erased and inserted text follows `gravity`.
    pub(crate) fn adjust(&mut self, change: &DocumentChange) {
        if !self.adapts_to_document {
            return;
        }
        let erased = change.erased;
        let inserted = change.inserted;
        if self.position < erased.beginning() {
            return;
        }
        if self.position == erased.beginning() {
            self.position = match self.gravity {
                Gravity::Backward => inserted.beginning(),
                Gravity::Forward => inserted.end(),
            };
            return;
        }
        if self.position < erased.end() {
            self.position = inserted.end();
            return;
        }
        if self.position.line == erased.end().line {
            let delta = inserted.end().offset_in_line as i64 - erased.end().offset_in_line as i64;
            let new_offset = (self.position.offset_in_line as i64 + delta).max(0) as u32;
            self.position = Position::new(inserted.end().line, new_offset);
        } else {
            let line_delta = inserted.end().line as i64 - erased.end().line as i64;
            self.position = Position::new((self.position.line as i64 + line_delta) as u32, self.position.offset_in_line);
        }
    }
}

/// A position inside a document that tracks edits around it (spec §3.7).
///
/// `Point` holds the shared state directly; `Document` keeps only a weak
/// reference ([`downgrade`]) so a dropped point simply stops receiving
/// updates instead of requiring an explicit deregistration call.
#[derive(Debug, Clone)]
pub struct Point {
    state: Handle<PointState>,
}

impl Point {
    pub fn new(position: Position) -> Self {
        Self {
            state: new_handle(PointState {
                position,
                gravity: Gravity::default(),
                adapts_to_document: true,
            }),
        }
    }

    pub fn position(&self) -> Position {
        self.state.borrow().position()
    }

    pub fn gravity(&self) -> Gravity {
        self.state.borrow().gravity()
    }

    pub fn set_gravity(&self, gravity: Gravity) {
        self.state.borrow_mut().set_gravity(gravity);
    }

    pub fn adapts_to_document(&self) -> bool {
        self.state.borrow().adapts_to_document()
    }

    pub fn set_adapts_to_document(&self, adapts: bool) {
        self.state.borrow_mut().set_adapts_to_document(adapts);
    }

    pub fn set_position(&self, position: Position) {
        self.state.borrow_mut().position = position;
    }

    pub(crate) fn weak(&self) -> WeakHandle<PointState> {
        ascension_primitives::downgrade(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascension_primitives::Region;

    fn change(el: u32, eo: u32, ee: u32, eeo: u32, il: u32, io: u32, ie: u32, ieo: u32) -> DocumentChange {
        DocumentChange::new(
            Region::new(Position::new(el, eo), Position::new(ee, eeo)),
            Region::new(Position::new(il, io), Position::new(ie, ieo)),
        )
    }

    #[test]
    fn point_before_edit_is_unaffected() {
        let state = PointState {
            position: Position::new(0, 0),
            gravity: Gravity::Backward,
            adapts_to_document: true,
        };
        let mut s = state;
        s.adjust(&change(1, 0, 1, 0, 1, 0, 1, 3));
        assert_eq!(s.position, Position::new(0, 0));
    }

    #[test]
    fn point_inside_erased_span_collapses_to_insertion_point() {
        let mut s = PointState {
            position: Position::new(0, 3),
            gravity: Gravity::Backward,
            adapts_to_document: true,
        };
        s.adjust(&change(0, 0, 0, 5, 0, 0, 0, 2));
        assert_eq!(s.position, Position::new(0, 2));
    }

    #[test]
    fn point_after_edit_on_same_line_shifts_by_delta() {
        let mut s = PointState {
            position: Position::new(0, 10),
            gravity: Gravity::Backward,
            adapts_to_document: true,
        };
        s.adjust(&change(0, 0, 0, 5, 0, 0, 0, 2));
        assert_eq!(s.position, Position::new(0, 7));
    }

    #[test]
    fn forward_gravity_moves_past_insertion_at_boundary() {
        let mut s = PointState {
            position: Position::new(0, 0),
            gravity: Gravity::Forward,
            adapts_to_document: true,
        };
        s.adjust(&change(0, 0, 0, 0, 0, 0, 0, 4));
        assert_eq!(s.position, Position::new(0, 4));
    }
}
