//! `TextViewport`: the read-only query surface the viewer scrolls
//! (spec §4.9). Out of core logic — no rendering or layout happens
//! here — but specified to pin the boundary between the engine and an
//! external line-layout component.

use std::rc::Rc;

use ascension_primitives::{Handle, WeakHandle, downgrade};

use crate::geometry::{BoundsInView, ScrollPosition};

/// Notified exactly once per `scroll_to`/`scroll` call, with the scroll
/// position *before* the call.
pub trait ScrollListener {
    fn scrolled(&mut self, old_position: ScrollPosition);
}

/// The external line-layout engine's hook: forwarded whenever lines are
/// inserted, deleted, or change height so it can recompute BPD scroll
/// bounds. The core only forwards; it never computes layout itself.
pub trait LineLayoutListener {
    fn lines_changed(&mut self, first_line: u32, line_count_delta: i32);
}

pub struct TextViewport {
    position: ScrollPosition,
    bounds_in_view: BoundsInView,
    first_visible_line: u32,
    first_visible_subline: u32,
    number_of_visible_lines: u32,
    scroll_listeners: Vec<WeakHandle<dyn ScrollListener>>,
    layout_listeners: Vec<WeakHandle<dyn LineLayoutListener>>,
}

impl TextViewport {
    pub fn new(bounds_in_view: BoundsInView) -> Self {
        Self {
            position: ScrollPosition::default(),
            bounds_in_view,
            first_visible_line: 0,
            first_visible_subline: 0,
            number_of_visible_lines: 0,
            scroll_listeners: Vec::new(),
            layout_listeners: Vec::new(),
        }
    }

    pub fn position(&self) -> ScrollPosition {
        self.position
    }

    pub fn bounds_in_view(&self) -> BoundsInView {
        self.bounds_in_view
    }

    pub fn set_bounds_in_view(&mut self, bounds: BoundsInView) {
        self.bounds_in_view = bounds;
    }

    pub fn first_visible_line_in_logical_number(&self) -> u32 {
        self.first_visible_line
    }

    pub fn first_visible_subline_in_logical_line(&self) -> u32 {
        self.first_visible_subline
    }

    pub fn number_of_visible_lines(&self) -> u32 {
        self.number_of_visible_lines
    }

    /// Set by the external layout engine once it lays out the visible
    /// region; the core never computes this itself.
    pub fn set_visible_lines(&mut self, first_line: u32, first_subline: u32, count: u32) {
        self.first_visible_line = first_line;
        self.first_visible_subline = first_subline;
        self.number_of_visible_lines = count;
    }

    pub fn add_scroll_listener(&mut self, listener: &Handle<dyn ScrollListener>) {
        self.scroll_listeners.push(downgrade(listener));
    }

    pub fn remove_scroll_listener(&mut self, listener: &Handle<dyn ScrollListener>) {
        let target = Rc::as_ptr(listener);
        self.scroll_listeners.retain(|w| !std::ptr::eq(w.as_ptr(), target));
    }

    pub fn add_line_layout_listener(&mut self, listener: &Handle<dyn LineLayoutListener>) {
        self.layout_listeners.push(downgrade(listener));
    }

    pub fn remove_line_layout_listener(&mut self, listener: &Handle<dyn LineLayoutListener>) {
        let target = Rc::as_ptr(listener);
        self.layout_listeners.retain(|w| !std::ptr::eq(w.as_ptr(), target));
    }

    /// Moves the scroll position to `position`, clamped so neither axis
    /// goes negative, and emits `scrolled` on every live listener exactly
    /// once with the pre-scroll position — even when the clamped result
    /// equals the old position.
    pub fn scroll_to(&mut self, position: ScrollPosition) {
        let old = self.position;
        self.position = clamp_non_negative(position);
        self.notify_scrolled(old);
    }

    /// Scrolls by `delta`; the resulting position is clamped the same way
    /// as `scroll_to`. The step's *magnitude* is the caller's concern —
    /// this only enforces that the destination never goes negative.
    pub fn scroll(&mut self, delta: ScrollPosition) {
        let target = ScrollPosition::new(self.position.bpd + delta.bpd, self.position.ipd + delta.ipd);
        self.scroll_to(target);
    }

    fn notify_scrolled(&mut self, old: ScrollPosition) {
        for listener in live(&self.scroll_listeners) {
            listener.borrow_mut().scrolled(old);
        }
    }

    /// Called by the `Document` change stream; forwards to the
    /// line-layout engine so it can recompute scroll bounds (spec: "core
    /// just forwards change events to it").
    pub fn notify_line_layout_changed(&mut self, first_line: u32, line_count_delta: i32) {
        for listener in live(&self.layout_listeners) {
            listener.borrow_mut().lines_changed(first_line, line_count_delta);
        }
    }
}

fn clamp_non_negative(position: ScrollPosition) -> ScrollPosition {
    ScrollPosition::new(position.bpd.max(0), position.ipd.max(0))
}

fn live<T: ?Sized>(weak: &[WeakHandle<T>]) -> Vec<Handle<T>> {
    weak.iter().filter_map(|w| w.upgrade()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascension_primitives::new_handle;

    struct RecordingScrollListener {
        calls: Vec<ScrollPosition>,
    }

    impl ScrollListener for RecordingScrollListener {
        fn scrolled(&mut self, old_position: ScrollPosition) {
            self.calls.push(old_position);
        }
    }

    #[test]
    fn scroll_to_clamps_negative_axes_and_fires_once() {
        let mut viewport = TextViewport::new(BoundsInView::new(0, 0, 800, 600));
        let recording = new_handle(RecordingScrollListener { calls: Vec::new() });
        let listener: Handle<dyn ScrollListener> = recording.clone();
        viewport.add_scroll_listener(&listener);

        viewport.scroll_to(ScrollPosition::new(-5, 10));
        assert_eq!(viewport.position(), ScrollPosition::new(0, 10));
        assert_eq!(recording.borrow().calls.len(), 1);
        assert_eq!(recording.borrow().calls[0], ScrollPosition::new(0, 0));
    }

    #[test]
    fn scroll_accumulates_delta() {
        let mut viewport = TextViewport::new(BoundsInView::new(0, 0, 800, 600));
        viewport.scroll_to(ScrollPosition::new(10, 10));
        viewport.scroll(ScrollPosition::new(-3, 5));
        assert_eq!(viewport.position(), ScrollPosition::new(7, 15));
    }

    #[test]
    fn visible_line_tracking_is_set_by_the_layout_engine() {
        let mut viewport = TextViewport::new(BoundsInView::new(0, 0, 800, 600));
        viewport.set_visible_lines(12, 1, 40);
        assert_eq!(viewport.first_visible_line_in_logical_number(), 12);
        assert_eq!(viewport.first_visible_subline_in_logical_line(), 1);
        assert_eq!(viewport.number_of_visible_lines(), 40);
    }

    struct RecordingLayoutListener {
        events: Vec<(u32, i32)>,
    }

    impl LineLayoutListener for RecordingLayoutListener {
        fn lines_changed(&mut self, first_line: u32, line_count_delta: i32) {
            self.events.push((first_line, line_count_delta));
        }
    }

    #[test]
    fn forwards_line_layout_changes_to_registered_listeners() {
        let mut viewport = TextViewport::new(BoundsInView::new(0, 0, 800, 600));
        let recording = new_handle(RecordingLayoutListener { events: Vec::new() });
        let listener: Handle<dyn LineLayoutListener> = recording.clone();
        viewport.add_line_layout_listener(&listener);

        viewport.notify_line_layout_changed(3, 2);
        assert_eq!(recording.borrow().events, vec![(3, 2)]);
    }
}
