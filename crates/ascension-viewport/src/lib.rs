//! Read-only scroll/geometry contract between the core and an external
//! viewer/line-layout engine (spec §4.9). Out of core logic — specified
//! only to pin the boundary.

mod geometry;
mod viewport;

pub use geometry::{BoundsInView, ScrollPosition};
pub use viewport::{LineLayoutListener, ScrollListener, TextViewport};
