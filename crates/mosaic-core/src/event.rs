//! Host-to-core events.

use crate::theme::Theme;
use crate::timer::TimerKind;

/// Bounding box of one tile relative to the viewport top, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub index: u32,
    pub top: f64,
    pub bottom: f64,
}

impl TileRect {
    #[must_use]
    pub const fn new(index: u32, top: f64, bottom: f64) -> Self {
        Self { index, top, bottom }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The document is ready and every required element exists.
    Boot {
        /// Theme restored from the preference store.
        theme: Theme,
        viewport_width: u32,
        viewport_height: u32,
        /// Whether a drawing surface for the rain exists.
        animation_surface: bool,
        /// Whether the host can report font readiness.
        font_signal: bool,
    },
    /// The end-of-content sentinel came near the viewport.
    SentinelNear,
    /// A placeholder tile came near the viewport.
    TileNear { index: u32 },
    /// Direct geometry for pending tiles, sampled while scrolling.
    ScrollGeometry {
        viewport_height: f64,
        tiles: Vec<TileRect>,
    },
    ContentLoaded { index: u32 },
    ContentFailed { index: u32 },
    ThemeToggled { checked: bool },
    TileClicked { index: u32 },
    CloseRequested,
    KeyDown { key: String },
    OverlayTransitionEnd,
    Scroll,
    VisibilityChanged { hidden: bool },
    Resize { width: u32, height: u32 },
    AnimationFrame,
    TimerFired { timer: TimerKind, generation: u64 },
    FontsReady,
    FontsFailed { reason: String },
}
