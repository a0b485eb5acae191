//! Scroll-sweep coalescing.
//!
//! Scroll events can arrive many times per frame. Reading tile geometry
//! forces layout, so the host samples it at most once per animation frame:
//!
//! ```text
//!            request()            frame
//!   Idle ───────────────▶ Scheduled ─────▶ Idle (sweep)
//!                           │  ▲
//!                           └──┘ request() (absorbed)
//! ```

use std::cell::Cell;

#[derive(Debug, Default)]
pub struct SweepGate {
    scheduled: Cell<bool>,
}

impl SweepGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that geometry is stale. Returns `true` when the caller must
    /// request a frame; later calls before that frame are absorbed.
    #[must_use]
    pub fn request(&self) -> bool {
        !self.scheduled.replace(true)
    }

    /// The frame arrived (or could not be requested). Returns whether a
    /// sweep was pending.
    pub fn take(&self) -> bool {
        self.scheduled.replace(false)
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.get()
    }
}
