//! Generation-tagged one-shot timers.
//!
//! The host owns the real clock. Scheduling a timer emits
//! [`Effect::ScheduleTimer`] carrying a fresh generation; when the host's
//! timeout fires it sends back `(kind, generation)`. Only the latest
//! generation of a kind is accepted, so rescheduling (debounce) and
//! cancelling are correct even if the host fails to clear its old timeout.
//!
//! # Invariants
//!
//! - Latest-wins: at most one generation per kind is live.
//! - A fired timer is accepted at most once.
//! - Generations are strictly increasing per kind.

use core::time::Duration;

use crate::effect::Effect;

/// Every timer the page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Rain re-layout after the window stops resizing.
    ResizeSettle,
    /// Rain resumes after scrolling goes quiet.
    ScrollSettle,
    /// Adds the overlay's visible class after the display change applied.
    OverlayReveal,
    /// Finishes an overlay close if the transition end never arrives.
    OverlayHideFallback,
    /// Clears the fonts-loading flag when no readiness signal exists.
    FontFallback,
}

impl TimerKind {
    pub const ALL: [Self; 5] = [
        Self::ResizeSettle,
        Self::ScrollSettle,
        Self::OverlayReveal,
        Self::OverlayHideFallback,
        Self::FontFallback,
    ];

    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::ResizeSettle => 0,
            Self::ScrollSettle => 1,
            Self::OverlayReveal => 2,
            Self::OverlayHideFallback => 3,
            Self::FontFallback => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResizeSettle => "resize_settle",
            Self::ScrollSettle => "scroll_settle",
            Self::OverlayReveal => "overlay_reveal",
            Self::OverlayHideFallback => "overlay_hide_fallback",
            Self::FontFallback => "font_fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    generation: u64,
    armed: bool,
}

/// Per-kind generation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerBank {
    slots: [Slot; TimerKind::ALL.len()],
}

impl TimerBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind`, superseding any pending generation.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration, effects: &mut Vec<Effect>) {
        let slot = &mut self.slots[kind.slot()];
        slot.generation += 1;
        slot.armed = true;
        effects.push(Effect::ScheduleTimer {
            timer: kind,
            generation: slot.generation,
            delay,
        });
    }

    /// Disarm `kind`. Emits a cancel only if something was pending.
    pub fn cancel(&mut self, kind: TimerKind, effects: &mut Vec<Effect>) {
        let slot = &mut self.slots[kind.slot()];
        if slot.armed {
            slot.generation += 1;
            slot.armed = false;
            effects.push(Effect::CancelTimer(kind));
        }
    }

    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].armed
    }

    #[must_use]
    pub fn generation(&self, kind: TimerKind) -> u64 {
        self.slots[kind.slot()].generation
    }

    /// Accept a fired timer if it is the live generation, disarming it.
    pub fn accept(&mut self, kind: TimerKind, generation: u64) -> bool {
        let slot = &mut self.slots[kind.slot()];
        if slot.armed && slot.generation == generation {
            slot.armed = false;
            true
        } else {
            false
        }
    }
}
