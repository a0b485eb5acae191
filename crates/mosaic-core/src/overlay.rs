//! Fullscreen overlay controller.
//!
//! # Phases
//!
//! ```text
//!            open                reveal timer
//!  Hidden ─────────▶ Revealing ───────────────▶ Visible
//!    ▲                  │ close                    │ close
//!    │  (finish now)    ▼                          ▼
//!    └────────────── Hidden ◀──transition end── Closing
//!                              or hide fallback
//! ```
//!
//! `Revealing` exists because the display change must apply before the
//! visible class is added, otherwise the CSS transition does not run.
//! The source is cleared only when the overlay is finally hidden, so the
//! closing transition never shows a blank frame.
//!
//! A close while still `Revealing` never started a transition, so there is no
//! transition end to wait for: it finishes immediately.

use crate::config::GalleryConfig;
use crate::effect::Effect;
use crate::timer::{TimerBank, TimerKind};

/// Class that triggers the overlay's CSS transition.
pub const OVERLAY_VISIBLE_CLASS: &str = "visible";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayPhase {
    #[default]
    Hidden,
    Revealing,
    Visible,
    Closing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayController {
    phase: OverlayPhase,
    source: Option<String>,
}

impl OverlayController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether the visible class is currently applied.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self.phase, OverlayPhase::Visible)
    }

    /// Content currently loaded into the overlay.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Show `path` fullscreen. Replaces whatever the overlay was showing.
    pub fn open(
        &mut self,
        path: &str,
        config: &GalleryConfig,
        timers: &mut TimerBank,
        effects: &mut Vec<Effect>,
    ) {
        timers.cancel(TimerKind::OverlayHideFallback, effects);
        self.source = Some(path.to_string());
        effects.push(Effect::SetOverlaySource(Some(path.to_string())));
        effects.push(Effect::SetOverlayDisplayed(true));
        if self.phase == OverlayPhase::Visible {
            return;
        }
        // Closing → reopening: the class was removed, reveal again.
        self.phase = OverlayPhase::Revealing;
        timers.schedule(
            TimerKind::OverlayReveal,
            config.overlay_reveal_delay(),
            effects,
        );
    }

    /// Reveal timer fired.
    pub fn reveal(&mut self, effects: &mut Vec<Effect>) {
        if self.phase != OverlayPhase::Revealing {
            return;
        }
        self.phase = OverlayPhase::Visible;
        effects.push(Effect::SetOverlayVisible(true));
        effects.push(Effect::SetScrollLocked(true));
    }

    /// Start closing. No-op when hidden or already closing.
    pub fn close(
        &mut self,
        config: &GalleryConfig,
        timers: &mut TimerBank,
        effects: &mut Vec<Effect>,
    ) {
        match self.phase {
            OverlayPhase::Hidden | OverlayPhase::Closing => {}
            OverlayPhase::Revealing => {
                timers.cancel(TimerKind::OverlayReveal, effects);
                self.finish(effects);
            }
            OverlayPhase::Visible => {
                self.phase = OverlayPhase::Closing;
                effects.push(Effect::SetOverlayVisible(false));
                effects.push(Effect::SetScrollLocked(false));
                timers.schedule(
                    TimerKind::OverlayHideFallback,
                    config.overlay_hide_fallback(),
                    effects,
                );
            }
        }
    }

    /// Escape key: closes only a visible overlay.
    pub fn escape(
        &mut self,
        config: &GalleryConfig,
        timers: &mut TimerBank,
        effects: &mut Vec<Effect>,
    ) {
        if self.is_visible() {
            self.close(config, timers, effects);
        }
    }

    /// The close transition ended (or its fallback fired).
    pub fn transition_end(&mut self, timers: &mut TimerBank, effects: &mut Vec<Effect>) {
        if self.phase != OverlayPhase::Closing {
            return;
        }
        timers.cancel(TimerKind::OverlayHideFallback, effects);
        self.finish(effects);
    }

    fn finish(&mut self, effects: &mut Vec<Effect>) {
        self.phase = OverlayPhase::Hidden;
        self.source = None;
        effects.push(Effect::SetOverlayDisplayed(false));
        effects.push(Effect::SetOverlaySource(None));
    }
}
