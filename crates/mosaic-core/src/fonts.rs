//! Font readiness gate.
//!
//! The body starts with a fonts-loading class that hides text until web
//! fonts are ready. The gate clears it exactly once: on the host's readiness
//! signal, on that signal's failure, or after a fallback delay when the host
//! has no signal at all.

use tracing::{debug, warn};

use crate::config::GalleryConfig;
use crate::effect::Effect;
use crate::timer::{TimerBank, TimerKind};

pub const FONTS_LOADING_CLASS: &str = "fonts-loading";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontGate {
    settled: bool,
}

impl FontGate {
    #[must_use]
    pub const fn new() -> Self {
        Self { settled: false }
    }

    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    /// Without a readiness signal, wait a bounded delay instead.
    pub fn arm(
        &mut self,
        has_signal: bool,
        config: &GalleryConfig,
        timers: &mut TimerBank,
        effects: &mut Vec<Effect>,
    ) {
        if self.settled || has_signal {
            return;
        }
        timers.schedule(TimerKind::FontFallback, config.font_fallback(), effects);
    }

    pub fn ready(&mut self, timers: &mut TimerBank, effects: &mut Vec<Effect>) {
        self.settle(timers, effects);
    }

    /// Failure counts as completion; fallback fonts are used.
    pub fn failed(&mut self, reason: &str, timers: &mut TimerBank, effects: &mut Vec<Effect>) {
        warn!(reason, "font loading failed; using fallback fonts");
        self.settle(timers, effects);
    }

    fn settle(&mut self, timers: &mut TimerBank, effects: &mut Vec<Effect>) {
        if self.settled {
            return;
        }
        self.settled = true;
        timers.cancel(TimerKind::FontFallback, effects);
        effects.push(Effect::SetFontsLoading(false));
        debug!("fonts settled");
    }
}
