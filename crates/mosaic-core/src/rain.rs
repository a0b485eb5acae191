//! Decorative character-rain animation.
//!
//! One drop per column of `font_size` pixels. Each drawn frame washes the
//! surface with a translucent fade color, then draws one random glyph per
//! column at the drop's row and advances every drop. Drops past the bottom
//! edge restart at the top with probability `reset_chance`, which staggers
//! the columns.
//!
//! # Determinism
//!
//! Uses xorshift32 seeded from the config, so a given seed and frame
//! sequence always produce the same glyphs.
//!
//! # Pausing
//!
//! The animation loop runs only while the page is visible and the user is
//! not scrolling. Pausing cancels the pending animation frame; resuming
//! requests one. At most one frame request is outstanding.

use tracing::debug;

use crate::config::{RainConfig, RainPalette};
use crate::effect::Effect;
use crate::theme::Theme;

/// Fallback xorshift state; the generator must never be zero.
const FALLBACK_SEED: u32 = 0x9E37_79B9;

/// Deterministic xorshift32 PRNG.
#[inline]
fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Map a random word to `[0, 1)` using its top 24 bits.
#[inline]
fn unit_interval(word: u32) -> f64 {
    f64::from(word >> 8) / f64::from(1u32 << 24)
}

/// One glyph to draw at a baseline position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainGlyph {
    pub x: f64,
    pub y: f64,
    pub ch: char,
}

/// Everything the host needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RainFrame {
    pub width: u32,
    pub height: u32,
    /// Translucent wash over the whole surface.
    pub fade: String,
    pub text: String,
    /// CSS font shorthand.
    pub font: String,
    pub glyphs: Vec<RainGlyph>,
}

#[derive(Debug, Clone)]
pub struct RainField {
    config: RainConfig,
    alphabet: Vec<char>,
    theme: Theme,
    width: u32,
    height: u32,
    drops: Vec<u32>,
    frame_count: u32,
    rng: u32,
    hidden: bool,
    scrolling: bool,
    frame_pending: bool,
    frames_drawn: u64,
}

impl RainField {
    #[must_use]
    pub fn new(config: RainConfig, theme: Theme) -> Self {
        let alphabet: Vec<char> = config.chars.chars().collect();
        let rng = if config.seed == 0 {
            FALLBACK_SEED
        } else {
            config.seed
        };
        Self {
            config,
            alphabet,
            theme,
            width: 0,
            height: 0,
            drops: Vec::new(),
            frame_count: 0,
            rng,
            hidden: false,
            scrolling: false,
            frame_pending: false,
            frames_drawn: 0,
        }
    }

    /// Recompute columns for a new surface size and reset every drop.
    pub fn setup(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let columns = (width / self.config.font_size.max(1)) as usize;
        self.drops.clear();
        self.drops.resize(columns, 1);
        self.frame_count = 0;
        debug!(width, height, columns, "rain surface configured");
    }

    /// Switch palettes; takes effect on the next drawn frame.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn palette(&self) -> &RainPalette {
        match self.theme {
            Theme::Dark => &self.config.dark,
            Theme::Light => &self.config.light,
        }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    #[must_use]
    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.hidden || self.scrolling
    }

    #[must_use]
    pub const fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    #[must_use]
    pub const fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Request a frame unless paused or one is already pending.
    pub fn resume(&mut self, effects: &mut Vec<Effect>) {
        if self.is_paused() || self.frame_pending {
            return;
        }
        self.frame_pending = true;
        effects.push(Effect::RequestAnimationFrame);
    }

    fn halt(&mut self, effects: &mut Vec<Effect>) {
        if self.frame_pending {
            self.frame_pending = false;
            effects.push(Effect::CancelAnimationFrame);
        }
    }

    pub fn set_hidden(&mut self, hidden: bool, effects: &mut Vec<Effect>) {
        self.hidden = hidden;
        if self.is_paused() {
            self.halt(effects);
        } else {
            self.resume(effects);
        }
    }

    pub fn begin_scroll(&mut self, effects: &mut Vec<Effect>) {
        self.scrolling = true;
        self.halt(effects);
    }

    pub fn end_scroll(&mut self, effects: &mut Vec<Effect>) {
        self.scrolling = false;
        self.resume(effects);
    }

    /// Apply a settled resize: stop, re-layout, resize the surface, restart.
    pub fn resize(&mut self, width: u32, height: u32, effects: &mut Vec<Effect>) {
        self.halt(effects);
        self.setup(width, height);
        effects.push(Effect::ResizeSurface { width, height });
        self.resume(effects);
    }

    /// An animation frame arrived. Draws one frame every `frame_skip` calls.
    pub fn on_frame(&mut self, effects: &mut Vec<Effect>) {
        self.frame_pending = false;
        if self.is_paused() {
            return;
        }
        self.frame_count += 1;
        if self.frame_count >= self.config.frame_skip {
            self.frame_count = 0;
            let frame = self.step();
            effects.push(Effect::PaintRain(frame));
        }
        self.resume(effects);
    }

    /// Advance every drop by one row and return the glyphs to draw.
    pub fn step(&mut self) -> RainFrame {
        let size = self.config.font_size;
        let mut glyphs = Vec::with_capacity(self.drops.len());
        for (column, drop) in self.drops.iter_mut().enumerate() {
            let ch = if self.alphabet.is_empty() {
                ' '
            } else {
                let pick = xorshift32(&mut self.rng) as usize % self.alphabet.len();
                self.alphabet[pick]
            };
            let y = u64::from(*drop) * u64::from(size);
            glyphs.push(RainGlyph {
                x: (column as f64) * f64::from(size),
                y: y as f64,
                ch,
            });
            if y > u64::from(self.height)
                && unit_interval(xorshift32(&mut self.rng)) < self.config.reset_chance
            {
                *drop = 0;
            }
            *drop = drop.saturating_add(1);
        }
        self.frames_drawn += 1;
        let palette = self.palette();
        RainFrame {
            width: self.width,
            height: self.height,
            fade: palette.fade.clone(),
            text: palette.text.clone(),
            font: self.config.font(),
            glyphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn field() -> RainField {
        let mut rain = RainField::new(RainConfig::default(), Theme::Dark);
        rain.setup(140, 70);
        rain
    }

    #[test]
    fn xorshift32_no_zero() {
        let mut state = FALLBACK_SEED;
        for _ in 0..10_000 {
            assert_ne!(xorshift32(&mut state), 0);
        }
    }

    #[test]
    fn setup_derives_columns_from_font_size() {
        let mut rain = field();
        assert_eq!(rain.columns(), 10);
        assert!(rain.drops().iter().all(|&d| d == 1));
        rain.setup(13, 70);
        assert_eq!(rain.columns(), 0);
        assert!(rain.step().glyphs.is_empty());
    }

    #[test]
    fn draws_every_fourth_frame() {
        let mut rain = field();
        let mut fx = Vec::new();
        rain.resume(&mut fx);
        let mut painted = 0;
        for _ in 0..12 {
            fx.clear();
            rain.on_frame(&mut fx);
            painted += fx
                .iter()
                .filter(|e| matches!(e, Effect::PaintRain(_)))
                .count();
            assert_eq!(fx.last(), Some(&Effect::RequestAnimationFrame));
        }
        assert_eq!(painted, 3);
        assert_eq!(rain.frames_drawn(), 3);
    }

    #[test]
    fn step_places_glyphs_on_the_grid_and_advances_drops() {
        let mut rain = field();
        let frame = rain.step();
        assert_eq!(frame.glyphs.len(), 10);
        assert_eq!(frame.glyphs[3].x, 42.0);
        assert_eq!(frame.glyphs[3].y, 14.0);
        assert!(frame.glyphs.iter().all(|g| g.ch == '0' || g.ch == '1'));
        assert!(rain.drops().iter().all(|&d| d == 2));
        assert_eq!(frame.text, "#00dd00");
        assert_eq!(frame.font, "14px monospace");
    }

    #[test]
    fn drops_past_bottom_eventually_reset() {
        let mut rain = field();
        for _ in 0..2_000 {
            rain.step();
        }
        // Height 70 is 5 rows; with a 2.5% reset chance no drop can still be
        // thousands of rows down after 2000 steps unless resets never happen.
        assert!(rain.drops().iter().any(|&d| d < 1_000));
    }

    #[test]
    fn same_seed_same_frames() {
        let mut a = field();
        let mut b = field();
        for _ in 0..50 {
            assert_eq!(a.step(), b.step());
        }
    }

    #[test]
    fn scrolling_pauses_and_settling_resumes() {
        let mut rain = field();
        let mut fx = Vec::new();
        rain.resume(&mut fx);
        rain.begin_scroll(&mut fx);
        assert_eq!(
            fx,
            vec![Effect::RequestAnimationFrame, Effect::CancelAnimationFrame]
        );
        fx.clear();
        rain.begin_scroll(&mut fx);
        assert!(fx.is_empty(), "already halted");

        // A stray frame while paused draws nothing and requests nothing.
        rain.on_frame(&mut fx);
        assert!(fx.is_empty());

        rain.end_scroll(&mut fx);
        assert_eq!(fx, vec![Effect::RequestAnimationFrame]);
    }

    #[test]
    fn hidden_page_stays_paused_after_scroll_settles() {
        let mut rain = field();
        let mut fx = Vec::new();
        rain.set_hidden(true, &mut fx);
        rain.begin_scroll(&mut fx);
        rain.end_scroll(&mut fx);
        assert!(fx.is_empty());
        rain.set_hidden(false, &mut fx);
        assert_eq!(fx, vec![Effect::RequestAnimationFrame]);
    }

    #[test]
    fn theme_switch_changes_palette_immediately() {
        let mut rain = field();
        rain.set_theme(Theme::Light);
        let frame = rain.step();
        assert_eq!(frame.text, "#333333");
        assert_eq!(frame.fade, "rgba(255, 255, 255, 0.06)");
    }

    #[test]
    fn resize_resets_drops_and_surface() {
        let mut rain = field();
        for _ in 0..5 {
            rain.step();
        }
        let mut fx = Vec::new();
        rain.resume(&mut fx);
        fx.clear();
        rain.resize(280, 100, &mut fx);
        assert_eq!(
            fx,
            vec![
                Effect::CancelAnimationFrame,
                Effect::ResizeSurface {
                    width: 280,
                    height: 100
                },
                Effect::RequestAnimationFrame
            ]
        );
        assert_eq!(rain.columns(), 20);
        assert!(rain.drops().iter().all(|&d| d == 1));
    }
}
