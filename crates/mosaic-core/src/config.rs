//! Gallery configuration.
//!
//! Every field has a default matching the shipped page, so the host may pass
//! an empty object (or nothing) and only override what it needs:
//!
//! ```ignore
//! let config = GalleryConfig::from_json(r#"{ "total_pieces": 40, "batch_size": 8 }"#)?;
//! assert_eq!(config.content_path(3), "artpieces/escapist_capital_variation_3.html");
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// Color pair used by the rain for one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainPalette {
    /// Glyph fill color.
    pub text: String,
    /// Translucent wash drawn over the whole surface before each frame.
    pub fade: String,
}

/// Decorative character-rain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Alphabet drawn by the drops.
    pub chars: String,
    /// Glyph size in CSS pixels; also the column width.
    pub font_size: u32,
    pub font_family: String,
    /// Draw one frame out of every `frame_skip` animation frames.
    pub frame_skip: u32,
    /// Probability that a drop past the bottom edge restarts at the top.
    pub reset_chance: f64,
    pub resize_debounce_ms: u64,
    pub scroll_settle_ms: u64,
    pub dark: RainPalette,
    pub light: RainPalette,
    /// Seed for the glyph/reset generator. Zero is remapped to a fixed odd seed.
    pub seed: u32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            chars: "10".to_string(),
            font_size: 14,
            font_family: "monospace".to_string(),
            frame_skip: 4,
            reset_chance: 0.025,
            resize_debounce_ms: 250,
            scroll_settle_ms: 200,
            dark: RainPalette {
                text: "#00dd00".to_string(),
                fade: "rgba(0, 0, 0, 0.04)".to_string(),
            },
            light: RainPalette {
                text: "#333333".to_string(),
                fade: "rgba(255, 255, 255, 0.06)".to_string(),
            },
            seed: 0x9E37_79B9,
        }
    }
}

impl RainConfig {
    /// CSS font shorthand used for every glyph.
    #[must_use]
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }

    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub const fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

/// Page-level configuration for one gallery session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Number of art pieces `N`. Item `N` is the distinguished full-width tile.
    pub total_pieces: u32,
    /// Tiles released per scheduler batch.
    pub batch_size: u32,
    pub base_path: String,
    pub base_name: String,
    pub extension: String,
    /// Prefix of each embedded document's accessible title.
    pub title_prefix: String,
    /// Storage key holding `"dark"` or `"light"`.
    pub preference_key: String,
    /// How far below the viewport a tile starts loading.
    pub preload_margin_px: u32,
    /// Fraction of a tile that must intersect before it counts as near.
    pub threshold: f64,
    /// Sandbox policy for embedded documents.
    pub sandbox: String,
    pub stagger_step_ms: u64,
    pub stagger_period: u32,
    pub overlay_reveal_delay_ms: u64,
    /// Upper bound on waiting for the overlay close transition.
    pub overlay_hide_fallback_ms: u64,
    /// Delay before clearing the fonts-loading flag when the host has no
    /// font readiness signal.
    pub font_fallback_ms: u64,
    pub rain: RainConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            total_pieces: 100,
            batch_size: 15,
            base_path: "artpieces/".to_string(),
            base_name: "escapist_capital_variation_".to_string(),
            extension: "html".to_string(),
            title_prefix: "Escapist Capital Variation".to_string(),
            preference_key: "galleryTheme".to_string(),
            preload_margin_px: 200,
            threshold: 0.01,
            sandbox: "allow-scripts allow-same-origin".to_string(),
            stagger_step_ms: 30,
            stagger_period: 20,
            overlay_reveal_delay_ms: 10,
            overlay_hide_fallback_ms: 600,
            font_fallback_ms: 500,
            rain: RainConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Parse a JSON object and validate it.
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the scheduler or the rain degenerate.
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.total_pieces == 0 {
            return Err(GalleryError::Config("total_pieces must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(GalleryError::Config("batch_size must be at least 1".into()));
        }
        if self.stagger_period == 0 {
            return Err(GalleryError::Config("stagger_period must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(GalleryError::Config(format!(
                "threshold {} is outside 0..=1",
                self.threshold
            )));
        }
        if self.rain.font_size == 0 {
            return Err(GalleryError::Config("rain.font_size must be at least 1".into()));
        }
        if self.rain.frame_skip == 0 {
            return Err(GalleryError::Config("rain.frame_skip must be at least 1".into()));
        }
        if self.rain.chars.is_empty() {
            return Err(GalleryError::Config("rain.chars must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.rain.reset_chance) {
            return Err(GalleryError::Config(format!(
                "rain.reset_chance {} is outside 0..=1",
                self.rain.reset_chance
            )));
        }
        Ok(())
    }

    /// `{base_path}{base_name}{index}.{extension}`
    #[must_use]
    pub fn content_path(&self, index: u32) -> String {
        format!(
            "{}{}{}.{}",
            self.base_path, self.base_name, index, self.extension
        )
    }

    #[must_use]
    pub fn content_title(&self, index: u32) -> String {
        format!("{} {}", self.title_prefix, index)
    }

    /// Observer root margin: only the bottom edge is extended.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.preload_margin_px)
    }

    /// Presentational entrance delay: `(index mod period) * step`.
    #[must_use]
    pub fn stagger_delay(&self, index: u32) -> Duration {
        let slot = u64::from(index % self.stagger_period.max(1));
        Duration::from_millis(slot.saturating_mul(self.stagger_step_ms))
    }

    #[must_use]
    pub const fn overlay_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.overlay_reveal_delay_ms)
    }

    #[must_use]
    pub const fn overlay_hide_fallback(&self) -> Duration {
        Duration::from_millis(self.overlay_hide_fallback_ms)
    }

    #[must_use]
    pub const fn font_fallback(&self) -> Duration {
        Duration::from_millis(self.font_fallback_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_shipped_page() {
        let config = GalleryConfig::default();
        assert_eq!(config.total_pieces, 100);
        assert_eq!(config.batch_size, 15);
        assert_eq!(
            config.content_path(7),
            "artpieces/escapist_capital_variation_7.html"
        );
        assert_eq!(config.content_title(7), "Escapist Capital Variation 7");
        assert_eq!(config.root_margin(), "0px 0px 200px 0px");
        assert_eq!(config.rain.font(), "14px monospace");
        config.validate().unwrap();
    }

    #[test]
    fn stagger_wraps_every_period() {
        let config = GalleryConfig::default();
        assert_eq!(config.stagger_delay(0), Duration::ZERO);
        assert_eq!(config.stagger_delay(1), Duration::from_millis(30));
        assert_eq!(config.stagger_delay(19), Duration::from_millis(570));
        assert_eq!(config.stagger_delay(20), Duration::ZERO);
        assert_eq!(config.stagger_delay(45), Duration::from_millis(150));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GalleryConfig::from_json(r#"{ "total_pieces": 40, "rain": { "chars": "ab" } }"#)
                .unwrap();
        assert_eq!(config.total_pieces, 40);
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.rain.chars, "ab");
        assert_eq!(config.rain.font_size, 14);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = GalleryConfig::from_json(r#"{ "batch_size": 0 }"#).unwrap_err();
        assert!(matches!(err, GalleryError::Config(_)), "{err}");
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = GalleryConfig::from_json("{ total_pieces: ").unwrap_err();
        assert!(matches!(err, GalleryError::Json(_)), "{err}");
    }

    #[test]
    fn empty_rain_alphabet_is_rejected() {
        let mut config = GalleryConfig::default();
        config.rain.chars.clear();
        assert!(config.validate().is_err());
    }
}
