//! Gallery tiles: the per-index record and the host-facing view.
//!
//! [`TileFactory`] turns an index into two things:
//! - a [`Tile`], the state record kept by the [`crate::ViewportLoader`], and
//! - a [`TileView`], the description the host renders (classes, stagger,
//!   labels, and either a placeholder or the embedded document).

use core::time::Duration;

use crate::config::GalleryConfig;
use crate::layout::{Distribution, TileLayout};

pub const TILE_CLASS: &str = "gallery-item";
pub const FULL_WIDTH_CLASS: &str = "full-width-item";

/// Lifecycle of a tile's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Placeholder showing the index; waiting for proximity.
    Placeholder,
    /// Embedded document inserted, not yet loaded.
    Loading,
    Loaded,
    /// Load failed; the tile stays visible and is not retried.
    Failed,
}

impl TileState {
    /// Anything past the placeholder has been realized.
    #[must_use]
    pub const fn is_realized(self) -> bool {
        !matches!(self, Self::Placeholder)
    }
}

/// State record for one released tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: u32,
    pub layout: TileLayout,
    pub content_path: String,
    pub state: TileState,
}

impl Tile {
    #[must_use]
    pub const fn is_realized(&self) -> bool {
        self.state.is_realized()
    }

    #[must_use]
    pub const fn is_distinguished(&self) -> bool {
        matches!(self.layout, TileLayout::FullWidth)
    }
}

/// Everything the host needs to create an embedded-document element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSpec {
    pub index: u32,
    pub src: String,
    pub title: String,
    /// Sandbox policy; must be preserved by the host.
    pub sandbox: String,
    /// Whether the host should also ask the browser to defer loading.
    pub lazy: bool,
}

/// Initial body of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileContent {
    /// Placeholder showing the label; the real document is deferred.
    Placeholder,
    /// Document embedded immediately.
    Embedded(EmbedSpec),
}

/// Host-facing description of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileView {
    pub index: u32,
    /// Classes in application order.
    pub classes: Vec<&'static str>,
    /// Entrance animation delay; zero for the distinguished tile.
    pub stagger_delay: Duration,
    /// Text shown by the placeholder and the overlay.
    pub label: String,
    /// Path opened by the click target.
    pub content_path: String,
    pub content: TileContent,
}

impl TileView {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(&class)
    }
}

/// Builds tiles from indices using the normalized layout.
#[derive(Debug, Clone)]
pub struct TileFactory {
    config: GalleryConfig,
    distribution: Distribution,
}

impl TileFactory {
    #[must_use]
    pub fn new(config: GalleryConfig, distribution: Distribution) -> Self {
        Self {
            config,
            distribution,
        }
    }

    #[must_use]
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Embedded-document description for `index`.
    #[must_use]
    pub fn embed_spec(&self, index: u32) -> EmbedSpec {
        EmbedSpec {
            index,
            src: self.config.content_path(index),
            title: self.config.content_title(index),
            sandbox: self.config.sandbox.clone(),
            lazy: true,
        }
    }

    /// Build the record and the view for `index` (1-based).
    #[must_use]
    pub fn build(&self, index: u32) -> (Tile, TileView) {
        let layout = self.distribution.layout_for(index);
        let content_path = self.config.content_path(index);
        let label = index.to_string();

        let (classes, stagger_delay, content, state) = match layout {
            TileLayout::FullWidth => (
                vec![TILE_CLASS, FULL_WIDTH_CLASS],
                Duration::ZERO,
                TileContent::Embedded(self.embed_spec(index)),
                TileState::Loading,
            ),
            TileLayout::Regular(entry) => {
                let mut classes = vec![TILE_CLASS];
                if let Some(span) = entry.span_class() {
                    classes.push(span.as_class());
                }
                if !entry.style_tag.is_empty() {
                    classes.push(entry.style_tag);
                }
                (
                    classes,
                    self.config.stagger_delay(index),
                    TileContent::Placeholder,
                    TileState::Placeholder,
                )
            }
        };

        let tile = Tile {
            index,
            layout,
            content_path: content_path.clone(),
            state,
        };
        let view = TileView {
            index,
            classes,
            stagger_delay,
            label,
            content_path,
            content,
        };
        (tile, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn factory() -> TileFactory {
        TileFactory::new(
            GalleryConfig::default(),
            Distribution::standard(100).unwrap(),
        )
    }

    #[test]
    fn regular_tile_starts_as_placeholder() {
        let (tile, view) = factory().build(2);
        assert_eq!(tile.state, TileState::Placeholder);
        assert!(!tile.is_realized());
        assert_eq!(view.classes, vec!["gallery-item", "span-col-2", "ultra-wide"]);
        assert_eq!(view.label, "2");
        assert_eq!(view.content, TileContent::Placeholder);
        assert_eq!(view.stagger_delay, Duration::from_millis(60));
        assert_eq!(
            view.content_path,
            "artpieces/escapist_capital_variation_2.html"
        );
    }

    #[test]
    fn untagged_square_gets_only_base_class() {
        let (_, view) = factory().build(4);
        assert_eq!(view.classes, vec!["gallery-item"]);
    }

    #[test]
    fn unnamed_span_keeps_style_tag_without_span_class() {
        // Row 11 holds the 3x2 "panoramic" entry at flattened position 68.
        let (_, view) = factory().build(68);
        assert_eq!(view.classes, vec!["gallery-item", "panoramic"]);
    }

    #[test]
    fn last_index_is_distinguished_and_embedded() {
        let (tile, view) = factory().build(100);
        assert!(tile.is_distinguished());
        assert!(tile.is_realized());
        assert_eq!(view.classes, vec!["gallery-item", "full-width-item"]);
        assert_eq!(view.stagger_delay, Duration::ZERO);
        let TileContent::Embedded(spec) = view.content else {
            panic!("distinguished tile must embed immediately");
        };
        assert_eq!(spec.src, "artpieces/escapist_capital_variation_100.html");
        assert_eq!(spec.title, "Escapist Capital Variation 100");
        assert_eq!(spec.sandbox, "allow-scripts allow-same-origin");
    }
}
