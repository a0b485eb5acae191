//! Viewport loader: one-shot promotion of placeholder tiles.
//!
//! Tiles reach the loader through [`ViewportLoader::register`]. Placeholder
//! tiles are observed; when a proximity notification or a geometry sweep
//! finds one near the viewport it is promoted exactly once:
//! `Placeholder → Loading`, and it stops being observed.
//!
//! Two paths can promote a tile:
//! - [`PromotionPath::Proximity`]: the host's intersection notification.
//! - [`PromotionPath::Sweep`]: a direct bounding-box check during scrolling.
//!
//! Whichever runs first wins; the other sees a realized tile and skips it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, trace};

use crate::event::TileRect;
use crate::tile::{Tile, TileState};

/// Which mechanism noticed the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionPath {
    Proximity,
    Sweep,
}

#[derive(Debug, Clone, Default)]
pub struct ViewportLoader {
    tiles: BTreeMap<u32, Tile>,
    observed: BTreeSet<u32>,
    promotions: u32,
}

impl ViewportLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly built tile. Placeholders are observed; tiles that are
    /// already realized (the distinguished tile) are only tracked.
    ///
    /// Returns `false` when a tile with the same index already exists.
    pub fn register(&mut self, tile: Tile) -> bool {
        if self.tiles.contains_key(&tile.index) {
            debug!(index = tile.index, "tile already exists; skipping");
            return false;
        }
        if !tile.is_realized() {
            self.observed.insert(tile.index);
        }
        self.tiles.insert(tile.index, tile);
        true
    }

    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.tiles.contains_key(&index)
    }

    #[must_use]
    pub fn tile(&self, index: u32) -> Option<&Tile> {
        self.tiles.get(&index)
    }

    #[must_use]
    pub fn is_observed(&self, index: u32) -> bool {
        self.observed.contains(&index)
    }

    /// Indices still waiting for promotion, ascending.
    pub fn pending(&self) -> impl Iterator<Item = u32> + '_ {
        self.observed.iter().copied()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.observed.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Total promotions across both paths.
    #[must_use]
    pub const fn promotions(&self) -> u32 {
        self.promotions
    }

    /// Promote `index` if it is still a placeholder.
    ///
    /// Returns the promoted tile on the first call only; unknown indices and
    /// realized tiles yield `None`.
    pub fn promote(&mut self, index: u32, path: PromotionPath) -> Option<&Tile> {
        let tile = self.tiles.get_mut(&index)?;
        if tile.is_realized() {
            trace!(index, ?path, "tile already realized");
            return None;
        }
        tile.state = TileState::Loading;
        self.observed.remove(&index);
        self.promotions += 1;
        debug!(index, ?path, "promoting placeholder");
        Some(tile)
    }

    /// Secondary promotion path: check reported geometry directly.
    ///
    /// A tile qualifies when its top edge is above
    /// `viewport_height + preload_margin` and its bottom edge is below the
    /// top of the viewport. Returns the indices promoted by this sweep.
    pub fn sweep(
        &mut self,
        viewport_height: f64,
        preload_margin: f64,
        rects: &[TileRect],
    ) -> Vec<u32> {
        let limit = viewport_height + preload_margin;
        let mut promoted = Vec::new();
        for rect in rects {
            if rect.top < limit
                && rect.bottom > 0.0
                && self.promote(rect.index, PromotionPath::Sweep).is_some()
            {
                promoted.push(rect.index);
            }
        }
        promoted
    }

    /// `Loading → Loaded`. Returns whether the state changed.
    pub fn mark_loaded(&mut self, index: u32) -> bool {
        self.settle(index, TileState::Loaded)
    }

    /// `Loading → Failed`. The tile stays visible and is never retried.
    pub fn mark_failed(&mut self, index: u32) -> bool {
        let changed = self.settle(index, TileState::Failed);
        if changed {
            if let Some(tile) = self.tiles.get(&index) {
                error!(index, path = %tile.content_path, "failed to load embedded content");
            }
        }
        changed
    }

    fn settle(&mut self, index: u32, next: TileState) -> bool {
        match self.tiles.get_mut(&index) {
            Some(tile) if tile.state == TileState::Loading => {
                tile.state = next;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::layout::{LayoutEntry, TileLayout};

    fn placeholder(index: u32) -> Tile {
        Tile {
            index,
            layout: TileLayout::Regular(LayoutEntry::FILLER),
            content_path: format!("art/{index}.html"),
            state: TileState::Placeholder,
        }
    }

    #[test]
    fn promotion_happens_once() {
        let mut loader = ViewportLoader::new();
        assert!(loader.register(placeholder(1)));
        assert!(loader.is_observed(1));

        let tile = loader.promote(1, PromotionPath::Proximity).unwrap();
        assert_eq!(tile.state, TileState::Loading);
        assert!(!loader.is_observed(1));

        assert!(loader.promote(1, PromotionPath::Proximity).is_none());
        assert!(loader.promote(1, PromotionPath::Sweep).is_none());
        assert_eq!(loader.promotions(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut loader = ViewportLoader::new();
        assert!(loader.register(placeholder(3)));
        assert!(!loader.register(placeholder(3)));
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn realized_tiles_are_tracked_but_not_observed() {
        let mut loader = ViewportLoader::new();
        let mut tile = placeholder(9);
        tile.layout = TileLayout::FullWidth;
        tile.state = TileState::Loading;
        loader.register(tile);
        assert!(loader.contains(9));
        assert!(!loader.is_observed(9));
        assert!(loader.promote(9, PromotionPath::Proximity).is_none());
        assert!(loader.mark_loaded(9));
    }

    #[test]
    fn sweep_promotes_tiles_inside_preload_band() {
        let mut loader = ViewportLoader::new();
        for i in 1..=4 {
            loader.register(placeholder(i));
        }
        let rects = [
            TileRect::new(1, -500.0, -10.0), // scrolled past
            TileRect::new(2, 100.0, 300.0),  // on screen
            TileRect::new(3, 850.0, 1000.0), // inside the 200px margin
            TileRect::new(4, 1100.0, 1300.0),
        ];
        assert_eq!(loader.sweep(800.0, 200.0, &rects), vec![2, 3]);
        assert_eq!(loader.pending().collect::<Vec<_>>(), vec![1, 4]);

        // Proximity arriving after the sweep is a no-op.
        assert!(loader.promote(3, PromotionPath::Proximity).is_none());
    }

    #[test]
    fn settle_requires_loading_state() {
        let mut loader = ViewportLoader::new();
        loader.register(placeholder(5));
        assert!(!loader.mark_loaded(5));
        loader.promote(5, PromotionPath::Proximity);
        assert!(loader.mark_failed(5));
        assert!(!loader.mark_loaded(5));
        assert_eq!(loader.tile(5).unwrap().state, TileState::Failed);
        assert!(loader.promote(5, PromotionPath::Sweep).is_none());
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut loader = ViewportLoader::new();
        assert!(loader.promote(42, PromotionPath::Proximity).is_none());
        assert!(!loader.mark_failed(42));
    }
}
