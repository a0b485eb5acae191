//! Host commands produced by event handlers.
//!
//! Handlers never touch the page directly; they return a list of effects
//! that the host applies in order. This list is the state delta the host
//! needs to keep the document in sync with the core.

use core::time::Duration;

use crate::rain::RainFrame;
use crate::theme::Theme;
use crate::tile::{EmbedSpec, TileState, TileView};
use crate::timer::TimerKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a new tile to the gallery container.
    AppendTile(TileView),
    /// Re-append the sentinel marker after the last tile.
    MoveSentinelToEnd,
    ObserveSentinel,
    /// Stop watching the sentinel. Followed by `ObserveSentinel` to re-arm
    /// while batches remain.
    UnobserveSentinel,
    /// Start proximity observation for a placeholder tile.
    ObserveTile(u32),
    UnobserveTile(u32),
    /// Replace the tile's placeholder with an embedded document.
    EmbedContent(EmbedSpec),
    /// Reflect a settled load on the tile (`Loaded` or `Failed`).
    SetContentState { index: u32, state: TileState },

    /// Toggle the light-mode class on the document root.
    SetLightMode(bool),
    SetThemeCheckbox(bool),
    /// Save the theme under `key` (see [`Theme::persist`]).
    PersistPreference { key: String, value: Theme },

    /// `None` clears the overlay's document.
    SetOverlaySource(Option<String>),
    /// Display mode of the overlay container (shown vs. removed from layout).
    SetOverlayDisplayed(bool),
    /// The transition-triggering visible class.
    SetOverlayVisible(bool),
    /// Suppress background scrolling while the overlay is up.
    SetScrollLocked(bool),

    ScheduleTimer {
        timer: TimerKind,
        generation: u64,
        delay: Duration,
    },
    CancelTimer(TimerKind),

    /// Resize the animation surface to the viewport.
    ResizeSurface { width: u32, height: u32 },
    RequestAnimationFrame,
    CancelAnimationFrame,
    PaintRain(RainFrame),

    /// Toggle the fonts-loading class on the body.
    SetFontsLoading(bool),
}
