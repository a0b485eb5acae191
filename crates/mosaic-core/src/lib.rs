#![forbid(unsafe_code)]

//! Host-agnostic engine for the mosaic gallery page.
//!
//! `mosaic-core` owns every piece of page state that has invariants worth
//! testing: the mosaic layout table, the batch scheduler that releases tiles
//! into the container, the viewport loader that swaps placeholders for
//! embedded documents, the theme preference, the fullscreen overlay, and the
//! decorative character-rain animation.
//!
//! # Primary responsibilities
//!
//! - **Layout**: normalize a fixed table of spans to exactly `N - 1` entries.
//! - **Tiles**: describe each gallery cell (classes, stagger, content).
//! - **Scheduler**: release tiles in fixed-size batches until exhausted.
//! - **Loader**: one-shot placeholder promotion on proximity.
//! - **Theme / Overlay / Rain / Fonts**: small state machines driven by events.
//! - **Dispatch**: an explicit event-kind → handler table over [`page::Page`].
//!
//! # Design principles
//!
//! - **No I/O**: the host pushes [`Event`]s and applies the returned
//!   [`Effect`]s; nothing here touches a DOM.
//! - **Deterministic**: time is host-driven through generation-tagged timers,
//!   and the rain uses a seeded xorshift generator.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod config;
pub mod dispatch;
pub mod effect;
pub mod error;
pub mod event;
pub mod fonts;
pub mod layout;
pub mod loader;
pub mod overlay;
pub mod page;
pub mod preference;
pub mod rain;
pub mod scheduler;
pub mod theme;
pub mod tile;
pub mod timer;

pub use config::{GalleryConfig, RainConfig, RainPalette};
pub use dispatch::{DispatchTable, EventKind, Handler};
pub use effect::Effect;
pub use error::{GalleryError, LayoutError, PreferenceError};
pub use event::{Event, TileRect};
pub use fonts::FontGate;
pub use layout::{Distribution, LayoutEntry, MOSAIC_ROWS, SpanClass, TileLayout};
pub use loader::{PromotionPath, ViewportLoader};
pub use overlay::{OverlayController, OverlayPhase};
pub use page::{Page, PageState};
pub use preference::{MemoryStore, PreferenceStore};
pub use rain::{RainField, RainFrame, RainGlyph};
pub use scheduler::BatchScheduler;
pub use theme::Theme;
pub use tile::{EmbedSpec, Tile, TileContent, TileFactory, TileState, TileView};
pub use timer::{TimerBank, TimerKind};
