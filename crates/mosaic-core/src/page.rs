//! One gallery session.
//!
//! [`Page`] owns every component for the lifetime of the document and routes
//! host events through its [`DispatchTable`]. There is no module-level state:
//! two pages never share a scheduler, loader, or timer bank.
//!
//! # Lifecycle
//!
//! 1. [`Page::new`] validates the config and normalizes the layout table.
//! 2. The host dispatches [`Event::Boot`] once every required element exists.
//! 3. The host keeps dispatching events and applying the returned effects.
//!
//! # Example
//!
//! ```ignore
//! let mut page = Page::new(GalleryConfig::default())?;
//! for effect in page.dispatch(Event::Boot { .. }) {
//!     host.apply(effect);
//! }
//! ```

use tracing::trace;

use crate::config::GalleryConfig;
use crate::dispatch::{DispatchTable, EventKind};
use crate::effect::Effect;
use crate::error::GalleryError;
use crate::event::Event;
use crate::fonts::FontGate;
use crate::layout::{Distribution, RawEntry};
use crate::loader::ViewportLoader;
use crate::overlay::OverlayController;
use crate::rain::RainField;
use crate::scheduler::BatchScheduler;
use crate::theme::Theme;
use crate::tile::TileFactory;
use crate::timer::TimerBank;

/// Mutable state shared by every handler.
#[derive(Debug, Clone)]
pub struct PageState {
    pub(crate) config: GalleryConfig,
    pub(crate) factory: TileFactory,
    pub(crate) scheduler: BatchScheduler,
    pub(crate) loader: ViewportLoader,
    pub(crate) theme: Theme,
    pub(crate) overlay: OverlayController,
    pub(crate) rain: Option<RainField>,
    pub(crate) fonts: FontGate,
    pub(crate) timers: TimerBank,
    pub(crate) booted: bool,
    pub(crate) sentinel_observed: bool,
    pub(crate) pending_resize: Option<(u32, u32)>,
}

impl PageState {
    fn new(config: GalleryConfig, distribution: Distribution) -> Self {
        let scheduler = BatchScheduler::new(config.total_pieces, config.batch_size);
        Self {
            factory: TileFactory::new(config.clone(), distribution),
            scheduler,
            loader: ViewportLoader::new(),
            theme: Theme::Dark,
            overlay: OverlayController::new(),
            rain: None,
            fonts: FontGate::new(),
            timers: TimerBank::new(),
            booted: false,
            sentinel_observed: false,
            pending_resize: None,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    #[must_use]
    pub fn factory(&self) -> &TileFactory {
        &self.factory
    }

    #[must_use]
    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn loader(&self) -> &ViewportLoader {
        &self.loader
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    #[must_use]
    pub fn rain(&self) -> Option<&RainField> {
        self.rain.as_ref()
    }

    #[must_use]
    pub fn fonts(&self) -> &FontGate {
        &self.fonts
    }

    #[must_use]
    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    #[must_use]
    pub const fn is_booted(&self) -> bool {
        self.booted
    }

    #[must_use]
    pub const fn sentinel_observed(&self) -> bool {
        self.sentinel_observed
    }
}

/// A gallery session: state plus the dispatch table built once at creation.
#[derive(Debug, Clone)]
pub struct Page {
    state: PageState,
    table: DispatchTable,
}

impl Page {
    /// Build a session over the shipped mosaic table.
    pub fn new(config: GalleryConfig) -> Result<Self, GalleryError> {
        config.validate()?;
        let distribution = Distribution::standard(config.total_pieces)?;
        Ok(Self::assemble(config, distribution))
    }

    /// Build a session over a custom table of rows.
    pub fn with_layout(config: GalleryConfig, rows: &[&[RawEntry]]) -> Result<Self, GalleryError> {
        config.validate()?;
        let distribution = Distribution::normalize(config.total_pieces, rows)?;
        Ok(Self::assemble(config, distribution))
    }

    fn assemble(config: GalleryConfig, distribution: Distribution) -> Self {
        Self {
            state: PageState::new(config, distribution),
            table: DispatchTable::standard(),
        }
    }

    /// Route one event to its handler and return the effects to apply.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let kind = EventKind::of(&event);
        let handler = self.table.handler(kind);
        let mut effects = Vec::new();
        handler(&mut self.state, &event, &mut effects);
        trace!(?kind, effects = effects.len(), "dispatched");
        effects
    }

    #[must_use]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    #[must_use]
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}
