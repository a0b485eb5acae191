//! Event dispatch table.
//!
//! Every [`EventKind`] maps to exactly one [`Handler`]. The table is built
//! once per [`crate::Page`]; handlers mutate the passed-in [`PageState`] and
//! push the [`Effect`]s the host must apply.

use tracing::{info, trace, warn};

use crate::effect::Effect;
use crate::event::Event;
use crate::loader::PromotionPath;
use crate::page::PageState;
use crate::rain::RainField;
use crate::theme::Theme;
use crate::tile::TileState;
use crate::timer::TimerKind;

/// Handler signature shared by every table entry.
pub type Handler = fn(&mut PageState, &Event, &mut Vec<Effect>);

/// Discriminant of [`Event`], used as the table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Boot,
    SentinelNear,
    TileNear,
    ScrollGeometry,
    ContentLoaded,
    ContentFailed,
    ThemeToggled,
    TileClicked,
    CloseRequested,
    KeyDown,
    OverlayTransitionEnd,
    Scroll,
    VisibilityChanged,
    Resize,
    AnimationFrame,
    TimerFired,
    FontsReady,
    FontsFailed,
}

impl EventKind {
    pub const COUNT: usize = 18;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Boot,
        Self::SentinelNear,
        Self::TileNear,
        Self::ScrollGeometry,
        Self::ContentLoaded,
        Self::ContentFailed,
        Self::ThemeToggled,
        Self::TileClicked,
        Self::CloseRequested,
        Self::KeyDown,
        Self::OverlayTransitionEnd,
        Self::Scroll,
        Self::VisibilityChanged,
        Self::Resize,
        Self::AnimationFrame,
        Self::TimerFired,
        Self::FontsReady,
        Self::FontsFailed,
    ];

    #[must_use]
    pub const fn of(event: &Event) -> Self {
        match event {
            Event::Boot { .. } => Self::Boot,
            Event::SentinelNear => Self::SentinelNear,
            Event::TileNear { .. } => Self::TileNear,
            Event::ScrollGeometry { .. } => Self::ScrollGeometry,
            Event::ContentLoaded { .. } => Self::ContentLoaded,
            Event::ContentFailed { .. } => Self::ContentFailed,
            Event::ThemeToggled { .. } => Self::ThemeToggled,
            Event::TileClicked { .. } => Self::TileClicked,
            Event::CloseRequested => Self::CloseRequested,
            Event::KeyDown { .. } => Self::KeyDown,
            Event::OverlayTransitionEnd => Self::OverlayTransitionEnd,
            Event::Scroll => Self::Scroll,
            Event::VisibilityChanged { .. } => Self::VisibilityChanged,
            Event::Resize { .. } => Self::Resize,
            Event::AnimationFrame => Self::AnimationFrame,
            Event::TimerFired { .. } => Self::TimerFired,
            Event::FontsReady => Self::FontsReady,
            Event::FontsFailed { .. } => Self::FontsFailed,
        }
    }

    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// Fixed mapping from event kind to handler.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    handlers: [Handler; EventKind::COUNT],
}

impl DispatchTable {
    /// The page's handler set.
    #[must_use]
    pub fn standard() -> Self {
        let mut handlers = [ignore as Handler; EventKind::COUNT];
        for kind in EventKind::ALL {
            handlers[kind.slot()] = match kind {
                EventKind::Boot => on_boot,
                EventKind::SentinelNear => on_sentinel_near,
                EventKind::TileNear => on_tile_near,
                EventKind::ScrollGeometry => on_scroll_geometry,
                EventKind::ContentLoaded => on_content_loaded,
                EventKind::ContentFailed => on_content_failed,
                EventKind::ThemeToggled => on_theme_toggled,
                EventKind::TileClicked => on_tile_clicked,
                EventKind::CloseRequested => on_close_requested,
                EventKind::KeyDown => on_key_down,
                EventKind::OverlayTransitionEnd => on_overlay_transition_end,
                EventKind::Scroll => on_scroll,
                EventKind::VisibilityChanged => on_visibility_changed,
                EventKind::Resize => on_resize,
                EventKind::AnimationFrame => on_animation_frame,
                EventKind::TimerFired => on_timer_fired,
                EventKind::FontsReady => on_fonts_ready,
                EventKind::FontsFailed => on_fonts_failed,
            };
        }
        Self { handlers }
    }

    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Handler {
        self.handlers[kind.slot()]
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn ignore(_: &mut PageState, _: &Event, _: &mut Vec<Effect>) {}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

fn apply_theme(state: &mut PageState, theme: Theme, effects: &mut Vec<Effect>) {
    state.theme = theme;
    effects.push(Effect::SetLightMode(theme.is_light()));
    effects.push(Effect::SetThemeCheckbox(theme.is_light()));
    if let Some(rain) = state.rain.as_mut() {
        rain.set_theme(theme);
    }
}

/// Release one batch: append each tile, observe placeholders, move the
/// sentinel, and re-arm or drop its observation.
///
/// Moving the sentinel does not change its intersection state, so an
/// observer would stay silent while it sits inside the preload band. Observing
/// it again forces a fresh notification for every batch still to come.
fn release_batch(state: &mut PageState, effects: &mut Vec<Effect>) -> bool {
    let Some(batch) = state.scheduler.begin() else {
        return false;
    };
    for index in batch.clone() {
        let (tile, view) = state.factory.build(index);
        let observe = !tile.is_realized();
        if !state.loader.register(tile) {
            continue;
        }
        effects.push(Effect::AppendTile(view));
        if observe {
            effects.push(Effect::ObserveTile(index));
        }
    }
    state.scheduler.complete(batch);
    effects.push(Effect::MoveSentinelToEnd);
    if state.sentinel_observed {
        effects.push(Effect::UnobserveSentinel);
        if state.scheduler.is_exhausted() {
            state.sentinel_observed = false;
        } else {
            effects.push(Effect::ObserveSentinel);
        }
    }
    true
}

fn promote(state: &mut PageState, index: u32, path: PromotionPath, effects: &mut Vec<Effect>) {
    if state.loader.promote(index, path).is_some() {
        effects.push(Effect::EmbedContent(state.factory.embed_spec(index)));
        effects.push(Effect::UnobserveTile(index));
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn on_boot(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::Boot {
        theme,
        viewport_width,
        viewport_height,
        animation_surface,
        font_signal,
    } = event
    else {
        return;
    };
    if state.booted {
        warn!("boot received twice; ignoring");
        return;
    }
    state.booted = true;
    info!(
        total = state.config.total_pieces,
        batch_size = state.config.batch_size,
        "gallery booting"
    );

    if *animation_surface {
        state.rain = Some(RainField::new(state.config.rain.clone(), Theme::Dark));
    }
    apply_theme(state, *theme, effects);

    state
        .fonts
        .arm(*font_signal, &state.config, &mut state.timers, effects);

    if let Some(rain) = state.rain.as_mut() {
        rain.resize(*viewport_width, *viewport_height, effects);
    }

    release_batch(state, effects);
    if !state.scheduler.is_exhausted() {
        state.sentinel_observed = true;
        effects.push(Effect::ObserveSentinel);
    }
}

fn on_sentinel_near(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    if !state.booted {
        return;
    }
    release_batch(state, effects);
}

fn on_tile_near(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let Event::TileNear { index } = event {
        promote(state, *index, PromotionPath::Proximity, effects);
    }
}

fn on_scroll_geometry(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::ScrollGeometry {
        viewport_height,
        tiles,
    } = event
    else {
        return;
    };
    let margin = f64::from(state.config.preload_margin_px);
    for index in state.loader.sweep(*viewport_height, margin, tiles) {
        effects.push(Effect::EmbedContent(state.factory.embed_spec(index)));
        effects.push(Effect::UnobserveTile(index));
    }
}

fn on_content_loaded(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let Event::ContentLoaded { index } = event
        && state.loader.mark_loaded(*index)
    {
        effects.push(Effect::SetContentState {
            index: *index,
            state: TileState::Loaded,
        });
    }
}

fn on_content_failed(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let Event::ContentFailed { index } = event
        && state.loader.mark_failed(*index)
    {
        effects.push(Effect::SetContentState {
            index: *index,
            state: TileState::Failed,
        });
    }
}

fn on_theme_toggled(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::ThemeToggled { checked } = event else {
        return;
    };
    let theme = Theme::from_checked(*checked);
    apply_theme(state, theme, effects);
    effects.push(Effect::PersistPreference {
        key: state.config.preference_key.clone(),
        value: theme,
    });
}

fn on_tile_clicked(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::TileClicked { index } = event else {
        return;
    };
    let Some(path) = state.loader.tile(*index).map(|t| t.content_path.clone()) else {
        warn!(index, "click on unknown tile");
        return;
    };
    state
        .overlay
        .open(&path, &state.config, &mut state.timers, effects);
}

fn on_close_requested(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    state
        .overlay
        .close(&state.config, &mut state.timers, effects);
}

fn on_key_down(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let Event::KeyDown { key } = event
        && key == "Escape"
    {
        state
            .overlay
            .escape(&state.config, &mut state.timers, effects);
    }
}

fn on_overlay_transition_end(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    state.overlay.transition_end(&mut state.timers, effects);
}

fn on_scroll(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    if let Some(rain) = state.rain.as_mut() {
        rain.begin_scroll(effects);
        state.timers.schedule(
            TimerKind::ScrollSettle,
            state.config.rain.scroll_settle(),
            effects,
        );
    }
}

fn on_visibility_changed(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let (Event::VisibilityChanged { hidden }, Some(rain)) = (event, state.rain.as_mut()) {
        rain.set_hidden(*hidden, effects);
    }
}

fn on_resize(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::Resize { width, height } = event else {
        return;
    };
    if state.rain.is_none() {
        return;
    }
    state.pending_resize = Some((*width, *height));
    state.timers.schedule(
        TimerKind::ResizeSettle,
        state.config.rain.resize_debounce(),
        effects,
    );
}

fn on_animation_frame(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    if let Some(rain) = state.rain.as_mut() {
        rain.on_frame(effects);
    }
}

fn on_timer_fired(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    let Event::TimerFired { timer, generation } = event else {
        return;
    };
    if !state.timers.accept(*timer, *generation) {
        trace!(timer = timer.as_str(), generation, "stale timer");
        return;
    }
    match timer {
        TimerKind::ResizeSettle => {
            if let (Some((width, height)), Some(rain)) =
                (state.pending_resize.take(), state.rain.as_mut())
            {
                rain.resize(width, height, effects);
            }
        }
        TimerKind::ScrollSettle => {
            if let Some(rain) = state.rain.as_mut() {
                rain.end_scroll(effects);
            }
        }
        TimerKind::OverlayReveal => state.overlay.reveal(effects),
        TimerKind::OverlayHideFallback => {
            state.overlay.transition_end(&mut state.timers, effects);
        }
        TimerKind::FontFallback => state.fonts.ready(&mut state.timers, effects),
    }
}

fn on_fonts_ready(state: &mut PageState, _: &Event, effects: &mut Vec<Effect>) {
    state.fonts.ready(&mut state.timers, effects);
}

fn on_fonts_failed(state: &mut PageState, event: &Event, effects: &mut Vec<Effect>) {
    if let Event::FontsFailed { reason } = event {
        state.fonts.failed(reason, &mut state.timers, effects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_declaration_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), i);
        }
    }

    #[test]
    fn every_kind_has_a_real_handler() {
        let table = DispatchTable::standard();
        let noop = ignore as Handler;
        for kind in EventKind::ALL {
            assert!(
                !core::ptr::fn_addr_eq(table.handler(kind), noop),
                "{kind:?} is unhandled"
            );
        }
    }

    #[test]
    fn kind_of_matches_variant() {
        assert_eq!(EventKind::of(&Event::SentinelNear), EventKind::SentinelNear);
        assert_eq!(
            EventKind::of(&Event::TileNear { index: 3 }),
            EventKind::TileNear
        );
        assert_eq!(
            EventKind::of(&Event::KeyDown {
                key: "Escape".into()
            }),
            EventKind::KeyDown
        );
    }
}
