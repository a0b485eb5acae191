#![forbid(unsafe_code)]

//! Browser host for a [`Page`].
//!
//! The host owns every DOM handle and every JS callback. Browser callbacks
//! translate into core [`Event`]s; the returned [`Effect`]s are applied in
//! order. Callbacks hold a `Weak` reference to the host, so dropping the
//! exported [`GalleryPage`] tears everything down.
//!
//! # Re-entrancy
//!
//! Applying an effect can synchronously trigger another browser callback
//! (for example observing an element that is already visible in some
//! engines). Events are queued and drained by whichever call got there
//! first, so the page is never borrowed twice.
//!
//! # Timers
//!
//! Each scheduled timer gets a one-shot callback carrying its generation.
//! Cancelled timers are left to fire; the core rejects the stale generation
//! and the callback frees itself when it runs.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use mosaic_core::fonts::FONTS_LOADING_CLASS;
use mosaic_core::overlay::OVERLAY_VISIBLE_CLASS;
use mosaic_core::theme::LIGHT_MODE_CLASS;
use mosaic_core::{Effect, Event, GalleryConfig, Page, PreferenceStore, Theme, TileRect};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlIFrameElement, HtmlInputElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, Window,
};
use web_time::Instant;

use crate::dom::{self, Listener, Painter, TileNode};
use crate::logging::{self, ConsoleLevel, ConsoleSink};
use crate::storage::{LocalStore, describe};
use crate::sweep::SweepGate;

const CONTAINER_ID: &str = "gallery-container";
const OVERLAY_ID: &str = "fullscreen-container";
const OVERLAY_FRAME_ID: &str = "fullscreen-iframe";
const CLOSE_ID: &str = "close-fullscreen";
const CHECKBOX_ID: &str = "theme-checkbox";
const CANVAS_ID: &str = "matrix-canvas";

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct BrowserConsole;

impl ConsoleSink for BrowserConsole {
    fn emit(&self, level: ConsoleLevel, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            ConsoleLevel::Error => web_sys::console::error_1(&line),
            ConsoleLevel::Warn => web_sys::console::warn_1(&line),
            ConsoleLevel::Log => web_sys::console::log_1(&line),
            ConsoleLevel::Debug => web_sys::console::debug_1(&line),
        }
    }
}

fn require<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing required element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

fn parse_options(options: Option<JsValue>) -> Result<GalleryConfig, JsValue> {
    let Some(options) = options.filter(|v| !v.is_undefined() && !v.is_null()) else {
        return Ok(GalleryConfig::default());
    };
    let json: String = js_sys::JSON::stringify(&options)?.into();
    GalleryConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// Handles resolved once at startup.
struct Elements {
    body: HtmlElement,
    container: Element,
    sentinel: Element,
    overlay: HtmlElement,
    overlay_frame: HtmlIFrameElement,
    close_button: Element,
    checkbox: HtmlInputElement,
    painter: Option<Painter>,
}

impl Elements {
    fn resolve(document: &Document) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        let container: Element = require(document, CONTAINER_ID)?;
        let overlay: HtmlElement = require(document, OVERLAY_ID)?;
        let overlay_frame: HtmlIFrameElement = require(document, OVERLAY_FRAME_ID)?;
        let close_button: Element = require(document, CLOSE_ID)?;
        let checkbox: HtmlInputElement = require(document, CHECKBOX_ID)?;

        // The rain is decorative; a missing or unusable canvas only disables it.
        let painter = match require::<HtmlCanvasElement>(document, CANVAS_ID) {
            Ok(canvas) => match Painter::attach(canvas) {
                Ok(painter) => Some(painter),
                Err(err) => {
                    warn!(error = %describe(&err), "rain canvas unusable; animation disabled");
                    None
                }
            },
            Err(_) => {
                debug!("no rain canvas; animation disabled");
                None
            }
        };

        let sentinel = document.create_element("div")?;
        sentinel.class_list().add_1(dom::SENTINEL_CLASS)?;

        Ok(Self {
            body,
            container,
            sentinel,
            overlay,
            overlay_frame,
            close_button,
            checkbox,
            painter,
        })
    }
}

struct Binding {
    target: EventTarget,
    kind: &'static str,
    closure: Listener,
}

struct Host {
    weak: Weak<Host>,
    page: RefCell<Page>,
    queue: RefCell<VecDeque<Event>>,
    draining: Cell<bool>,
    window: Window,
    document: Document,
    el: Elements,
    store: LocalStore,
    tiles: RefCell<BTreeMap<u32, TileNode>>,
    tile_observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
    sentinel_observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
    bindings: RefCell<Vec<Binding>>,
    frame_callback: RefCell<Option<Closure<dyn FnMut()>>>,
    frame_handle: Cell<Option<i32>>,
    sweep: SweepGate,
    sweep_callback: RefCell<Option<Closure<dyn FnMut()>>>,
    sweep_handle: Cell<Option<i32>>,
}

impl Host {
    fn mount(config: GalleryConfig) -> Result<Rc<Self>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let el = Elements::resolve(&document)?;
        el.body.class_list().add_1(FONTS_LOADING_CLASS)?;
        let page = Page::new(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let store = LocalStore::open(&window);

        let host = Rc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            page: RefCell::new(page),
            queue: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            window,
            document,
            el,
            store,
            tiles: RefCell::new(BTreeMap::new()),
            tile_observer: RefCell::new(None),
            sentinel_observer: RefCell::new(None),
            bindings: RefCell::new(Vec::new()),
            frame_callback: RefCell::new(None),
            frame_handle: Cell::new(None),
            sweep: SweepGate::new(),
            sweep_callback: RefCell::new(None),
            sweep_handle: Cell::new(None),
        });
        host.install_observers()?;
        host.install_listeners()?;
        host.install_frame_callback();
        Ok(host)
    }

    // -- Dispatch ----------------------------------------------------------

    fn dispatch(&self, event: Event) {
        self.queue.borrow_mut().push_back(event);
        if self.draining.replace(true) {
            return;
        }
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            let effects = self.page.borrow_mut().dispatch(event);
            for effect in effects {
                if let Err(err) = self.apply(effect) {
                    error!(error = %describe(&err), "failed to apply effect");
                }
            }
        }
        self.draining.set(false);
    }

    fn apply(&self, effect: Effect) -> Result<(), JsValue> {
        match effect {
            Effect::AppendTile(view) => {
                let mut node = TileNode::build(&self.document, &view)?;
                node.listeners.push(self.click_listener(view.index, &node.click_overlay)?);
                if let Some(frame) = node.frame.as_ref() {
                    let listeners = self.frame_listeners(view.index, frame)?;
                    node.listeners.extend(listeners);
                }
                self.el.container.append_child(&node.element)?;
                if let Some(old) = self.tiles.borrow_mut().insert(view.index, node) {
                    warn!(index = view.index, "tile element replaced");
                    old.remove();
                }
            }
            Effect::MoveSentinelToEnd => {
                self.el.container.append_child(&self.el.sentinel)?;
            }
            Effect::ObserveSentinel => {
                if let Some((observer, _)) = self.sentinel_observer.borrow().as_ref() {
                    observer.observe(&self.el.sentinel);
                }
            }
            Effect::UnobserveSentinel => {
                if let Some((observer, _)) = self.sentinel_observer.borrow().as_ref() {
                    observer.unobserve(&self.el.sentinel);
                }
            }
            Effect::ObserveTile(index) => self.with_tile_observer(index, |obs, el| obs.observe(el)),
            Effect::UnobserveTile(index) => {
                self.with_tile_observer(index, |obs, el| obs.unobserve(el));
            }
            Effect::EmbedContent(spec) => {
                let frame = dom::build_frame(&self.document, &spec)?;
                let listeners = self.frame_listeners(spec.index, &frame)?;
                match self.tiles.borrow_mut().get_mut(&spec.index) {
                    Some(node) => node.embed(frame, listeners)?,
                    None => warn!(index = spec.index, "embed for unknown tile"),
                }
                debug!(index = spec.index, src = %spec.src, "embedding content");
            }
            Effect::SetContentState { index, state } => {
                if let Some(frame) = self.tiles.borrow().get(&index).and_then(|n| n.frame.as_ref())
                {
                    dom::set_content_state(frame, state)?;
                }
            }
            Effect::SetLightMode(on) => {
                self.el
                    .body
                    .class_list()
                    .toggle_with_force(LIGHT_MODE_CLASS, on)?;
            }
            Effect::SetThemeCheckbox(checked) => self.el.checkbox.set_checked(checked),
            Effect::PersistPreference { key, value } => {
                if let Err(err) = value.persist(&self.store, &key) {
                    warn!(store = self.store.name(), %err, "could not persist theme");
                }
            }
            Effect::SetOverlaySource(src) => {
                self.el.overlay_frame.set_src(src.as_deref().unwrap_or(""));
            }
            Effect::SetOverlayDisplayed(shown) => {
                let style = self.el.overlay.style();
                if shown {
                    style.set_property("display", "flex")?;
                } else {
                    style.set_property("display", "none")?;
                }
            }
            Effect::SetOverlayVisible(visible) => {
                self.el
                    .overlay
                    .class_list()
                    .toggle_with_force(OVERLAY_VISIBLE_CLASS, visible)?;
            }
            Effect::SetScrollLocked(locked) => {
                let style = self.el.body.style();
                if locked {
                    style.set_property("overflow", "hidden")?;
                } else {
                    style.remove_property("overflow")?;
                }
            }
            Effect::ScheduleTimer {
                timer,
                generation,
                delay,
            } => {
                let weak = self.weak.clone();
                let callback = Closure::once_into_js(move || {
                    if let Some(host) = weak.upgrade() {
                        host.dispatch(Event::TimerFired { timer, generation });
                    }
                });
                let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
                self.window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.unchecked_ref(),
                        ms,
                    )?;
            }
            Effect::CancelTimer(timer) => {
                trace!(timer = timer.as_str(), "timer superseded");
            }
            Effect::ResizeSurface { width, height } => {
                if let Some(painter) = self.el.painter.as_ref() {
                    painter.resize(width, height);
                }
            }
            Effect::RequestAnimationFrame => self.request_frame()?,
            Effect::CancelAnimationFrame => {
                if let Some(handle) = self.frame_handle.take() {
                    self.window.cancel_animation_frame(handle)?;
                }
            }
            Effect::PaintRain(frame) => {
                if let Some(painter) = self.el.painter.as_ref() {
                    painter.paint(&frame)?;
                }
            }
            Effect::SetFontsLoading(loading) => {
                self.el
                    .body
                    .class_list()
                    .toggle_with_force(FONTS_LOADING_CLASS, loading)?;
            }
        }
        Ok(())
    }

    fn with_tile_observer(&self, index: u32, f: impl FnOnce(&IntersectionObserver, &Element)) {
        let observer = self.tile_observer.borrow();
        let tiles = self.tiles.borrow();
        if let (Some((observer, _)), Some(node)) = (observer.as_ref(), tiles.get(&index)) {
            f(observer, &node.element);
        }
    }

    // -- Wiring ------------------------------------------------------------

    fn observer_init(config: &GalleryConfig) -> IntersectionObserverInit {
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&config.root_margin());
        init.set_threshold(&JsValue::from_f64(config.threshold));
        init
    }

    fn install_observers(&self) -> Result<(), JsValue> {
        let init = Self::observer_init(self.page.borrow().state().config());

        let weak = self.weak.clone();
        let on_tiles = ObserverCallback::new(move |entries: js_sys::Array, _: IntersectionObserver| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let index = entry
                    .target()
                    .get_attribute(dom::INDEX_ATTR)
                    .and_then(|raw| raw.parse::<u32>().ok());
                match index {
                    Some(index) => host.dispatch(Event::TileNear { index }),
                    None => warn!("observed element without a tile index"),
                }
            }
        });
        let tiles = IntersectionObserver::new_with_options(on_tiles.as_ref().unchecked_ref(), &init)?;
        *self.tile_observer.borrow_mut() = Some((tiles, on_tiles));

        let weak = self.weak.clone();
        let on_sentinel = ObserverCallback::new(move |entries: js_sys::Array, _: IntersectionObserver| {
            let near = entries.iter().any(|entry| {
                entry
                    .dyn_into::<IntersectionObserverEntry>()
                    .is_ok_and(|e| e.is_intersecting())
            });
            if let (true, Some(host)) = (near, weak.upgrade()) {
                host.dispatch(Event::SentinelNear);
            }
        });
        let sentinel =
            IntersectionObserver::new_with_options(on_sentinel.as_ref().unchecked_ref(), &init)?;
        *self.sentinel_observer.borrow_mut() = Some((sentinel, on_sentinel));
        Ok(())
    }

    fn listen(
        &self,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Listener::new(handler);
        if passive {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
        } else {
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        }
        self.bindings.borrow_mut().push(Binding {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    fn install_listeners(&self) -> Result<(), JsValue> {
        let window: &EventTarget = self.window.as_ref();
        let document: &EventTarget = self.document.as_ref();

        let weak = self.weak.clone();
        self.listen(window, "scroll", true, move |_| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::Scroll);
                host.schedule_sweep();
            }
        })?;

        let weak = self.weak.clone();
        self.listen(window, "resize", true, move |_| {
            if let Some(host) = weak.upgrade() {
                let width = dimension(host.window.inner_width()) as u32;
                let height = dimension(host.window.inner_height()) as u32;
                host.dispatch(Event::Resize { width, height });
            }
        })?;

        let weak = self.weak.clone();
        self.listen(document, "visibilitychange", false, move |_| {
            if let Some(host) = weak.upgrade() {
                let hidden = host.document.hidden();
                host.dispatch(Event::VisibilityChanged { hidden });
            }
        })?;

        let weak = self.weak.clone();
        self.listen(document, "keydown", false, move |ev| {
            let (Some(host), Some(key)) = (
                weak.upgrade(),
                ev.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key),
            ) else {
                return;
            };
            host.dispatch(Event::KeyDown { key });
        })?;

        let weak = self.weak.clone();
        self.listen(self.el.overlay.as_ref(), "transitionend", false, move |ev| {
            // Transitions of children bubble up; only the container's own count.
            if ev.target() != ev.current_target() {
                return;
            }
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::OverlayTransitionEnd);
            }
        })?;

        let weak = self.weak.clone();
        self.listen(self.el.checkbox.as_ref(), "change", false, move |_| {
            if let Some(host) = weak.upgrade() {
                let checked = host.el.checkbox.checked();
                host.dispatch(Event::ThemeToggled { checked });
            }
        })?;

        let weak = self.weak.clone();
        self.listen(self.el.close_button.as_ref(), "click", false, move |_| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::CloseRequested);
            }
        })?;
        Ok(())
    }

    fn click_listener(&self, index: u32, target: &Element) -> Result<Listener, JsValue> {
        let weak = self.weak.clone();
        dom::bind(target.as_ref(), "click", move |_| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::TileClicked { index });
            }
        })
    }

    fn frame_listeners(
        &self,
        index: u32,
        frame: &HtmlIFrameElement,
    ) -> Result<Vec<Listener>, JsValue> {
        let weak = self.weak.clone();
        let loaded = dom::bind(frame.as_ref(), "load", move |_| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::ContentLoaded { index });
            }
        })?;
        let weak = self.weak.clone();
        let failed = dom::bind(frame.as_ref(), "error", move |_| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(Event::ContentFailed { index });
            }
        })?;
        Ok(vec![loaded, failed])
    }

    fn install_frame_callback(&self) {
        let weak = self.weak.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(host) = weak.upgrade() {
                host.frame_handle.set(None);
                host.dispatch(Event::AnimationFrame);
            }
        });
        *self.frame_callback.borrow_mut() = Some(callback);

        let weak = self.weak.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(host) = weak.upgrade() {
                host.sweep_handle.set(None);
                if host.sweep.take() {
                    let geometry = host.pending_geometry();
                    host.dispatch(geometry);
                }
            }
        });
        *self.sweep_callback.borrow_mut() = Some(callback);
    }

    fn request_frame(&self) -> Result<(), JsValue> {
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let handle = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.frame_handle.set(Some(handle));
        Ok(())
    }

    /// Sample pending tile geometry on the next frame, once per frame.
    fn schedule_sweep(&self) {
        if !self.sweep.request() {
            return;
        }
        let callback = self.sweep_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            self.sweep.take();
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => self.sweep_handle.set(Some(handle)),
            Err(err) => {
                self.sweep.take();
                warn!(error = %describe(&err), "could not schedule geometry sweep");
            }
        }
    }

    /// Bounding boxes of tiles that are still placeholders.
    fn pending_geometry(&self) -> Event {
        let pending: Vec<u32> = self.page.borrow().state().loader().pending().collect();
        let tiles = self.tiles.borrow();
        let rects = pending
            .into_iter()
            .filter_map(|index| {
                let rect = tiles.get(&index)?.element.get_bounding_client_rect();
                Some(TileRect::new(index, rect.top(), rect.bottom()))
            })
            .collect();
        Event::ScrollGeometry {
            viewport_height: dimension(self.window.inner_height()),
            tiles: rects,
        }
    }

    // -- Lifecycle ---------------------------------------------------------

    fn boot(&self) {
        let key = self.page.borrow().state().config().preference_key.clone();
        let theme = Theme::restore(&self.store, &key);

        let font_signal = match self.document.fonts().ready() {
            Ok(promise) => {
                let weak = self.weak.clone();
                spawn_local(async move {
                    let outcome = JsFuture::from(promise).await;
                    if let Some(host) = weak.upgrade() {
                        match outcome {
                            Ok(_) => host.dispatch(Event::FontsReady),
                            Err(err) => host.dispatch(Event::FontsFailed {
                                reason: describe(&err),
                            }),
                        }
                    }
                });
                true
            }
            Err(_) => false,
        };

        self.dispatch(Event::Boot {
            theme,
            viewport_width: dimension(self.window.inner_width()) as u32,
            viewport_height: dimension(self.window.inner_height()) as u32,
            animation_surface: self.el.painter.is_some(),
            font_signal,
        });
    }

    fn teardown(&self) {
        for binding in self.bindings.borrow_mut().drain(..) {
            let _ = binding.target.remove_event_listener_with_callback(
                binding.kind,
                binding.closure.as_ref().unchecked_ref(),
            );
        }
        for slot in [&self.tile_observer, &self.sentinel_observer] {
            if let Some((observer, _)) = slot.borrow_mut().take() {
                observer.disconnect();
            }
        }
        if let Some(handle) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        self.frame_callback.borrow_mut().take();
        if let Some(handle) = self.sweep_handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        self.sweep.take();
        self.sweep_callback.borrow_mut().take();
        let tiles = std::mem::take(&mut *self.tiles.borrow_mut());
        for node in tiles.into_values() {
            node.remove();
        }
        self.el.sentinel.remove();
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mosaic gallery mounted on the current document.
///
/// Construct once the DOM is ready. `options` is an optional plain object
/// whose fields override the defaults of the gallery configuration.
#[wasm_bindgen]
pub struct GalleryPage {
    host: Option<Rc<Host>>,
}

#[wasm_bindgen]
impl GalleryPage {
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<GalleryPage, JsValue> {
        logging::try_init(BrowserConsole, LevelFilter::INFO);
        let started = Instant::now();
        let host = parse_options(options)
            .and_then(Host::mount)
            .inspect_err(|err| error!(error = %describe(err), "gallery failed to start"))?;
        host.boot();
        info!(
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "gallery mounted"
        );
        Ok(Self { host: Some(host) })
    }

    /// Tiles created so far.
    #[wasm_bindgen(js_name = tileCount)]
    pub fn tile_count(&self) -> u32 {
        self.host
            .as_ref()
            .map_or(0, |host| host.page.borrow().state().scheduler().last_released())
    }

    /// Remove listeners, observers, and tiles. The page is unusable afterwards.
    pub fn destroy(&mut self) {
        self.host = None;
    }
}
