#![forbid(unsafe_code)]

//! DOM construction for tiles, embedded frames, and the rain canvas.
//!
//! Everything here is a thin translation of core view types into elements;
//! no decisions are made in this module.

use mosaic_core::{EmbedSpec, RainFrame, TileContent, TileState, TileView};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlIFrameElement,
};

pub const INDEX_ATTR: &str = "data-art-index";
pub const PLACEHOLDER_CLASS: &str = "placeholder";
pub const TEXT_OVERLAY_CLASS: &str = "text-overlay";
pub const CLICK_OVERLAY_CLASS: &str = "click-overlay";
pub const SENTINEL_CLASS: &str = "gallery-sentinel";
pub const FRAME_LOADING_CLASS: &str = "loading";
pub const FRAME_LOADED_CLASS: &str = "loaded";
pub const FRAME_FAILED_CLASS: &str = "failed";

pub type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Attach `handler` to `target` for `kind` and return the closure that must
/// be kept alive for as long as the listener is registered.
pub fn bind(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<Listener, JsValue> {
    let closure = Listener::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(JsValue::from)
}

fn div(document: &Document, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
    let el = document.create_element("div")?;
    el.class_list().add_1(class)?;
    if let Some(text) = text {
        el.set_text_content(Some(text));
    }
    Ok(el)
}

/// An embedded document for one tile, lazily loaded and sandboxed.
pub fn build_frame(document: &Document, spec: &EmbedSpec) -> Result<HtmlIFrameElement, JsValue> {
    let frame: HtmlIFrameElement = create(document, "iframe")?;
    frame.set_src(&spec.src);
    frame.set_title(&spec.title);
    frame.set_attribute("sandbox", &spec.sandbox)?;
    if spec.lazy {
        frame.set_attribute("loading", "lazy")?;
    }
    frame.class_list().add_1(FRAME_LOADING_CLASS)?;
    Ok(frame)
}

pub fn set_content_state(frame: &HtmlIFrameElement, state: TileState) -> Result<(), JsValue> {
    let classes = frame.class_list();
    classes.remove_1(FRAME_LOADING_CLASS)?;
    match state {
        TileState::Loaded => classes.add_1(FRAME_LOADED_CLASS),
        TileState::Failed => classes.add_1(FRAME_FAILED_CLASS),
        TileState::Placeholder | TileState::Loading => Ok(()),
    }
}

/// Elements for one gallery cell, plus the listeners bound to them.
pub struct TileNode {
    pub element: HtmlElement,
    pub placeholder: Option<Element>,
    pub text_overlay: Element,
    pub click_overlay: Element,
    pub frame: Option<HtmlIFrameElement>,
    pub listeners: Vec<Listener>,
}

impl TileNode {
    pub fn build(document: &Document, view: &TileView) -> Result<Self, JsValue> {
        let element: HtmlElement = create(document, "div")?;
        for class in &view.classes {
            element.class_list().add_1(class)?;
        }
        element.set_attribute(INDEX_ATTR, &view.index.to_string())?;
        element.style().set_property(
            "--animation-delay",
            &format!("{}ms", view.stagger_delay.as_millis()),
        )?;

        let (placeholder, frame) = match &view.content {
            TileContent::Placeholder => {
                let placeholder = div(document, PLACEHOLDER_CLASS, Some(&view.label))?;
                element.append_child(&placeholder)?;
                (Some(placeholder), None)
            }
            TileContent::Embedded(spec) => {
                let frame = build_frame(document, spec)?;
                element.append_child(&frame)?;
                (None, Some(frame))
            }
        };

        let text_overlay = div(document, TEXT_OVERLAY_CLASS, Some(&view.label))?;
        let click_overlay = div(document, CLICK_OVERLAY_CLASS, None)?;
        element.append_child(&text_overlay)?;
        element.append_child(&click_overlay)?;

        Ok(Self {
            element,
            placeholder,
            text_overlay,
            click_overlay,
            frame,
            listeners: Vec::new(),
        })
    }

    /// Swap the placeholder for `frame`, keeping it under the overlays.
    pub fn embed(
        &mut self,
        frame: HtmlIFrameElement,
        listeners: Vec<Listener>,
    ) -> Result<(), JsValue> {
        if let Some(placeholder) = self.placeholder.take() {
            placeholder.remove();
        }
        self.element
            .insert_before(&frame, Some(&self.text_overlay))?;
        self.frame = Some(frame);
        self.listeners.extend(listeners);
        Ok(())
    }

    /// Take the cell out of the document, then release its listeners.
    pub fn remove(mut self) {
        self.element.remove();
        self.listeners.clear();
    }
}

/// Canvas plus its 2D context.
pub struct Painter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Painter {
    pub fn attach(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        Ok(Self { canvas, ctx })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    pub fn paint(&self, frame: &RainFrame) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(&frame.fade);
        self.ctx
            .fill_rect(0.0, 0.0, f64::from(frame.width), f64::from(frame.height));
        self.ctx.set_fill_style_str(&frame.text);
        self.ctx.set_font(&frame.font);
        let mut glyph = [0u8; 4];
        for g in &frame.glyphs {
            self.ctx.fill_text(g.ch.encode_utf8(&mut glyph), g.x, g.y)?;
        }
        Ok(())
    }
}
