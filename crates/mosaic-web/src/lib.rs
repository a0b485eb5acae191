#![forbid(unsafe_code)]

//! WASM frontend for the mosaic gallery.
//!
//! This crate is host-specific (web/WASM). It binds a `mosaic_core::Page` to
//! the live document:
//! - resolves the page's required elements and aborts startup if one is
//!   missing,
//! - turns intersection observers, listeners, timers, and animation frames
//!   into core events,
//! - applies the core's effects to the DOM, `localStorage`, and the rain
//!   canvas.
//!
//! The [`logging`] bridge and the [`sweep`] gate are target-independent so
//! they can be tested natively.

pub mod logging;
pub mod sweep;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::GalleryPage;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct GalleryPage;

#[cfg(not(target_arch = "wasm32"))]
impl GalleryPage {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }

    pub fn tile_count(&self) -> u32 {
        0
    }

    pub fn destroy(&mut self) {}
}
