//! SCUHA portal core crate.
//!
//! Catalog browsing, the game focus page and user settings for a static
//! casual-games site. Domain logic lives in plain modules that build and test
//! natively; `web` wires them to the DOM and is only compiled for wasm32.
//! Each HTML page calls exactly one of the exported `start_*` entry points.

use wasm_bindgen::prelude::*;

pub mod cards;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod fullscreen;
pub mod launch;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod storage;
pub mod tracker;

#[cfg(target_arch = "wasm32")]
mod web;

pub use catalog::{Catalog, CatalogView, GameDescriptor};
pub use config::PortalConfig;
pub use error::PortalError;
pub use session::SessionController;
pub use settings::{Settings, SettingsController};
pub use storage::{KeyValueStore, MemoryStore};
pub use tracker::Tracker;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

/// Catalog page (`projects.html`).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_catalog_page() -> Result<(), JsValue> {
    web::catalog_page::start(PortalConfig::default()).map_err(Into::into)
}

/// Game focus page (`focus.html?game=..&src=..&title=..`).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_focus_page() -> Result<(), JsValue> {
    web::focus_page::start(PortalConfig::default()).map_err(Into::into)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_settings_page() -> Result<(), JsValue> {
    web::settings_page::start(PortalConfig::default()).map_err(Into::into)
}

/// Landing page: theme and animation classes only.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn apply_saved_preferences() -> Result<(), JsValue> {
    web::settings_page::apply_saved(&PortalConfig::default()).map_err(Into::into)
}
