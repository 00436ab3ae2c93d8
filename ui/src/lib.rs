//! Browser front end for the option strategy form.
//!
//! The pure pieces (render tree, controller, submit handling, configuration, theme)
//! build and test natively; the DOM glue is compiled for `wasm32` only.

pub mod config;
pub mod form;
pub mod render;
pub mod state;
pub mod telemetry;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod chart;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod legs;
#[cfg(target_arch = "wasm32")]
pub mod page;

pub use config::{ElementIds, PageConfig};
pub use form::{handle_submit, FormFields, SubmitVerdict};
pub use render::{render_legs, Binding, Node};
pub use state::{LegController, RenderAction, SharedStore, UiEvent};
pub use theme::ThemePalette;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    page::bootstrap()
}

/// Re-request the payoff curve. The request carries the page's own query string; the
/// domain inputs only need to be filled in.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn refresh_chart() -> Result<(), JsValue> {
    page::with_page(|page| page.refresh_chart())
}

/// Set one leg field by wire name (`type`, `side`, `K`, `price`, `Q`).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_leg_field(index: usize, field: &str, value: &str) -> Result<(), JsValue> {
    page::with_page(|page| page.set_leg_field(index, field, value))?
}

/// Rebuild the leg cards, e.g. after a theme switch.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn rerender_legs() -> Result<(), JsValue> {
    page::with_page(|page| page.rerender_legs())?
}

/// The legs as they would be submitted right now.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn legs_json() -> Result<String, JsValue> {
    page::with_page(|page| page.legs_json())?
}
