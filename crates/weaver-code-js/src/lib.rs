//! WASM bindings for the weaver code editor.
//!
//! Exposes `createEditor`, the `TextDocument` value type and JS-function
//! input processors to JavaScript/TypeScript apps.

mod editor;
mod processors;
mod types;

pub use editor::*;
pub use processors::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // Another module on the page may already have installed one.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
