/// memory.lol browser tools - search front-end and profile-page extension
/// Built with Rust + WASM + Yew

pub mod api;
pub mod config;
mod content;
pub mod error;
pub mod history;
pub mod locator;
pub mod model;
pub mod protocol;
pub mod relay;
pub mod ui;
pub mod watcher;

use api::ApiClient;
use config::Config;
use wasm_bindgen::prelude::*;

// Set up panic hook and logging for every entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(Config::from_build_env().log_level));
}

// Start the Yew app for the search page
#[wasm_bindgen]
pub fn start_app() {
    yew::Renderer::<ui::app::App>::new().render();
}

// Start the lookup relay in the extension's background worker
#[wasm_bindgen]
pub fn start_background() {
    relay::start_background(ApiClient::new(&Config::from_build_env().api_base));
}

// Start the profile watcher in the content script
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    let config = Config::from_build_env();

    content::start(&config)
        .and_then(|_| content::install_lifecycle(config))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn stop_content_script() {
    content::stop();
}
