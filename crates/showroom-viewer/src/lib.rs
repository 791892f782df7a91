//! Showroom Viewer - 3D vehicle viewer
//!
//! Loads a vehicle model from the catalog, frames it automatically whatever
//! its scale, and repaints it live from the catalog's color swatches.
//! Runs natively (see the `showroom` binary) or in the browser.

pub mod app;
pub mod config;
mod ui;

pub use app::{run, ViewerOptions};
pub use config::{load_config, ViewerConfig};

use showroom_core::catalog::is_blank_route;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    let catalog = match config::builtin_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Built-in catalog is invalid: {}", e);
            return;
        }
    };

    let mut config = ViewerConfig::default();
    // Model paths are site-root relative, whatever page hosts the viewer
    config.assets.root = WEB_ASSET_ROOT.to_string();

    let mut options = ViewerOptions::new(config, catalog);
    options.route = page_route();
    app::run(options);
}

/// Asset root in the browser: absolute, so `/cars/3` pages still fetch `/model/...`
pub const WEB_ASSET_ROOT: &str = "/";

/// Route of the hosting page, e.g. `/cars/3`
#[cfg(target_arch = "wasm32")]
fn page_route() -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let href = location.href().ok()?;

    let car = web_sys::Url::new(&href)
        .ok()
        .and_then(|url| url.search_params().get("car"));
    route_for_page(&location.pathname().ok()?, car.as_deref())
}

/// Pick the route for a page: `?car=<id>` wins over the path, and a page
/// without any path segment selects nothing.
pub fn route_for_page(pathname: &str, car: Option<&str>) -> Option<String> {
    if let Some(id) = car.map(str::trim).filter(|id| !id.is_empty()) {
        return Some(format!("/cars/{id}"));
    }
    (!is_blank_route(pathname)).then(|| pathname.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_route_for_page() {
        assert_eq!(route_for_page("/cars/3", None).as_deref(), Some("/cars/3"));
        assert_eq!(route_for_page("/", Some("5")).as_deref(), Some("/cars/5"));
        assert_eq!(route_for_page("/cars/3", Some("5")).as_deref(), Some("/cars/5"));
        assert_eq!(route_for_page("/", None), None);
        assert_eq!(route_for_page("", Some(" ")), None);
    }

    #[test]
    fn test_web_asset_root_is_absolute() {
        // Joined model paths must not resolve against the page URL
        let url = Path::new(WEB_ASSET_ROOT).join("model/XL7.glb");
        assert!(url.has_root());
        assert_eq!(url, Path::new("/model/XL7.glb"));
    }
}
