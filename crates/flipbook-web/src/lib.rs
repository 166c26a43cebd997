//! Browser binding for the flipbook viewer.
//!
//! Loaded as a wasm module on a page that provides the `#flipbook-root`
//! element (with a `data-pdf` document URL), the two page canvases, the
//! navigation buttons, and the page indicator. pdf.js must already be
//! available as `globalThis.pdfjsLib`.
//!
//! ```js
//! import init, { start } from "/js/flipbook_web.js";
//! await init();
//! start();
//! ```

pub mod browser_loop;
pub mod dom;
pub mod events;
pub mod logger;
pub mod pdfjs;

use browser_loop::BrowserEventLoop;
use dom::DomHost;
use flipbook_core::{FlipbookConfig, FlipbookError, Viewer};
use log::LevelFilter;
use pdfjs::PdfJsSource;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub type WebViewer = Viewer<DomHost, PdfJsSource, BrowserEventLoop>;

/// Entry point called by the page once the module is initialized. Throws
/// when the viewer root or its document reference is missing.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::init(LevelFilter::Info);

    mount().map(|_| ()).map_err(|err| {
        log::error!("flipbook not started: {err}");
        JsValue::from_str(&err.to_string())
    })
}

/// Builds the viewer for the current page, binds its input, and starts
/// loading the document.
pub fn mount() -> Result<Rc<WebViewer>, FlipbookError> {
    let window =
        web_sys::window().ok_or_else(|| FlipbookError::Host("no global window".to_string()))?;
    let host = DomHost::from_window(window.clone())?;

    let config = host.read_config().unwrap_or_else(|err| {
        log::warn!("invalid flipbook configuration, using defaults: {err}");
        FlipbookConfig::default()
    });
    log::set_max_level(config.level_filter());

    let source = PdfJsSource::new(&config.worker_src);
    let viewer = Viewer::new(host, source, BrowserEventLoop::new(window), config);

    events::bind(&viewer).map_err(|err| FlipbookError::Host(pdfjs::js_error_message(&err)))?;
    viewer.spawn_load();

    Ok(viewer)
}
