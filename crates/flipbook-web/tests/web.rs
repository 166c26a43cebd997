#![cfg(target_arch = "wasm32")]

use flipbook_core::{
    DisplaySize, DrawingSurface, EventLoop, FlipbookError, PageSide, PixelSize, ViewerHost,
};
use flipbook_web::browser_loop::BrowserEventLoop;
use flipbook_web::dom::DomHost;
use futures::channel::oneshot;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
<div id="flipbook-root"
     data-pdf="/books/sample.pdf"
     data-config='{"max_book_width": 1200}'
     data-page-fraction="0.45">
  <canvas id="left-canvas"></canvas>
  <canvas id="right-canvas"></canvas>
  <button id="prev-btn">Prev</button>
  <span id="page-indicator"></span>
  <button id="next-btn">Next</button>
</div>
"#;

fn install(markup: &str) -> web_sys::Window {
    let window = web_sys::window().expect("test runs in a browser");
    let body = window.document().and_then(|d| d.body()).expect("document has a body");
    body.set_inner_html(markup);
    window
}

#[wasm_bindgen_test]
fn host_reads_anchors_and_config() {
    let host = DomHost::from_window(install(FIXTURE)).expect("fixture is complete");

    assert_eq!(host.source_ref(), "/books/sample.pdf");
    assert!(host.surface(PageSide::Left).is_some());
    assert!(host.surface(PageSide::Right).is_some());

    let config = host.read_config().expect("fixture config is valid");
    assert_eq!(config.max_book_width, 1200.0);
    assert_eq!(config.page_fraction, 0.45);
    assert_eq!(config.horizontal_padding, 40.0);
}

#[wasm_bindgen_test]
fn missing_root_is_fatal() {
    let result = DomHost::from_window(install("<p>nothing here</p>"));
    assert!(matches!(result, Err(FlipbookError::MissingElement("flipbook-root"))));
}

#[wasm_bindgen_test]
fn missing_source_attribute_is_fatal() {
    let result = DomHost::from_window(install(r#"<div id="flipbook-root"></div>"#));
    assert!(matches!(result, Err(FlipbookError::MissingAttribute("data-pdf"))));
}

#[wasm_bindgen_test]
fn indicator_and_load_error_update_the_page() {
    let window = install(FIXTURE);
    let host = DomHost::from_window(window.clone()).expect("fixture is complete");
    let document = window.document().expect("document");

    host.set_indicator_text("1-2 / 10");
    let indicator = document.get_element_by_id("page-indicator").expect("indicator");
    assert_eq!(indicator.text_content().as_deref(), Some("1-2 / 10"));

    host.show_load_error("Failed to load flipbook PDF.");
    let root = document.get_element_by_id("flipbook-root").expect("root");
    assert_eq!(root.inner_html(), "<p>Failed to load flipbook PDF.</p>");
}

#[wasm_bindgen_test]
fn canvas_resize_sets_backing_and_css_size() {
    let window = install(FIXTURE);
    let host = DomHost::from_window(window.clone()).expect("fixture is complete");
    let surface = host.surface(PageSide::Left).expect("left canvas");

    let backing = PixelSize {
        width: 864,
        height: 1152,
    };
    let display = DisplaySize {
        width: 432.0,
        height: 576.0,
    };
    surface.resize(backing, display, 2.0);

    let canvas = window
        .document()
        .and_then(|d| d.get_element_by_id("left-canvas"))
        .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        .expect("left canvas");
    assert_eq!((canvas.width(), canvas.height()), (864, 1152));
    assert_eq!(canvas.style().get_property_value("width").ok().as_deref(), Some("432px"));
    assert_eq!(canvas.style().get_property_value("height").ok().as_deref(), Some("576px"));

    surface.clear();
    assert_eq!((canvas.width(), canvas.height()), (864, 1152));
}

#[wasm_bindgen_test]
async fn scheduled_task_fires_and_cancelled_task_does_not() {
    let window = web_sys::window().expect("window");
    let event_loop = BrowserEventLoop::new(window);

    let cancelled_ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&cancelled_ran);
    let cancelled = event_loop.schedule(
        Duration::from_millis(5),
        Box::new(move || flag.set(true)),
    );
    event_loop.cancel(cancelled);

    let (tx, rx) = oneshot::channel();
    event_loop.schedule(
        Duration::from_millis(20),
        Box::new(move || {
            let _ = tx.send(());
        }),
    );

    rx.await.expect("timer should fire");
    assert!(!cancelled_ran.get());
    assert_eq!(event_loop.pending_timers(), 0);
}
