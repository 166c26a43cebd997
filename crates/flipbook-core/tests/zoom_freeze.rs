use flipbook_core::testing::{FakeDocument, FakeHost, FakeSource, ManualEventLoop, SurfaceEvent};
use flipbook_core::{FlipbookConfig, Viewer};
use futures::executor::block_on;
use std::rc::Rc;
use std::time::Duration;

type TestViewer = Viewer<FakeHost, FakeSource, ManualEventLoop>;

const QUIET: Duration = Duration::from_millis(250);

fn loaded_viewer(document: &FakeDocument) -> Rc<TestViewer> {
    let viewer = Viewer::new(
        FakeHost::new("/books/sample.pdf", 1000.0),
        FakeSource::with_document(document.clone()),
        ManualEventLoop::new(),
        FlipbookConfig::default(),
    );
    block_on(viewer.load()).expect("document should load");
    viewer
}

fn last_display_width(viewer: &TestViewer) -> f64 {
    viewer
        .host()
        .left_surface()
        .events()
        .iter()
        .rev()
        .find_map(|event| match event {
            SurfaceEvent::Resized { display, .. } => Some(display.width),
            _ => None,
        })
        .expect("left surface should have been resized")
}

#[test]
fn viewport_signal_freezes_width() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);
    let frozen = viewer.container_width();

    viewer.on_viewport_metrics_change();
    assert!(viewer.is_frozen());

    viewer.host().set_viewport_width(500.0);
    assert_eq!(viewer.container_width(), frozen);
}

#[test]
fn window_resize_is_suppressed_while_frozen() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);
    let fetches = document.fetched_pages().len();

    viewer.on_viewport_metrics_change();
    viewer.host().set_viewport_width(500.0);
    viewer.on_window_resize();
    viewer.event_loop().run_until_stalled();

    assert_eq!(document.fetched_pages().len(), fetches);
    assert!((last_display_width(&viewer) - 432.0).abs() < 1e-9);
}

#[test]
fn navigation_during_freeze_uses_frozen_width() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);

    viewer.on_viewport_metrics_change();
    viewer.host().set_viewport_width(500.0);
    assert!(block_on(viewer.go_next()));

    assert!((last_display_width(&viewer) - 432.0).abs() < 1e-9);
}

#[test]
fn quiet_period_thaws_and_rerenders_once_at_live_width() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);
    let writes = viewer.host().indicator_writes();

    viewer.on_viewport_metrics_change();
    viewer.host().set_viewport_width(500.0);
    viewer.on_window_resize();

    viewer.event_loop().advance(QUIET - Duration::from_millis(1));
    assert!(viewer.is_frozen());
    assert_eq!(viewer.host().indicator_writes(), writes);

    viewer.event_loop().advance(Duration::from_millis(1));
    assert!(!viewer.is_frozen());
    assert_eq!(viewer.host().indicator_writes(), writes + 1);
    assert!((last_display_width(&viewer) - 460.0 * 0.48).abs() < 1e-9);
    assert_eq!(viewer.event_loop().pending_timers(), 0);
}

#[test]
fn each_signal_restarts_quiet_period_without_recapturing() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);
    let step = Duration::from_millis(200);

    viewer.on_viewport_metrics_change();
    let frozen = viewer.container_width();

    for width in [900.0, 700.0, 500.0] {
        viewer.event_loop().advance(step);
        viewer.host().set_viewport_width(width);
        viewer.on_viewport_metrics_change();
        assert!(viewer.is_frozen());
        assert_eq!(viewer.container_width(), frozen);
        assert_eq!(viewer.event_loop().pending_timers(), 1);
    }

    let writes = viewer.host().indicator_writes();
    viewer.event_loop().advance(QUIET);

    assert!(!viewer.is_frozen());
    assert_eq!(viewer.host().indicator_writes(), writes + 1);
    assert!((viewer.container_width() - 460.0 * 0.48).abs() < 1e-9);
}

#[test]
fn viewport_scroll_changes_nothing() {
    let document = FakeDocument::uniform(10, 600.0, 800.0);
    let viewer = loaded_viewer(&document);

    viewer.on_viewport_scroll();
    viewer.event_loop().advance(QUIET * 4);

    assert!(!viewer.is_frozen());
    assert_eq!(viewer.event_loop().pending_timers(), 0);
    assert_eq!(viewer.host().indicator_writes(), 1);
}

#[test]
fn configured_quiet_period_is_honored() {
    let document = FakeDocument::uniform(4, 600.0, 800.0);
    let viewer = Viewer::new(
        FakeHost::new("/books/sample.pdf", 1000.0),
        FakeSource::with_document(document),
        ManualEventLoop::new(),
        FlipbookConfig::default().with_zoom_quiet_period(Duration::from_millis(600)),
    );
    block_on(viewer.load()).expect("document should load");

    viewer.on_viewport_metrics_change();
    viewer.event_loop().advance(QUIET);
    assert!(viewer.is_frozen());

    viewer.event_loop().advance(Duration::from_millis(350));
    assert!(!viewer.is_frozen());
}
