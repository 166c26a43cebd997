//! Two-page flipbook viewer core.
//!
//! Loads a paginated document through an external renderer and shows two
//! consecutive pages side by side as an open book. This crate holds all of
//! the viewer logic; the page it runs in is reached only through the traits
//! in [`host`], [`document`], and [`event_loop`], so the same code drives a
//! browser (see the `flipbook-web` crate) or the in-memory fakes used by the
//! tests.
//!
//! # Example
//!
//! ```
//! use flipbook_core::testing::{FakeDocument, FakeHost, FakeSource, ManualEventLoop};
//! use flipbook_core::{FlipbookConfig, Viewer};
//! use futures::executor::block_on;
//!
//! let document = FakeDocument::uniform(10, 612.0, 792.0);
//! let viewer = Viewer::new(
//!     FakeHost::new("/books/manual.pdf", 1280.0),
//!     FakeSource::with_document(document),
//!     ManualEventLoop::new(),
//!     FlipbookConfig::default(),
//! );
//!
//! block_on(viewer.load()).expect("document should open");
//! assert_eq!(viewer.host().indicator().as_deref(), Some("1-2 / 10"));
//!
//! block_on(viewer.go_next());
//! assert_eq!(viewer.host().indicator().as_deref(), Some("3-4 / 10"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod layout;
pub mod navigation;
pub mod renderer;
pub mod spread;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod viewer;
pub mod zoom;

pub use config::FlipbookConfig;
pub use document::{DocumentHandle, DocumentSource, PageHandle, PageViewport, PaintTask};
pub use error::{ConfigError, FlipbookError, FlipbookResult};
pub use event_loop::{EventLoop, TimerId};
pub use host::{DrawingSurface, ViewerHost};
pub use layout::{compute_container_width, DisplaySize, LayoutState, PixelSize};
pub use navigation::NavigationAction;
pub use renderer::{render_page_to_surface, PaintSlot, RenderOutcome, RenderScale};
pub use spread::{PagePair, PageSide, SpreadCursor};
pub use viewer::{LoadState, SpreadOutcome, Viewer};
pub use zoom::{FreezeTransition, ZoomFreeze, ZoomPhase};
