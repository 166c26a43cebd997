//! Interface to the external document renderer.
//!
//! The renderer is a black box: it opens a source reference, reports the
//! page count, hands out pages, and paints a page onto a drawing surface at
//! a caller-chosen scale. Futures are single-threaded and own everything
//! they need, so callers can hold them across other awaits.

use crate::error::FlipbookError;
use crate::host::DrawingSurface;
use futures::future::{self, LocalBoxFuture};
use futures::{Future, FutureExt};

/// Size of a page at a given scale, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

/// A paint that has been started on a surface.
///
/// Completion resolves once the renderer has finished or given up. An
/// optional cancel hook asks the renderer to stop early; a cancelled paint
/// still resolves, usually with an error.
pub struct PaintTask {
    completion: LocalBoxFuture<'static, Result<(), FlipbookError>>,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl PaintTask {
    pub fn new<F>(completion: F) -> Self
    where
        F: Future<Output = Result<(), FlipbookError>> + 'static,
    {
        Self {
            completion: completion.boxed_local(),
            cancel: None,
        }
    }

    /// A paint that already finished with `result`.
    pub fn ready(result: Result<(), FlipbookError>) -> Self {
        Self::new(future::ready(result))
    }

    /// Attaches the hook run when a newer paint takes over the surface.
    pub fn on_cancel(mut self, cancel: impl FnOnce() + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        LocalBoxFuture<'static, Result<(), FlipbookError>>,
        Option<Box<dyn FnOnce()>>,
    ) {
        (self.completion, self.cancel)
    }
}

pub trait DocumentSource: 'static {
    type Document: DocumentHandle;

    fn open(
        &self,
        source_ref: &str,
    ) -> LocalBoxFuture<'static, Result<Self::Document, FlipbookError>>;
}

pub trait DocumentHandle: 'static {
    type Surface: DrawingSurface;
    type Page: PageHandle<Surface = Self::Surface>;

    fn page_count(&self) -> u32;

    /// Fetches a 1-based page.
    fn page(&self, number: u32) -> LocalBoxFuture<'static, Result<Self::Page, FlipbookError>>;
}

pub trait PageHandle: 'static {
    type Surface: DrawingSurface;

    fn viewport(&self, scale: f64) -> PageViewport;

    /// Starts painting onto `surface`, which has already been sized for
    /// `viewport`.
    fn render_into(&self, surface: &Self::Surface, viewport: PageViewport) -> PaintTask;
}
