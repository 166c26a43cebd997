//! Paints one document page onto one drawing surface.

use crate::document::{DocumentHandle, PageHandle, PaintTask};
use crate::error::FlipbookError;
use crate::host::DrawingSurface;
use crate::layout::{backing_size, normalize_device_pixel_ratio, DisplaySize};
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use log::trace;
use std::cell::{Cell, RefCell};

/// How the page scale is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderScale {
    /// Scale so the page is this many CSS pixels wide.
    FitWidth(f64),
    /// Use this scale as-is.
    Explicit(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    /// No surface was provided for this slot.
    Skipped,
    /// Page number outside the document; the surface was cleared.
    Cleared,
    Painted { scale: f64, display: DisplaySize },
    /// A newer render pass took over the surface before this one finished.
    Superseded,
}

type PaintCompletion = Shared<LocalBoxFuture<'static, Result<(), FlipbookError>>>;

struct InFlightPaint {
    ticket: u64,
    page: u32,
    completion: PaintCompletion,
    cancel: Option<Box<dyn FnOnce()>>,
}

/// The paint currently running on one surface.
///
/// A surface takes one paint at a time. Before touching the surface, a
/// render cancels whatever paint an earlier render left running and waits
/// for it to stop.
#[derive(Default)]
pub struct PaintSlot {
    in_flight: RefCell<Option<InFlightPaint>>,
    next_ticket: Cell<u64>,
}

impl PaintSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.borrow().is_some()
    }

    /// Cancels the paints started before this call and waits until they
    /// have resolved. Paints started while waiting are left alone.
    pub async fn settle(&self) {
        let horizon = self.next_ticket.get();

        loop {
            let (ticket, completion, cancel) = {
                let mut slot = self.in_flight.borrow_mut();
                match slot.as_mut() {
                    Some(paint) if paint.ticket < horizon => {
                        trace!("cancelling paint of page {}", paint.page);
                        (paint.ticket, paint.completion.clone(), paint.cancel.take())
                    }
                    _ => return,
                }
            };

            if let Some(cancel) = cancel {
                cancel();
            }
            let _ = completion.await;
            self.finish(ticket);
        }
    }

    fn start(&self, page: u32, task: PaintTask) -> (u64, PaintCompletion) {
        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket.wrapping_add(1));

        let (completion, cancel) = task.into_parts();
        let completion = completion.shared();
        self.in_flight.replace(Some(InFlightPaint {
            ticket,
            page,
            completion: completion.clone(),
            cancel,
        }));

        (ticket, completion)
    }

    fn finish(&self, ticket: u64) {
        let mut slot = self.in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|paint| paint.ticket == ticket) {
            *slot = None;
        }
    }
}

/// Renders `page_number` (1-based) onto `surface`.
///
/// `is_current` is checked after every suspension point; once it returns
/// `false` the surface is left to the newer render and the outcome is
/// [`RenderOutcome::Superseded`]. A paint left running on `slot` by an
/// earlier render is cancelled and awaited before the surface is resized or
/// cleared. Fetch and paint failures are returned to the caller.
pub async fn render_page_to_surface<D, F>(
    document: &D,
    page_number: u32,
    surface: Option<&D::Surface>,
    slot: &PaintSlot,
    scale: RenderScale,
    device_pixel_ratio: f64,
    is_current: F,
) -> Result<RenderOutcome, FlipbookError>
where
    D: DocumentHandle,
    F: Fn() -> bool,
{
    let Some(surface) = surface else {
        return Ok(RenderOutcome::Skipped);
    };

    if page_number < 1 || page_number > document.page_count() {
        slot.settle().await;
        if !is_current() {
            return Ok(RenderOutcome::Superseded);
        }

        surface.clear();
        return Ok(RenderOutcome::Cleared);
    }

    let page = document.page(page_number).await?;
    if !is_current() {
        return Ok(RenderOutcome::Superseded);
    }

    slot.settle().await;
    if !is_current() {
        return Ok(RenderOutcome::Superseded);
    }

    let scale = resolve_scale(&page, page_number, scale)?;
    let viewport = page.viewport(scale);
    let display = DisplaySize {
        width: viewport.width,
        height: viewport.height,
    };
    let dpr = normalize_device_pixel_ratio(device_pixel_ratio);

    surface.resize(backing_size(display, dpr), display, dpr);

    let (ticket, completion) = slot.start(page_number, page.render_into(surface, viewport));
    let painted = completion.await;
    slot.finish(ticket);

    if !is_current() {
        return Ok(RenderOutcome::Superseded);
    }
    painted?;

    Ok(RenderOutcome::Painted { scale, display })
}

fn resolve_scale<P: PageHandle>(
    page: &P,
    page_number: u32,
    scale: RenderScale,
) -> Result<f64, FlipbookError> {
    let resolved = match scale {
        RenderScale::Explicit(scale) => scale,
        RenderScale::FitWidth(target_width) => {
            let base = page.viewport(1.0);
            if !(base.width.is_finite() && base.width > 0.0) {
                return Err(FlipbookError::Paint {
                    page: page_number,
                    reason: format!("page has unusable base width {}", base.width),
                });
            }
            target_width / base.width
        }
    };

    if resolved.is_finite() && resolved > 0.0 {
        Ok(resolved)
    } else {
        Err(FlipbookError::Paint {
            page: page_number,
            reason: format!("invalid scale {resolved}"),
        })
    }
}
