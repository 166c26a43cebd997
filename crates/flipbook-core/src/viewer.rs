//! The viewer: document loading, spread rendering, navigation, and the
//! zoom-freeze wiring, all over one explicit state object.
//!
//! Everything runs on a single-threaded event loop. State lives in `Cell`s
//! and `RefCell`s that are never borrowed across an `.await`, so handlers
//! can re-enter the viewer while a render pass is suspended.

use crate::config::FlipbookConfig;
use crate::document::{DocumentHandle, DocumentSource};
use crate::error::{FlipbookError, FlipbookResult};
use crate::event_loop::{EventLoop, TimerId};
use crate::host::{DrawingSurface, ViewerHost};
use crate::layout::compute_container_width;
use crate::navigation::NavigationAction;
use crate::renderer::{render_page_to_surface, PaintSlot, RenderOutcome, RenderScale};
use crate::spread::{PagePair, PageSide, SpreadCursor};
use crate::zoom::{FreezeTransition, ZoomFreeze};
use futures::future::join;
use futures::FutureExt;
use log::{debug, error, info, trace, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loading,
    Ready,
    Failed,
}

/// Result of one spread render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadOutcome {
    pub pages: PagePair,
    pub left: FlipbookResult<RenderOutcome>,
    pub right: FlipbookResult<RenderOutcome>,
    /// Indicator text written by this pass; `None` if a newer pass took over.
    pub indicator: Option<String>,
}

impl SpreadOutcome {
    pub fn is_complete(&self) -> bool {
        self.left.is_ok() && self.right.is_ok() && self.indicator.is_some()
    }
}

pub struct Viewer<H, S, E>
where
    H: ViewerHost,
    S: DocumentSource,
    E: EventLoop,
{
    host: H,
    source: S,
    event_loop: E,
    config: FlipbookConfig,
    document: RefCell<Option<Rc<S::Document>>>,
    load_state: Cell<LoadState>,
    cursor: Cell<SpreadCursor>,
    zoom: RefCell<ZoomFreeze>,
    pending_thaw: Cell<Option<TimerId>>,
    generation: Cell<u64>,
    left_paint: PaintSlot,
    right_paint: PaintSlot,
}

impl<H, S, E> Viewer<H, S, E>
where
    H: ViewerHost,
    S: DocumentSource,
    S::Document: DocumentHandle<Surface = H::Surface>,
    E: EventLoop,
{
    pub fn new(host: H, source: S, event_loop: E, config: FlipbookConfig) -> Rc<Self> {
        Rc::new(Self {
            host,
            source,
            event_loop,
            config,
            document: RefCell::new(None),
            load_state: Cell::new(LoadState::Pending),
            cursor: Cell::new(SpreadCursor::default()),
            zoom: RefCell::new(ZoomFreeze::new()),
            pending_thaw: Cell::new(None),
            generation: Cell::new(0),
            left_paint: PaintSlot::new(),
            right_paint: PaintSlot::new(),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn event_loop(&self) -> &E {
        &self.event_loop
    }

    pub fn config(&self) -> &FlipbookConfig {
        &self.config
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.get()
    }

    pub fn spread_index(&self) -> u32 {
        self.cursor.get().index()
    }

    pub fn total_pages(&self) -> u32 {
        self.cursor.get().total_pages()
    }

    pub fn pages(&self) -> PagePair {
        self.cursor.get().pages()
    }

    pub fn is_frozen(&self) -> bool {
        self.zoom.borrow().is_frozen()
    }

    /// Width one page is laid out at right now, honoring an active freeze.
    pub fn container_width(&self) -> f64 {
        let layout = self.zoom.borrow().layout_state();
        compute_container_width(self.host.viewport_width(), &self.config, &layout)
    }

    /// Opens the host's document and paints the first spread.
    ///
    /// On failure the viewer content is replaced with the configured message
    /// and no spread is rendered. There is no retry.
    pub async fn load(&self) -> FlipbookResult<u32> {
        let source_ref = self.host.source_ref();
        info!("opening document {source_ref}");
        self.load_state.set(LoadState::Loading);

        let opened = self.source.open(&source_ref).await.and_then(|document| {
            if document.page_count() == 0 {
                Err(FlipbookError::EmptyDocument)
            } else {
                Ok(document)
            }
        });

        let document = match opened {
            Ok(document) => document,
            Err(err) => {
                error!("failed to load {source_ref}: {err}");
                self.load_state.set(LoadState::Failed);
                self.host.show_load_error(&self.config.load_error_message);
                return Err(err);
            }
        };

        let total_pages = document.page_count();
        info!("loaded {source_ref} ({total_pages} pages)");

        self.document.replace(Some(Rc::new(document)));
        self.cursor.set(SpreadCursor::new(total_pages));
        self.load_state.set(LoadState::Ready);

        if let Err(err) = self.update_spread().await {
            warn!("initial render skipped: {err}");
        }

        Ok(total_pages)
    }

    /// Renders both pages of the current spread, then updates the indicator.
    ///
    /// The two pages render concurrently. A failure on one side clears that
    /// surface and does not stop the other side or the indicator update.
    /// A pass overtaken by a newer one leaves the indicator alone.
    pub async fn update_spread(&self) -> FlipbookResult<SpreadOutcome> {
        let document = self.document.borrow().clone();
        let Some(document) = document else {
            debug!("spread update before document load ignored");
            return Err(FlipbookError::NotLoaded);
        };

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        let is_current = || self.generation.get() == generation;

        let cursor = self.cursor.get();
        let pages = cursor.pages();
        let width = self.container_width();
        let dpr = self.host.device_pixel_ratio();
        trace!(
            "render pass {generation}: pages {}-{} at {width:.1}px",
            pages.left,
            pages.right
        );

        let (left, right) = join(
            self.render_side(&document, PageSide::Left, pages.left, width, dpr, &is_current),
            self.render_side(&document, PageSide::Right, pages.right, width, dpr, &is_current),
        )
        .await;

        if !is_current() {
            debug!("render pass {generation} superseded");
            return Ok(SpreadOutcome {
                pages,
                left,
                right,
                indicator: None,
            });
        }

        let indicator = pages.indicator_text(cursor.total_pages());
        self.host.set_indicator_text(&indicator);

        Ok(SpreadOutcome {
            pages,
            left,
            right,
            indicator: Some(indicator),
        })
    }

    async fn render_side<F>(
        &self,
        document: &S::Document,
        side: PageSide,
        page: u32,
        width: f64,
        dpr: f64,
        is_current: &F,
    ) -> FlipbookResult<RenderOutcome>
    where
        F: Fn() -> bool,
    {
        let surface = self.host.surface(side);
        let slot = match side {
            PageSide::Left => &self.left_paint,
            PageSide::Right => &self.right_paint,
        };
        let result = render_page_to_surface(
            document,
            page,
            surface,
            slot,
            RenderScale::FitWidth(width),
            dpr,
            is_current,
        )
        .await;

        if let Err(err) = &result {
            warn!("{side:?} page {page} failed to render: {err}");
            if let Some(surface) = surface.filter(|_| is_current()) {
                surface.clear();
            }
        }

        result
    }

    /// Advances one spread. No-op (returns `false`) at the last spread.
    pub async fn go_next(&self) -> bool {
        self.move_cursor(SpreadCursor::next).await
    }

    /// Steps back one spread. No-op (returns `false`) at the first spread.
    pub async fn go_prev(&self) -> bool {
        self.move_cursor(SpreadCursor::prev).await
    }

    pub async fn go_first(&self) -> bool {
        self.move_cursor(|cursor| cursor.jump_to(0)).await
    }

    pub async fn go_last(&self) -> bool {
        self.move_cursor(|cursor| cursor.jump_to(cursor.last_index())).await
    }

    /// Shows the spread containing `page` (clamped to the document).
    pub async fn go_to_page(&self, page: u32) -> bool {
        self.move_cursor(|cursor| cursor.jump_to(cursor.spread_for_page(page))).await
    }

    pub async fn navigate(&self, action: NavigationAction) -> bool {
        match action {
            NavigationAction::Next => self.go_next().await,
            NavigationAction::Prev => self.go_prev().await,
            NavigationAction::First => self.go_first().await,
            NavigationAction::Last => self.go_last().await,
        }
    }

    async fn move_cursor(&self, step: impl FnOnce(&mut SpreadCursor) -> bool) -> bool {
        let mut cursor = self.cursor.get();
        if !step(&mut cursor) {
            trace!("navigation at boundary, spread stays {}", cursor.index());
            return false;
        }

        self.cursor.set(cursor);
        debug!("spread -> {}", cursor.index());

        if let Err(err) = self.update_spread().await {
            debug!("spread change not rendered: {err}");
        }
        true
    }

    /// Window resize: re-render unless a zoom gesture has the layout frozen.
    pub fn on_window_resize(self: &Rc<Self>) {
        if self.zoom.borrow().suppresses_resize() {
            trace!("window resize ignored while zoom is frozen");
            return;
        }

        self.spawn_update();
    }

    /// Visual-viewport resize: enter or extend the zoom freeze and restart
    /// the quiet-period timer.
    pub fn on_viewport_metrics_change(self: &Rc<Self>) {
        let width = self.container_width();
        let transition = self.zoom.borrow_mut().on_viewport_signal(width);
        if transition == FreezeTransition::Entered {
            debug!("zoom gesture started, page width frozen at {width:.1}px");
        }

        if let Some(previous) = self.pending_thaw.take() {
            self.event_loop.cancel(previous);
        }

        let viewer = Rc::downgrade(self);
        let id = self.event_loop.schedule(
            self.config.zoom_quiet_period(),
            Box::new(move || {
                if let Some(viewer) = viewer.upgrade() {
                    viewer.finish_zoom();
                }
            }),
        );
        self.pending_thaw.set(Some(id));
    }

    /// Visual-viewport scroll carries no layout change.
    pub fn on_viewport_scroll(&self) {
        trace!("visual viewport scroll");
    }

    fn finish_zoom(self: &Rc<Self>) {
        self.pending_thaw.set(None);

        let thawed = self.zoom.borrow_mut().thaw();
        if thawed {
            debug!("zoom gesture settled, re-rendering at live width");
            self.spawn_update();
        }
    }

    fn spawn_update(self: &Rc<Self>) {
        let viewer = Rc::clone(self);
        self.event_loop.spawn(
            async move {
                if let Err(err) = viewer.update_spread().await {
                    debug!("background render skipped: {err}");
                }
            }
            .boxed_local(),
        );
    }

    /// Runs `action` on the event loop; used by input handlers.
    pub fn spawn_navigation(self: &Rc<Self>, action: NavigationAction) {
        let viewer = Rc::clone(self);
        self.event_loop.spawn(
            async move {
                viewer.navigate(action).await;
            }
            .boxed_local(),
        );
    }

    /// Starts [`Viewer::load`] on the event loop.
    pub fn spawn_load(self: &Rc<Self>) {
        let viewer = Rc::clone(self);
        self.event_loop.spawn(
            async move {
                if let Err(err) = viewer.load().await {
                    debug!("load task finished with error: {err}");
                }
            }
            .boxed_local(),
        );
    }
}
