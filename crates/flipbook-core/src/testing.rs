//! In-memory host, document, and event loop for driving a [`Viewer`]
//! deterministically in tests.
//!
//! [`Viewer`]: crate::Viewer

use crate::document::{DocumentHandle, DocumentSource, PageHandle, PageViewport, PaintTask};
use crate::error::FlipbookError;
use crate::event_loop::{EventLoop, TimerId};
use crate::host::{DrawingSurface, ViewerHost};
use crate::layout::{DisplaySize, PixelSize};
use crate::spread::PageSide;
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, Either, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

/// Event loop with a virtual clock.
///
/// Timers fire only from [`ManualEventLoop::advance`]; spawned futures run
/// from [`ManualEventLoop::run_until_stalled`] (which `advance` also calls).
pub struct ManualEventLoop {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<TimerId, (Duration, Box<dyn FnOnce()>)>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl ManualEventLoop {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(0),
            timers: RefCell::new(BTreeMap::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Polls spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Moves the clock forward, firing due timers in deadline order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        loop {
            self.run_until_stalled();

            let due = {
                let timers = self.timers.borrow();
                timers
                    .iter()
                    .filter(|(_, (deadline, _))| *deadline <= target)
                    .min_by_key(|(id, (deadline, _))| (*deadline, **id))
                    .map(|(id, _)| *id)
            };

            let Some(id) = due else {
                break;
            };

            let Some((deadline, task)) = self.timers.borrow_mut().remove(&id) else {
                continue;
            };
            self.now.set(deadline);
            task();
        }

        self.now.set(target);
        self.run_until_stalled();
    }
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop for ManualEventLoop {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers.borrow_mut().insert(id, (self.now.get() + delay, task));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.timers.borrow_mut().remove(&id);
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(future) {
            log::error!("manual event loop rejected task: {err}");
        }
    }
}

/// Everything that happened to a [`FakeSurface`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Resized {
        backing: PixelSize,
        display: DisplaySize,
        device_pixel_ratio: f64,
    },
    Cleared,
    Painted { page: u32, scale: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    events: Rc<RefCell<Vec<SurfaceEvent>>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    pub fn last_event(&self) -> Option<SurfaceEvent> {
        self.events.borrow().last().cloned()
    }

    /// Pages whose paint completed, in completion order.
    pub fn painted_pages(&self) -> Vec<u32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Painted { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Page painted by the most recent paint, unless cleared since.
    pub fn shown_page(&self) -> Option<u32> {
        let events = self.events.borrow();
        let last = events
            .iter()
            .rev()
            .find(|event| !matches!(event, SurfaceEvent::Resized { .. }));

        match last {
            Some(SurfaceEvent::Painted { page, .. }) => Some(*page),
            _ => None,
        }
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl DrawingSurface for FakeSurface {
    fn resize(&self, backing: PixelSize, display: DisplaySize, device_pixel_ratio: f64) {
        self.record(SurfaceEvent::Resized {
            backing,
            display,
            device_pixel_ratio,
        });
    }

    fn clear(&self) {
        self.record(SurfaceEvent::Cleared);
    }
}

pub struct FakeHost {
    source_ref: String,
    left: Option<FakeSurface>,
    right: Option<FakeSurface>,
    viewport_width: Cell<f64>,
    device_pixel_ratio: Cell<f64>,
    indicator: RefCell<Option<String>>,
    indicator_writes: Cell<u32>,
    load_error: RefCell<Option<String>>,
}

impl FakeHost {
    pub fn new(source_ref: impl Into<String>, viewport_width: f64) -> Self {
        Self {
            source_ref: source_ref.into(),
            left: Some(FakeSurface::new()),
            right: Some(FakeSurface::new()),
            viewport_width: Cell::new(viewport_width),
            device_pixel_ratio: Cell::new(1.0),
            indicator: RefCell::new(None),
            indicator_writes: Cell::new(0),
            load_error: RefCell::new(None),
        }
    }

    /// Host page with only a left surface.
    pub fn single_surface(source_ref: impl Into<String>, viewport_width: f64) -> Self {
        Self {
            right: None,
            ..Self::new(source_ref, viewport_width)
        }
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    pub fn set_device_pixel_ratio(&self, dpr: f64) {
        self.device_pixel_ratio.set(dpr);
    }

    /// # Panics
    ///
    /// If the host was built without a left surface.
    pub fn left_surface(&self) -> &FakeSurface {
        self.left.as_ref().expect("host has no left surface")
    }

    /// # Panics
    ///
    /// If the host was built without a right surface.
    pub fn right_surface(&self) -> &FakeSurface {
        self.right.as_ref().expect("host has no right surface")
    }

    pub fn indicator(&self) -> Option<String> {
        self.indicator.borrow().clone()
    }

    pub fn indicator_writes(&self) -> u32 {
        self.indicator_writes.get()
    }

    pub fn load_error(&self) -> Option<String> {
        self.load_error.borrow().clone()
    }
}

impl ViewerHost for FakeHost {
    type Surface = FakeSurface;

    fn source_ref(&self) -> String {
        self.source_ref.clone()
    }

    fn surface(&self, side: PageSide) -> Option<&FakeSurface> {
        match side {
            PageSide::Left => self.left.as_ref(),
            PageSide::Right => self.right.as_ref(),
        }
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.get()
    }

    fn set_indicator_text(&self, text: &str) {
        self.indicator.replace(Some(text.to_string()));
        self.indicator_writes.set(self.indicator_writes.get() + 1);
    }

    fn show_load_error(&self, message: &str) {
        self.load_error.replace(Some(message.to_string()));
    }
}

struct DocumentState {
    page_count: u32,
    base_width: f64,
    base_height: f64,
    fetched: RefCell<Vec<u32>>,
    failing_fetches: RefCell<HashSet<u32>>,
    failing_paints: RefCell<HashSet<u32>>,
    held: RefCell<HashMap<u32, Vec<oneshot::Receiver<()>>>>,
    held_paints: RefCell<HashMap<u32, Vec<oneshot::Receiver<()>>>>,
    cancelled_paints: RefCell<Vec<u32>>,
}

fn take_gate(
    gates: &RefCell<HashMap<u32, Vec<oneshot::Receiver<()>>>>,
    page: u32,
) -> Option<oneshot::Receiver<()>> {
    let mut gates = gates.borrow_mut();
    let queue = gates.get_mut(&page)?;
    if queue.is_empty() {
        None
    } else {
        Some(queue.remove(0))
    }
}

/// Document whose pages all share one base size. Clones share state.
#[derive(Clone)]
pub struct FakeDocument {
    state: Rc<DocumentState>,
}

/// Releases a fetch or paint held by [`FakeDocument::hold_fetch`] or
/// [`FakeDocument::hold_paint`].
pub struct FetchGate {
    sender: oneshot::Sender<()>,
}

impl FetchGate {
    pub fn release(self) {
        let _ = self.sender.send(());
    }
}

impl FakeDocument {
    pub fn uniform(page_count: u32, base_width: f64, base_height: f64) -> Self {
        Self {
            state: Rc::new(DocumentState {
                page_count,
                base_width,
                base_height,
                fetched: RefCell::new(Vec::new()),
                failing_fetches: RefCell::new(HashSet::new()),
                failing_paints: RefCell::new(HashSet::new()),
                held: RefCell::new(HashMap::new()),
                held_paints: RefCell::new(HashMap::new()),
                cancelled_paints: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Page numbers requested so far, in request order.
    pub fn fetched_pages(&self) -> Vec<u32> {
        self.state.fetched.borrow().clone()
    }

    pub fn fail_fetch(&self, page: u32) {
        self.state.failing_fetches.borrow_mut().insert(page);
    }

    pub fn fail_paint(&self, page: u32) {
        self.state.failing_paints.borrow_mut().insert(page);
    }

    /// Makes the next fetch of `page` wait until the gate is released.
    pub fn hold_fetch(&self, page: u32) -> FetchGate {
        let (sender, receiver) = oneshot::channel();
        self.state.held.borrow_mut().entry(page).or_default().push(receiver);
        FetchGate { sender }
    }

    /// Makes the next paint of `page` wait until the gate is released. The
    /// held paint can be cancelled; it then resolves with a paint error
    /// without drawing.
    pub fn hold_paint(&self, page: u32) -> FetchGate {
        let (sender, receiver) = oneshot::channel();
        self.state
            .held_paints
            .borrow_mut()
            .entry(page)
            .or_default()
            .push(receiver);
        FetchGate { sender }
    }

    /// Pages whose held paint was cancelled, in order.
    pub fn cancelled_paints(&self) -> Vec<u32> {
        self.state.cancelled_paints.borrow().clone()
    }
}

impl DocumentHandle for FakeDocument {
    type Surface = FakeSurface;
    type Page = FakePage;

    fn page_count(&self) -> u32 {
        self.state.page_count
    }

    fn page(&self, number: u32) -> LocalBoxFuture<'static, Result<FakePage, FlipbookError>> {
        self.state.fetched.borrow_mut().push(number);

        let held = take_gate(&self.state.held, number);
        let fails = self.state.failing_fetches.borrow().contains(&number);
        let page = FakePage {
            number,
            document: Rc::clone(&self.state),
        };

        async move {
            if let Some(gate) = held {
                let _ = gate.await;
            }

            if fails {
                return Err(FlipbookError::PageFetch {
                    page: number,
                    reason: "injected fetch failure".to_string(),
                });
            }

            Ok(page)
        }
        .boxed_local()
    }
}

pub struct FakePage {
    number: u32,
    document: Rc<DocumentState>,
}

impl PageHandle for FakePage {
    type Surface = FakeSurface;

    fn viewport(&self, scale: f64) -> PageViewport {
        PageViewport {
            scale,
            width: self.document.base_width * scale,
            height: self.document.base_height * scale,
        }
    }

    fn render_into(&self, surface: &FakeSurface, viewport: PageViewport) -> PaintTask {
        let page = self.number;
        let scale = viewport.scale;

        if self.document.failing_paints.borrow().contains(&page) {
            return PaintTask::ready(Err(FlipbookError::Paint {
                page,
                reason: "injected paint failure".to_string(),
            }));
        }

        let Some(gate) = take_gate(&self.document.held_paints, page) else {
            surface.record(SurfaceEvent::Painted { page, scale });
            return PaintTask::ready(Ok(()));
        };

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let surface = surface.clone();
        let document = Rc::clone(&self.document);

        PaintTask::new(async move {
            match future::select(gate, cancel_rx).await {
                Either::Left(_) => {
                    surface.record(SurfaceEvent::Painted { page, scale });
                    Ok(())
                }
                Either::Right(_) => {
                    document.cancelled_paints.borrow_mut().push(page);
                    Err(FlipbookError::Paint {
                        page,
                        reason: "paint cancelled".to_string(),
                    })
                }
            }
        })
        .on_cancel(move || {
            let _ = cancel_tx.send(());
        })
    }
}

/// Source that hands out one prepared document, or fails every open.
pub struct FakeSource {
    document: Option<FakeDocument>,
    failure: Option<String>,
    opened: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn with_document(document: FakeDocument) -> Self {
        Self {
            document: Some(document),
            failure: None,
            opened: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            document: None,
            failure: Some(reason.into()),
            opened: RefCell::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl DocumentSource for FakeSource {
    type Document = FakeDocument;

    fn open(
        &self,
        source_ref: &str,
    ) -> LocalBoxFuture<'static, Result<FakeDocument, FlipbookError>> {
        self.opened.borrow_mut().push(source_ref.to_string());

        let result = match (&self.document, &self.failure) {
            (Some(document), None) => Ok(document.clone()),
            (_, Some(reason)) => Err(FlipbookError::DocumentOpen(reason.clone())),
            (None, None) => Err(FlipbookError::DocumentOpen(
                "no document configured".to_string(),
            )),
        };

        future::ready(result).boxed_local()
    }
}
