//! [`EventLoop`] on top of `setTimeout` and the microtask queue.

use flipbook_core::{EventLoop, TimerId};
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

struct PendingTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct Timers {
    pending: HashMap<TimerId, PendingTimer>,
    /// Timers whose callback has returned; their closures are dropped on the
    /// next schedule or cancel, never from inside the callback itself.
    fired: Vec<TimerId>,
}

impl Timers {
    fn collect_fired(&mut self) {
        for id in self.fired.drain(..) {
            self.pending.remove(&id);
        }
    }
}

pub struct BrowserEventLoop {
    window: Window,
    timers: Rc<RefCell<Timers>>,
    next_id: Cell<u64>,
}

impl BrowserEventLoop {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            timers: Rc::default(),
            next_id: Cell::new(1),
        }
    }

    pub fn pending_timers(&self) -> usize {
        let timers = self.timers.borrow();
        timers.pending.len().saturating_sub(timers.fired.len())
    }
}

impl EventLoop for BrowserEventLoop {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut task = Some(task);
        let timers = Rc::downgrade(&self.timers);
        let callback = Closure::wrap(Box::new(move || {
            if let Some(task) = task.take() {
                task();
            }
            if let Some(timers) = timers.upgrade() {
                timers.borrow_mut().fired.push(id);
            }
        }) as Box<dyn FnMut()>);

        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let handle = match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms,
            ) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("setTimeout failed: {err:?}");
                return id;
            }
        };

        let mut timers = self.timers.borrow_mut();
        timers.collect_fired();
        timers.pending.insert(
            id,
            PendingTimer {
                handle,
                _callback: callback,
            },
        );
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut timers = self.timers.borrow_mut();
        timers.collect_fired();
        if let Some(timer) = timers.pending.remove(&id) {
            self.window.clear_timeout_with_handle(timer.handle);
        }
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
