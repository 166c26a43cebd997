//! Cancellable delayed tasks and local task spawning.

use futures::future::LocalBoxFuture;
use std::time::Duration;

/// Identifier of a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// The single-threaded loop the viewer runs on.
pub trait EventLoop: 'static {
    /// Runs `task` once after `delay` unless cancelled first.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId;

    /// Cancels a pending task. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);

    /// Drives `future` to completion in the background.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}
