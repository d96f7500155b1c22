//! Execution contexts for user continuations
//!
//! Transports finish requests on whatever worker they like. Callers that
//! need their continuations to run on one consistent context (a UI thread,
//! the main task of a CLI) supply a [`Dispatcher`] that moves the final
//! continuation there. This crate never creates threads of its own.
//!
//! - [`InlineDispatcher`] runs continuations immediately on the
//!   completing context.
//! - [`MainQueue`] / [`MainQueueDispatcher`] queue continuations for the
//!   application to drain on the context it owns.

use std::fmt;

use tokio::sync::mpsc;

/// A unit of work handed to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Moves a continuation onto the caller's chosen execution context.
pub trait Dispatcher: Send + Sync + fmt::Debug {
    /// Schedule `job` to run exactly once.
    fn dispatch(&self, job: Job);
}

/// Runs every job immediately on the calling context.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Sender half of a [`MainQueue`].
///
/// Cloning is cheap; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct MainQueueDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher for MainQueueDispatcher {
    fn dispatch(&self, job: Job) {
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            tracing::warn!("main queue is closed; running continuation inline");
            job();
        }
    }
}

/// Serial queue of continuations drained by the application.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use boxauth::dispatch::{Dispatcher, MainQueue};
///
/// let (dispatcher, mut queue) = MainQueue::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// dispatcher.dispatch(Box::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
/// assert_eq!(queue.run_pending(), 1);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct MainQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainQueue").finish_non_exhaustive()
    }
}

impl MainQueue {
    /// Creates a queue and the dispatcher that feeds it.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (MainQueueDispatcher, MainQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MainQueueDispatcher { tx }, MainQueue { rx })
    }

    /// Runs every job currently queued, in order, and returns how many ran.
    ///
    /// Never waits; suitable for calling from an existing event loop.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Runs jobs as they arrive until every dispatcher has been dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
        tracing::debug!("main queue drained; all dispatchers dropped");
    }
}
