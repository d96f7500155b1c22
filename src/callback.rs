//! Continuations and the complete-once latch
//!
//! Every asynchronous operation in this crate reports its outcome by
//! invoking a [`Callback`] with a [`Result`]. A [`CompletionLatch`]
//! guarantees that a continuation observes exactly one outcome even when
//! several internal paths race to produce one, and forwards that outcome
//! through the caller's [`Dispatcher`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::dispatch::Dispatcher;
use crate::error::{Result, SdkError};

/// A continuation invoked with the eventual result of an operation.
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Complete-once guard around a user continuation.
///
/// The first call to [`complete`](Self::complete) wins; any later call is
/// dropped. The flag is a compare-and-swap so the guarantee holds when
/// completions race across threads.
pub struct CompletionLatch<T> {
    completed: AtomicBool,
    callback: Mutex<Option<Callback<T>>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<T> fmt::Debug for CompletionLatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionLatch")
            .field("completed", &self.completed.load(Ordering::Acquire))
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<T: Send + 'static> CompletionLatch<T> {
    /// Wraps `callback` so that it fires at most once, on `dispatcher`.
    pub fn new(callback: Callback<T>, dispatcher: Arc<dyn Dispatcher>) -> Arc<Self> {
        Arc::new(Self {
            completed: AtomicBool::new(false),
            callback: Mutex::new(Some(callback)),
            dispatcher,
        })
    }

    /// Delivers `result` if nothing has been delivered yet.
    ///
    /// Returns `true` when this call won the latch.
    pub fn complete(&self, result: Result<T>) -> bool {
        if self
            .completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("dropping duplicate completion");
            return false;
        }

        let callback = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(callback) = callback {
            self.dispatcher.dispatch(Box::new(move || callback(result)));
        }
        true
    }

    /// Returns `true` once a result has been delivered.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Converts the latch into a plain [`Callback`] that completes it.
    pub fn into_callback(self: Arc<Self>) -> Callback<T> {
        Box::new(move |result| {
            self.complete(result);
        })
    }
}

/// Runs a continuation-style operation and awaits its single result.
///
/// # Errors
///
/// Returns whatever error the operation reports, or [`SdkError::Custom`]
/// if the operation dropped its continuation without calling it.
///
/// # Examples
///
/// ```
/// use boxauth::callback::await_completion;
///
/// # #[tokio::main]
/// # async fn main() {
/// let value = await_completion(|done| done(Ok(42_u32))).await.unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
pub async fn await_completion<T, F>(operation: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>),
{
    let (tx, rx) = oneshot::channel();
    operation(Box::new(move |result| {
        // The receiver is gone only if the awaiting future was dropped.
        let _ = tx.send(result);
    }));
    rx.await.unwrap_or_else(|_| {
        Err(SdkError::Custom(
            "operation finished without completing".to_string(),
        ))
    })
}
