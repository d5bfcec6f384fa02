// ── Event → future bridge ──
//
// Subscribes to an event exactly once and hands every emission to an
// adapter, which decides when (and how) the returned future settles.
// The subscription is disposed exactly once, on every path, after
// settlement -- success, rejection, or source closure.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

use crate::dispose::Disposable;
use crate::event::Event;

/// Failure of a [`wait_with`] / [`wait_for`] call.
#[derive(Debug, Error)]
pub enum WaitError<E = Infallible> {
    /// The event source closed before the adapter settled the wait.
    #[error("event source closed before a value was delivered")]
    Aborted,

    /// The adapter rejected the wait.
    #[error("wait rejected by adapter")]
    Rejected(E),
}

/// Cloneable settlement handle passed to wait adapters.
///
/// First write wins: once resolved or rejected, later calls are no-ops.
/// Emissions that race in between settlement and subscription teardown
/// still reach the adapter but can no longer change the outcome.
pub struct Settle<U, E> {
    tx: Arc<Mutex<Option<oneshot::Sender<Result<U, E>>>>>,
}

impl<U, E> Clone for Settle<U, E> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<U, E> Settle<U, E> {
    fn new(tx: oneshot::Sender<Result<U, E>>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    fn take(&self) -> Option<oneshot::Sender<Result<U, E>>> {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Settle the wait successfully. No-op if already settled.
    pub fn resolve(&self, value: U) {
        if let Some(tx) = self.take() {
            let _ = tx.send(Ok(value));
        }
    }

    /// Settle the wait with a rejection. No-op if already settled.
    pub fn reject(&self, error: E) {
        if let Some(tx) = self.take() {
            let _ = tx.send(Err(error));
        }
    }

    /// Whether the wait has already been resolved or rejected.
    pub fn is_settled(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Wait for `event` to settle through `adapter`.
///
/// The adapter runs for every emission, synchronously in the firing
/// context, and may resolve or reject via the [`Settle`] handle --
/// immediately, or only after inspecting several emissions. Returning
/// `Err` from the adapter rejects the wait with that error.
///
/// If the event source closes (its emitter is dropped) before settlement,
/// the wait fails with [`WaitError::Aborted`] instead of pending forever.
pub async fn wait_with<T, U, E, F>(event: &Event<T>, mut adapter: F) -> Result<U, WaitError<E>>
where
    T: 'static,
    U: Send + 'static,
    E: Send + 'static,
    F: FnMut(&T, &Settle<U, E>) -> Result<(), E> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let settle = Settle::new(tx);

    // The listener closure is the only owner of the settlement handle;
    // when the source drops it, the channel closes and the wait aborts.
    let mut subscription = event.subscribe(move |value: &T| {
        if let Err(error) = adapter(value, &settle) {
            settle.reject(error);
        }
    });

    let outcome = rx.await;
    subscription.dispose();

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(WaitError::Rejected(error)),
        Err(_) => {
            debug!("event source closed before wait settled");
            Err(WaitError::Aborted)
        }
    }
}

/// Wait for the next emission of `event` (passthrough adapter).
pub async fn wait_for<T>(event: &Event<T>) -> Result<T, WaitError>
where
    T: Clone + Send + 'static,
{
    wait_with(event, |value: &T, settle: &Settle<T, Infallible>| {
        settle.resolve(value.clone());
        Ok(())
    })
    .await
}
