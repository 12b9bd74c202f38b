//! Pre/post-trigger observation for keyed events.
//!
//! A [`Watcher`] is an optional observer attached to an [`Event`](crate::Event)
//! before concurrent use begins. For every handler of every trigger the engine
//! invokes `before_trigger`, runs the handler, then invokes `after_trigger`.
//! The pair always fires, even when the handler panics: the after-hook runs
//! during unwind, and the panic itself is left to surface.
//!
//! The engine exposes no completion signal for concurrent dispatch; a caller
//! that needs one supplies it through these hooks. [`TriggerBarrier`] is the
//! ready-made counting barrier for that purpose.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::event::HandlerId;
use crate::sender::Sender;

/// An observer receiving pre/post notification around each handler invocation.
pub trait Watcher<T>: Send + Sync {
    /// Called before the handler identified by `id` runs.
    fn before_trigger(&self, id: HandlerId, sender: Option<&dyn Sender>, payload: &T);

    /// Called after the handler identified by `id` has returned or panicked.
    fn after_trigger(&self, id: HandlerId, sender: Option<&dyn Sender>, payload: &T);
}

/// A type-erased, shareable watcher.
pub type BoxedWatcher<T> = Arc<dyn Watcher<T>>;

/// A counting barrier over in-flight handler invocations.
///
/// Increments on `before_trigger`, decrements on `after_trigger`, and lets a
/// caller await the moment the count drains to zero. Attach it as the watcher
/// of an event dispatched with
/// [`trigger_async`](crate::Event::trigger_async) to learn when all launched
/// handlers have finished:
///
/// ```rust,ignore
/// let barrier = Arc::new(TriggerBarrier::new());
/// event.set_watcher(barrier.clone());
/// let event = Arc::new(event);
///
/// event.trigger_async(None, payload).await; // returns immediately
/// barrier.wait().await;                     // resolves once every handler is done
/// ```
#[derive(Debug, Default)]
pub struct TriggerBarrier {
    in_flight: AtomicUsize,
    drained: Notify,
}

impl TriggerBarrier {
    /// Creates a barrier with no in-flight invocations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of handler invocations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits until every observed invocation has completed.
    ///
    /// Returns immediately if nothing is in flight. Because `before_trigger`
    /// hooks run before `trigger_async` returns, awaiting this after the
    /// trigger call covers every handler that call launched.
    pub async fn wait(&self) {
        loop {
            // Register interest before re-checking, so a decrement between the
            // load and the await cannot be missed.
            let drained = self.drained.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            drained.await;
        }
    }
}

impl<T> Watcher<T> for TriggerBarrier {
    fn before_trigger(&self, _id: HandlerId, _sender: Option<&dyn Sender>, _payload: &T) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    fn after_trigger(&self, _id: HandlerId, _sender: Option<&dyn Sender>, _payload: &T) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_returns_immediately_when_idle() {
        let barrier = TriggerBarrier::new();
        barrier.wait().await;
        assert_eq!(barrier.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wait_resolves_once_the_count_drains() {
        let barrier = Arc::new(TriggerBarrier::new());

        Watcher::<()>::before_trigger(&*barrier, HandlerId(1), None, &());
        Watcher::<()>::before_trigger(&*barrier, HandlerId(2), None, &());
        assert_eq!(barrier.in_flight(), 2);

        let releaser = Arc::clone(&barrier);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Watcher::<()>::after_trigger(&*releaser, HandlerId(1), None, &());
            Watcher::<()>::after_trigger(&*releaser, HandlerId(2), None, &());
        });

        barrier.wait().await;
        assert_eq!(barrier.in_flight(), 0);
    }
}
