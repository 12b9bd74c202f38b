//! The ordered event engine.
//!
//! An [`OrderedEvent<T>`] keeps its handlers in registration order with no
//! identifiers, no watcher, and no locker. Registration is append-only and
//! infallible; duplicates are permitted and nothing is ever removed. A single
//! [`trigger`](OrderedEvent::trigger) operation dispatches to every handler,
//! with a per-instance `async` flag selecting the mode per handler
//! invocation:
//!
//! - flag off — the handler is awaited before the next one starts;
//! - flag on — the handler is launched fire-and-forget on its own task, with
//!   no tracking and no completion signal.
//!
//! Invocation order always matches registration order; completion order under
//! the async mode is unspecified. The flag is read once per handler from
//! shared state with no further synchronization — toggling it while a
//! `trigger` call is in flight interleaves the two modes unpredictably and is
//! the owner's responsibility to avoid.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

/// The handler capability for ordered events: dispatch receives only the
/// payload.
#[async_trait]
pub trait OrderedHandler<T>: Send + Sync {
    /// Handles one dispatched payload.
    async fn handle(&self, payload: T);
}

/// A type-erased ordered handler.
pub type BoxedOrderedHandler<T> = Arc<dyn OrderedHandler<T>>;

/// Adapter that lets a plain async function or closure serve as an
/// [`OrderedHandler`].
pub struct OrderedHandlerFn<F> {
    f: F,
}

impl<F> OrderedHandlerFn<F> {
    /// Wraps a function value as an ordered handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> OrderedHandler<T> for OrderedHandlerFn<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn handle(&self, payload: T) {
        (self.f)(payload).await;
    }
}

/// Converts an async function or closure into a [`BoxedOrderedHandler`].
pub fn into_ordered_handler<T, F, Fut>(f: F) -> BoxedOrderedHandler<T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(OrderedHandlerFn::new(f))
}

/// An ordered event instance: an append-only handler sequence plus the
/// dispatch-mode flag.
pub struct OrderedEvent<T> {
    handlers: RwLock<Vec<BoxedOrderedHandler<T>>>,
    async_mode: AtomicBool,
}

impl<T> Default for OrderedEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedEvent<T> {
    /// Creates an empty event in synchronous mode.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            async_mode: AtomicBool::new(false),
        }
    }

    /// Selects fire-and-forget (`true`) or synchronous (`false`) dispatch.
    ///
    /// Meant to be toggled by the owning collaborator between triggers.
    pub fn set_async(&self, enabled: bool) {
        self.async_mode.store(enabled, Ordering::Relaxed);
    }

    /// Returns the current dispatch mode.
    pub fn is_async(&self) -> bool {
        self.async_mode.load(Ordering::Relaxed)
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Appends a handler. Unconditional: no identity or duplicate checks.
    pub fn register(&self, handler: BoxedOrderedHandler<T>) {
        self.handlers.write().push(handler);
        debug!(handlers = self.len(), "ordered handler registered");
    }
}

impl<T> OrderedEvent<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Appends an async function or closure as a handler.
    pub fn register_fn<F, Fut>(&self, f: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(into_ordered_handler(f));
    }

    /// Dispatches `payload` to every handler in registration order.
    ///
    /// The mode flag is read once per handler: when set, the handler runs
    /// fire-and-forget on its own task; when clear, it is awaited before the
    /// next handler starts. The sequence itself is never mutated by a
    /// trigger.
    pub async fn trigger(&self, payload: T) {
        let snapshot = self.handlers.read().clone();
        debug!(
            handlers = snapshot.len(),
            asynchronous = self.is_async(),
            "trigger (ordered)"
        );

        for handler in snapshot {
            if self.async_mode.load(Ordering::Relaxed) {
                let payload = payload.clone();
                tokio::spawn(async move {
                    handler.handle(payload).await;
                });
            } else {
                handler.handle(payload.clone()).await;
            }
        }
    }
}

impl<T> fmt::Debug for OrderedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedEvent")
            .field("handler_count", &self.len())
            .field("async_mode", &self.is_async())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use super::*;

    #[tokio::test]
    async fn synchronous_dispatch_follows_registration_order() {
        let event = OrderedEvent::<u64>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for index in 0..5u64 {
            let order = Arc::clone(&order);
            event.register_fn(move |payload: u64| {
                let order = Arc::clone(&order);
                async move {
                    // A later handler sleeping less than an earlier one would
                    // expose any accidental concurrency.
                    tokio::time::sleep(Duration::from_millis(5 * (5 - index))).await;
                    order.lock().unwrap().push((index, payload));
                }
            });
        }

        event.trigger(42).await;

        let order = order.lock().unwrap();
        let indices: Vec<u64> = order.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(order.iter().all(|(_, payload)| *payload == 42));
    }

    #[tokio::test]
    async fn duplicate_registrations_are_permitted() {
        let event = OrderedEvent::<()>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handler = into_ordered_handler(move |(): ()| {
            let counter = Arc::clone(&counter_clone);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        event.register(handler.clone());
        event.register(handler);
        assert_eq!(event.len(), 2);

        event.trigger(()).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        // Triggering never mutates the sequence.
        assert_eq!(event.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn async_mode_returns_before_handlers_finish() {
        let event = OrderedEvent::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            event.register_fn(move |_payload: u64| {
                let counter = Arc::clone(&counter);
                async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        event.set_async(true);
        let start = Instant::now();
        event.trigger(1).await;
        assert!(
            start.elapsed() < Duration::from_millis(50),
            "launch took {:?}",
            start.elapsed()
        );

        // All handlers still run exactly once, eventually.
        let deadline = Instant::now() + Duration::from_secs(2);
        while counter.load(Ordering::SeqCst) < 3 {
            assert!(Instant::now() < deadline, "handlers never completed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn mode_flag_can_be_toggled_between_triggers() {
        let event = OrderedEvent::<u64>::new();
        assert!(!event.is_async());

        event.set_async(true);
        assert!(event.is_async());

        event.set_async(false);
        assert!(!event.is_async());
    }
}
