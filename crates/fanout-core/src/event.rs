//! The keyed event engine.
//!
//! An [`Event<T>`] is a registry binding [`HandlerId`]s to handlers over one
//! payload type, with two trigger modes:
//!
//! - [`trigger`](Event::trigger) — blocking: every handler is awaited in turn
//!   and the call returns only after all of them have completed;
//! - [`trigger_async`](Event::trigger_async) — fire-and-forget: every handler
//!   runs on its own task and the call returns as soon as all tasks are
//!   launched.
//!
//! Mutual exclusion ([`Locker`]) and pre/post-trigger observation
//! ([`Watcher`]) are injected per instance; an event that gets neither pays
//! for neither.
//!
//! # Payload sharing
//!
//! The engine is parametric over the payload type chosen at construction
//! time. `Event<P>` hands every handler an independent clone of the payload;
//! `Event<Arc<P>>` hands every handler the same shared instance. The choice
//! is visible to concurrently dispatched handlers: under `Arc`, one handler's
//! view of interior-mutable state is every handler's view.
//!
//! # Example
//!
//! ```rust,ignore
//! use fanout_core::{Event, HandlerId, into_handler};
//!
//! let event = Event::<String>::new();
//! event
//!     .register(HandlerId(1), Some(into_handler(|_sender, name: String| async move {
//!         println!("hello {name}");
//!     })))
//!     .await?;
//!
//! event.trigger(None, "fanout".to_string()).await;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{RegistryError, RegistryResult};
use crate::handler::{BoxedHandler, into_handler};
use crate::locker::{BoxedLocker, Locker};
use crate::sender::BoxedSender;
use crate::watcher::BoxedWatcher;

/// An opaque handler identifier.
///
/// Carries no meaning to the engine beyond uniqueness and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for HandlerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A keyed event instance: one registry, one payload type.
///
/// Intended usage is one process-lifetime instance per named event kind,
/// shared behind an `Arc` (or a `LazyLock` static) once configured. All
/// registry operations take `&self`; only watcher/locker configuration takes
/// `&mut self`, which makes "configure before concurrent use begins" a
/// compile-time fact rather than a convention.
pub struct Event<T> {
    handlers: RwLock<HashMap<HandlerId, BoxedHandler<T>>>,
    watcher: Option<BoxedWatcher<T>>,
    locker: Option<BoxedLocker>,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Event<T> {
    /// Creates an empty event with no watcher and no locker.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            watcher: None,
            locker: None,
        }
    }

    /// Attaches a watcher observing every handler invocation.
    pub fn set_watcher(&mut self, watcher: BoxedWatcher<T>) {
        self.watcher = Some(watcher);
    }

    /// Attaches a locker serializing registry operations and triggers.
    pub fn set_locker(&mut self, locker: BoxedLocker) {
        self.locker = Some(locker);
    }

    /// Acquires the injected locker, if any, returning a guard that releases
    /// it on drop.
    async fn lock(&self) -> Option<LockerGuard<'_>> {
        match &self.locker {
            Some(locker) => {
                locker.acquire().await;
                Some(LockerGuard(locker.as_ref()))
            }
            None => None,
        }
    }
}

impl<T> Event<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Registers a handler under `id`.
    ///
    /// Fails with [`RegistryError::MissingHandler`] if no handler is supplied
    /// (rejected before any lock is taken) and with
    /// [`RegistryError::DuplicateId`] if the id is already bound; the registry
    /// is left unchanged in both cases.
    pub async fn register(
        &self,
        id: HandlerId,
        handler: Option<BoxedHandler<T>>,
    ) -> RegistryResult<()> {
        let Some(handler) = handler else {
            return Err(RegistryError::MissingHandler { id });
        };

        let _guard = self.lock().await;
        let mut handlers = self.handlers.write();
        if handlers.contains_key(&id) {
            return Err(RegistryError::DuplicateId { id });
        }

        handlers.insert(id, handler);
        debug!(%id, "handler registered");
        Ok(())
    }

    /// Registers an async function or closure under `id`.
    ///
    /// Convenience wrapper around [`register`](Self::register).
    pub async fn register_fn<F, Fut>(&self, id: HandlerId, f: F) -> RegistryResult<()>
    where
        F: Fn(Option<BoxedSender>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(id, Some(into_handler(f))).await
    }

    /// Removes the handler bound to `id`, if any. Idempotent.
    pub async fn unregister(&self, id: HandlerId) {
        let _guard = self.lock().await;
        if self.handlers.write().remove(&id).is_some() {
            debug!(%id, "handler unregistered");
        }
    }

    /// Removes every registered handler, atomically with respect to the
    /// locker.
    pub async fn clear(&self) {
        let _guard = self.lock().await;
        let mut handlers = self.handlers.write();
        let removed = handlers.len();
        handlers.clear();
        if removed > 0 {
            debug!(removed, "registry cleared");
        }
    }

    /// Returns whether a handler is bound to `id`.
    pub async fn contains(&self, id: HandlerId) -> bool {
        let _guard = self.lock().await;
        self.handlers.read().contains_key(&id)
    }

    /// Returns the number of registered handlers.
    pub async fn count(&self) -> usize {
        let _guard = self.lock().await;
        self.handlers.read().len()
    }

    /// Dispatches `payload` to every registered handler, blocking until all
    /// of them have completed.
    ///
    /// The locker, if any, is held for the entire call. For each handler (in
    /// unspecified order) the watcher's before-hook, the handler itself, and
    /// the after-hook run strictly in that order; the after-hook fires even
    /// if the handler panics. A handler that registers, unregisters, or
    /// triggers this same event reentrantly will deadlock under a
    /// non-reentrant locker.
    pub async fn trigger(&self, sender: Option<BoxedSender>, payload: T) {
        let _guard = self.lock().await;
        let snapshot = self.snapshot();
        debug!(handlers = snapshot.len(), "trigger");

        for (id, handler) in snapshot {
            if let Some(watcher) = &self.watcher {
                watcher.before_trigger(id, sender.as_deref(), &payload);
            }
            run_handler(
                self.watcher.clone(),
                id,
                handler,
                sender.clone(),
                payload.clone(),
            )
            .await;
        }
    }

    /// Dispatches `payload` to every registered handler on independent tasks
    /// and returns without awaiting their completion.
    ///
    /// The locker is held only while the tasks are launched: every
    /// before-hook runs synchronously before any handler, and the lock is
    /// released once the launch loop completes, not when handlers finish. A
    /// handler still running may therefore race with later registry
    /// mutations, and completion order across handlers is unspecified. A
    /// caller that needs a completion signal attaches a
    /// [`TriggerBarrier`](crate::TriggerBarrier) as the watcher.
    pub async fn trigger_async(&self, sender: Option<BoxedSender>, payload: T) {
        let _guard = self.lock().await;
        let snapshot = self.snapshot();
        debug!(handlers = snapshot.len(), "trigger (concurrent)");

        for (id, handler) in snapshot {
            if let Some(watcher) = &self.watcher {
                watcher.before_trigger(id, sender.as_deref(), &payload);
            }
            trace!(%id, "launching handler task");
            tokio::spawn(run_handler(
                self.watcher.clone(),
                id,
                handler,
                sender.clone(),
                payload.clone(),
            ));
        }
    }

    /// Snapshots the registry so dispatch never holds the map lock across a
    /// handler await.
    fn snapshot(&self) -> Vec<(HandlerId, BoxedHandler<T>)> {
        self.handlers
            .read()
            .iter()
            .map(|(id, handler)| (*id, handler.clone()))
            .collect()
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handler_count", &self.handlers.read().len())
            .field("has_watcher", &self.watcher.is_some())
            .field("has_locker", &self.locker.is_some())
            .finish()
    }
}

/// Releases the injected locker on drop.
struct LockerGuard<'a>(&'a dyn Locker);

impl Drop for LockerGuard<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Runs one handler with its after-hook armed.
///
/// The after-hook lives in a drop guard so it fires when the handler returns
/// and also during unwind if it panics; the panic itself is not caught.
async fn run_handler<T>(
    watcher: Option<BoxedWatcher<T>>,
    id: HandlerId,
    handler: BoxedHandler<T>,
    sender: Option<BoxedSender>,
    payload: T,
) where
    T: Clone + Send + Sync + 'static,
{
    let _after = AfterGuard {
        watcher,
        id,
        sender: sender.clone(),
        payload: payload.clone(),
    };
    handler.handle(sender, payload).await;
}

struct AfterGuard<T> {
    watcher: Option<BoxedWatcher<T>>,
    id: HandlerId,
    sender: Option<BoxedSender>,
    payload: T,
}

impl<T> Drop for AfterGuard<T> {
    fn drop(&mut self) {
        if let Some(watcher) = &self.watcher {
            watcher.after_trigger(self.id, self.sender.as_deref(), &self.payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use super::*;
    use crate::locker::MutexLocker;
    use crate::sender::{NamedSender, Sender};
    use crate::watcher::{TriggerBarrier, Watcher};

    fn counting_handler(counter: &Arc<AtomicUsize>) -> BoxedHandler<u64> {
        let counter = Arc::clone(counter);
        into_handler(move |_sender, _payload: u64| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn count_and_contains_track_registrations() {
        let event = Event::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for id in 1..=3 {
            event
                .register(HandlerId(id), Some(counting_handler(&counter)))
                .await
                .unwrap();
        }

        assert_eq!(event.count().await, 3);
        assert!(event.contains(HandlerId(2)).await);
        assert!(!event.contains(HandlerId(9)).await);

        event.unregister(HandlerId(2)).await;
        assert_eq!(event.count().await, 2);
        assert!(!event.contains(HandlerId(2)).await);

        // Idempotent removal.
        event.unregister(HandlerId(2)).await;
        assert_eq!(event.count().await, 2);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_and_keep_the_first_handler() {
        let event = Event::<u64>::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        event
            .register(HandlerId(1), Some(counting_handler(&first)))
            .await
            .unwrap();

        let err = event
            .register(HandlerId(1), Some(counting_handler(&second)))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId { id: HandlerId(1) });
        assert_eq!(event.count().await, 1);

        event.trigger(None, 0).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registering_without_a_handler_is_rejected() {
        let event = Event::<u64>::new();

        let err = event.register(HandlerId(1), None).await.unwrap_err();
        assert_eq!(err, RegistryError::MissingHandler { id: HandlerId(1) });
        assert_eq!(event.count().await, 0);
    }

    #[tokio::test]
    async fn clear_empties_the_registry() {
        let event = Event::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for id in 1..=4 {
            event
                .register(HandlerId(id), Some(counting_handler(&counter)))
                .await
                .unwrap();
        }

        event.clear().await;
        assert_eq!(event.count().await, 0);
        for id in 1..=4 {
            assert!(!event.contains(HandlerId(id)).await);
        }
    }

    #[tokio::test]
    async fn triggering_with_no_handlers_is_a_no_op() {
        let mut event = Event::<u64>::new();
        event.set_locker(Arc::new(MutexLocker::new()));

        event.trigger(None, 1).await;
        event.trigger_async(None, 2).await;
        assert_eq!(event.count().await, 0);
    }

    #[tokio::test]
    async fn handlers_receive_the_sender() {
        let event = Event::<u64>::new();
        let seen = Arc::new(Mutex::new(String::new()));
        let seen_clone = Arc::clone(&seen);

        event
            .register_fn(HandlerId(1), move |sender, _payload| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    if let Some(sender) = sender {
                        seen.lock().unwrap().push_str(sender.name());
                    }
                }
            })
            .await
            .unwrap();

        let sender: BoxedSender = Arc::new(NamedSender::new("sample"));
        event.trigger(Some(sender), 0).await;
        assert_eq!(seen.lock().unwrap().as_str(), "sample");
    }

    #[derive(Default)]
    struct RecordingWatcher {
        log: Mutex<Vec<String>>,
    }

    impl Watcher<u64> for RecordingWatcher {
        fn before_trigger(&self, id: HandlerId, _sender: Option<&dyn Sender>, payload: &u64) {
            self.log.lock().unwrap().push(format!("before {id} {payload}"));
        }

        fn after_trigger(&self, id: HandlerId, _sender: Option<&dyn Sender>, payload: &u64) {
            self.log.lock().unwrap().push(format!("after {id} {payload}"));
        }
    }

    #[tokio::test]
    async fn watcher_hooks_pair_around_each_handler() {
        let watcher = Arc::new(RecordingWatcher::default());
        let mut event = Event::<u64>::new();
        event.set_watcher(watcher.clone());

        let log = Arc::new(Mutex::new(Vec::new()));
        for id in [1u64, 2] {
            let log = Arc::clone(&log);
            event
                .register_fn(HandlerId(id), move |_sender, _payload| {
                    let log = Arc::clone(&log);
                    async move {
                        log.lock().unwrap().push(id);
                    }
                })
                .await
                .unwrap();
        }

        event.trigger(None, 7).await;

        let hooks = watcher.log.lock().unwrap();
        assert_eq!(hooks.len(), 4);
        // Each handler's pair is strictly ordered: before at even index,
        // matching after right behind it.
        for pair in hooks.chunks(2) {
            let id = pair[0].strip_prefix("before ").unwrap();
            let after = pair[1].strip_prefix("after ").unwrap();
            assert_eq!(id, after);
        }
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blocking_trigger_waits_for_the_slowest_handler() {
        let event = Event::<u64>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for (id, delay_ms) in [(1u64, 50u64), (2, 100), (3, 150)] {
            let counter = Arc::clone(&counter);
            event
                .register_fn(HandlerId(id), move |_sender, _payload| {
                    let counter = Arc::clone(&counter);
                    async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await
                .unwrap();
        }

        let start = Instant::now();
        event.trigger(None, 0).await;

        assert!(start.elapsed() >= Duration::from_millis(150));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_trigger_returns_before_handlers_finish() {
        let barrier = Arc::new(TriggerBarrier::new());
        let mut event = Event::<u64>::new();
        event.set_watcher(barrier.clone());
        event.set_locker(Arc::new(MutexLocker::new()));

        let counter = Arc::new(AtomicUsize::new(0));
        for (id, delay_ms) in [(1u64, 100u64), (2, 200), (3, 300)] {
            let counter = Arc::clone(&counter);
            event
                .register_fn(HandlerId(id), move |_sender, _payload| {
                    let counter = Arc::clone(&counter);
                    async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await
                .unwrap();
        }

        let start = Instant::now();
        event.trigger_async(None, 0).await;
        assert!(
            start.elapsed() < Duration::from_millis(80),
            "launch took {:?}",
            start.elapsed()
        );

        barrier.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn shared_payload_is_one_instance_under_concurrent_dispatch() {
        let barrier = Arc::new(TriggerBarrier::new());
        let mut event = Event::<Arc<AtomicUsize>>::new();
        event.set_watcher(barrier.clone());

        for id in 1..=3u64 {
            event
                .register_fn(HandlerId(id), |_sender, payload: Arc<AtomicUsize>| async move {
                    payload.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
        }

        let shared = Arc::new(AtomicUsize::new(0));
        event.trigger_async(None, Arc::clone(&shared)).await;
        barrier.wait().await;

        assert_eq!(shared.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_mutation_under_a_locker_keeps_the_registry_sound() {
        let barrier = Arc::new(TriggerBarrier::new());
        let mut event = Event::<u64>::new();
        event.set_locker(Arc::new(MutexLocker::new()));
        event.set_watcher(barrier.clone());
        let event = Arc::new(event);

        for i in 0..30u64 {
            let reentrant = Arc::clone(&event);
            event
                .register_fn(HandlerId(i), move |_sender, value: u64| {
                    let event = Arc::clone(&reentrant);
                    async move {
                        // Handlers run outside the lock under concurrent
                        // dispatch, so mutating the same event is safe here.
                        event.unregister(HandlerId(value)).await;
                    }
                })
                .await
                .unwrap();

            event.trigger_async(None, i).await;

            if i % 5 == 0 {
                event.clear().await;
            }
        }

        barrier.wait().await;

        // No duplicates survived and the registry is still usable.
        let remaining = event.count().await;
        assert!(remaining <= 30);
        event
            .register(
                HandlerId(1000),
                Some(counting_handler(&Arc::new(AtomicUsize::new(0)))),
            )
            .await
            .unwrap();
        assert!(event.contains(HandlerId(1000)).await);
    }
}
