//! Handler capability for keyed events.
//!
//! A [`Handler`] is anything exposing a single dispatch operation over a
//! payload type. Two shapes are supported polymorphically:
//!
//! - a stateful object implementing [`Handler`] directly (e.g. a notifier
//!   holding configuration), and
//! - a plain async function or closure, adapted via [`HandlerFn`] /
//!   [`into_handler`].
//!
//! # Example
//!
//! ```rust,ignore
//! use fanout_core::{into_handler, Event, HandlerId};
//!
//! let event = Event::<String>::new();
//! event
//!     .register(HandlerId(1), Some(into_handler(|_sender, payload: String| async move {
//!         println!("got {payload}");
//!     })))
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::sender::BoxedSender;

/// The handler capability for keyed events.
///
/// Dispatch receives the sender capability (if any) plus an owned payload.
/// Whether that payload is an independent copy or a shared instance is the
/// caller's choice of `T`: a plain value type gives every handler its own
/// clone, an `Arc<P>` gives every handler the same instance.
#[async_trait]
pub trait Handler<T>: Send + Sync {
    /// Handles one dispatched payload.
    async fn handle(&self, sender: Option<BoxedSender>, payload: T);
}

/// A type-erased handler stored in the registry.
pub type BoxedHandler<T> = Arc<dyn Handler<T>>;

/// Adapter that lets a plain async function or closure serve as a [`Handler`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wraps a function value as a handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    T: Send + 'static,
    F: Fn(Option<BoxedSender>, T) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn handle(&self, sender: Option<BoxedSender>, payload: T) {
        (self.f)(sender, payload).await;
    }
}

/// Converts an async function or closure into a [`BoxedHandler`].
pub fn into_handler<T, F, Fut>(f: F) -> BoxedHandler<T>
where
    T: Send + 'static,
    F: Fn(Option<BoxedSender>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(HandlerFn::new(f))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn function_handlers_satisfy_the_capability() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let handler = into_handler(move |_sender, payload: u32| {
            let calls = Arc::clone(&calls_clone);
            async move {
                calls.fetch_add(payload as usize, Ordering::SeqCst);
            }
        });

        handler.handle(None, 2).await;
        handler.handle(None, 3).await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
