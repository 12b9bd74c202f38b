//! # Fanout Core
//!
//! A typed, in-process event-dispatch engine.
//!
//! A *fanout event* is a registry bound to one payload type: collaborators
//! register handlers against it during initialization, and triggering
//! collaborators later dispatch payloads to every registered handler. Two
//! registry shapes cover the two call patterns the engine supports:
//!
//! - [`Event<T>`] — the **keyed** engine. Handlers are addressed by an
//!   explicit [`HandlerId`] with duplicate detection, removal, and
//!   introspection. Mutual exclusion ([`Locker`]) and pre/post-trigger
//!   observation ([`Watcher`]) are injected per instance. Dispatch carries an
//!   optional [`Sender`] capability plus the payload, either blocking
//!   ([`Event::trigger`]) or fire-and-forget concurrent
//!   ([`Event::trigger_async`]).
//! - [`OrderedEvent<T>`] — the **ordered** engine. Handlers are kept in
//!   registration order with no identifiers; a per-instance flag selects
//!   synchronous vs fire-and-forget dispatch, and dispatch carries only the
//!   payload.
//!
//! ```text
//! ┌──────────────┐  register   ┌────────────┐  dispatch  ┌───────────┐
//! │  Notifier    │────────────▶│  Event<T>  │───────────▶│  Handler  │
//! │ collaborator │             │ (registry) │───────────▶│  Handler  │
//! └──────────────┘   trigger   └────────────┘───────────▶│  Handler  │
//!        ─────────────────────▶                          └───────────┘
//! ```
//!
//! Delivery is best-effort, exactly once per registered handler per trigger:
//! no persistence, no retry, no cross-process transport, and no ordering
//! guarantee among concurrently dispatched handlers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fanout_core::{Event, HandlerId};
//!
//! #[derive(Clone)]
//! struct UserCreated {
//!     email: String,
//! }
//!
//! let event = Event::<UserCreated>::new();
//!
//! event
//!     .register_fn(HandlerId(1), |_sender, payload: UserCreated| async move {
//!         println!("welcome {}", payload.email);
//!     })
//!     .await?;
//!
//! event
//!     .trigger(None, UserCreated { email: "new.user@example.com".into() })
//!     .await;
//! ```

pub mod error;
pub mod event;
pub mod handler;
pub mod locker;
pub mod ordered;
pub mod sender;
pub mod watcher;

pub use error::{RegistryError, RegistryResult};
pub use event::{Event, HandlerId};
pub use handler::{BoxedHandler, Handler, HandlerFn, into_handler};
pub use locker::{BoxedLocker, Locker, MutexLocker};
pub use ordered::{
    BoxedOrderedHandler, OrderedEvent, OrderedHandler, OrderedHandlerFn, into_ordered_handler,
};
pub use sender::{BoxedSender, NamedSender, Sender};
pub use watcher::{BoxedWatcher, TriggerBarrier, Watcher};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{RegistryError, RegistryResult};
    pub use super::event::{Event, HandlerId};
    pub use super::handler::{BoxedHandler, Handler, into_handler};
    pub use super::locker::{Locker, MutexLocker};
    pub use super::ordered::{OrderedEvent, OrderedHandler, into_ordered_handler};
    pub use super::sender::{BoxedSender, NamedSender, Sender};
    pub use super::watcher::{TriggerBarrier, Watcher};
}
