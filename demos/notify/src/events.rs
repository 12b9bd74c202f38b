//! The process-wide named events.
//!
//! Each named event is a singleton instance with process lifetime:
//! constructed once on first use, registered against during startup, and
//! never torn down. The payload type chosen here decides what concurrently
//! dispatched handlers observe — `USER_CREATED` shares one payload instance
//! across handlers, `USER_DELETED` hands each handler its own clone, and the
//! two sample events mirror that split for the ordered engine.

use std::sync::{Arc, LazyLock};

use fanout_core::{Event, OrderedEvent};
use time::OffsetDateTime;

/// Payload for the user-created event.
#[derive(Debug, Clone)]
pub struct UserCreatedPayload {
    /// Email of the new user.
    pub email: String,
    /// When the user was created.
    pub at: OffsetDateTime,
}

/// Payload for the user-deleted event.
#[derive(Debug, Clone)]
pub struct UserDeletedPayload {
    /// Email of the removed user.
    pub email: String,
    /// When the user was deleted.
    pub at: OffsetDateTime,
}

/// Payload for the sample events.
#[derive(Debug, Clone)]
pub struct SamplePayload {
    /// A free-form label.
    pub name: String,
}

/// Fired after a user is created. Payload passed by shared reference.
pub static USER_CREATED: LazyLock<Event<Arc<UserCreatedPayload>>> = LazyLock::new(Event::new);

/// Fired after a user is deleted. Payload passed by value.
pub static USER_DELETED: LazyLock<Event<UserDeletedPayload>> = LazyLock::new(Event::new);

/// The ordered sample event; its dispatch mode is toggled between triggers.
pub static SAMPLE: LazyLock<OrderedEvent<SamplePayload>> = LazyLock::new(OrderedEvent::new);

/// The shared-payload variant of the sample event.
pub static SAMPLE_REF: LazyLock<OrderedEvent<Arc<SamplePayload>>> = LazyLock::new(OrderedEvent::new);
