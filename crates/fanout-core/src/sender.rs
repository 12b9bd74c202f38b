//! Sender capability for dispatch provenance.
//!
//! A [`Sender`] is the minimal identity passed alongside a payload so handlers
//! know where a trigger came from. The engine never inspects it beyond passing
//! it through; triggers where provenance is irrelevant pass `None`.

use std::sync::Arc;

/// A minimal identity exposed to handlers during dispatch.
pub trait Sender: Send + Sync {
    /// Returns the human-readable name of this sender.
    fn name(&self) -> &str;
}

/// A type-erased, shareable sender.
///
/// Wrapped in an `Arc` so concurrent dispatch can hand each spawned handler
/// its own reference.
pub type BoxedSender = Arc<dyn Sender>;

/// A sender that is nothing but a static name.
///
/// Convenient for collaborators that only need to label their triggers:
///
/// ```rust,ignore
/// let sender: BoxedSender = Arc::new(NamedSender::new("user-service"));
/// event.trigger(Some(sender), payload).await;
/// ```
#[derive(Debug, Clone)]
pub struct NamedSender {
    name: String,
}

impl NamedSender {
    /// Creates a sender with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Sender for NamedSender {
    fn name(&self) -> &str {
        &self.name
    }
}
