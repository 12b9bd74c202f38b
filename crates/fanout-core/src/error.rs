//! Unified error types for the fanout core engine.
//!
//! Registration is the only fallible surface: triggering, removal, and
//! introspection are total over any input.

use thiserror::Error;

use crate::event::HandlerId;

/// Errors that can occur when registering a handler on a keyed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registration was attempted without a handler.
    #[error("no handler supplied for id {id}")]
    MissingHandler {
        /// The id the caller tried to bind.
        id: HandlerId,
    },

    /// The id is already bound to another handler.
    #[error("handler id {id} already registered")]
    DuplicateId {
        /// The colliding id.
        id: HandlerId,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
