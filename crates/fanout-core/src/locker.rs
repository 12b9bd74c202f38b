//! Injectable mutual exclusion for keyed events.
//!
//! A [`Locker`] serializes an event's registry operations when the
//! collaborator attaches one; when absent, the engine performs no
//! cross-operation synchronization and concurrent coordination is the
//! caller's responsibility.
//!
//! The locker is held across all handler invocations of a blocking trigger.
//! A handler that mutates or triggers the same event instance from within its
//! own invocation will deadlock under a non-reentrant locker such as
//! [`MutexLocker`]; that pattern is only safe under concurrent dispatch,
//! where handlers run outside the lock.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

/// An injectable mutual-exclusion primitive.
///
/// `acquire`/`release` are split (rather than guard-based) so the primitive
/// stays object-safe and implementations can bridge to whatever
/// synchronization the collaborator already manages.
#[async_trait]
pub trait Locker: Send + Sync {
    /// Acquires the lock, suspending until it is available.
    async fn acquire(&self);

    /// Releases the lock.
    fn release(&self);
}

/// A type-erased, shareable locker.
pub type BoxedLocker = Arc<dyn Locker>;

/// The default [`Locker`]: a non-reentrant async mutex.
///
/// Backed by a single-permit semaphore so that release does not need to
/// happen on the acquiring task.
#[derive(Debug)]
pub struct MutexLocker {
    permit: Semaphore,
}

impl MutexLocker {
    /// Creates an unlocked locker.
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1),
        }
    }
}

impl Default for MutexLocker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Locker for MutexLocker {
    async fn acquire(&self) {
        // The semaphore is owned by this locker and never closed.
        if let Ok(permit) = self.permit.acquire().await {
            permit.forget();
        }
    }

    fn release(&self) {
        self.permit.add_permits(1);
    }
}
