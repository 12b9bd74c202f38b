//! User flows that trigger the named events.

use std::sync::Arc;

use fanout_core::{BoxedSender, NamedSender};
use time::OffsetDateTime;

use crate::events::{
    SAMPLE, SAMPLE_REF, SamplePayload, USER_CREATED, USER_DELETED, UserCreatedPayload,
    UserDeletedPayload,
};

fn service_sender() -> BoxedSender {
    Arc::new(NamedSender::new("user-service"))
}

/// Creates a user and notifies every registered collaborator.
pub async fn create_user() {
    // ... persistence would happen here ...
    let payload = Arc::new(UserCreatedPayload {
        email: "new.user@example.com".to_string(),
        at: OffsetDateTime::now_utc(),
    });
    USER_CREATED.trigger(Some(service_sender()), payload).await;
}

/// Deletes a user and notifies every registered collaborator.
pub async fn delete_user() {
    // ... persistence would happen here ...
    let payload = UserDeletedPayload {
        email: "deleted.user@example.com".to_string(),
        at: OffsetDateTime::now_utc(),
    };
    USER_DELETED.trigger(Some(service_sender()), payload).await;
}

/// Publishes sample payloads in both dispatch modes.
pub async fn sample_publish() {
    SAMPLE
        .trigger(SamplePayload {
            name: "Sample".to_string(),
        })
        .await;

    SAMPLE.set_async(true);
    SAMPLE
        .trigger(SamplePayload {
            name: "Async Sample".to_string(),
        })
        .await;

    SAMPLE_REF
        .trigger(Arc::new(SamplePayload {
            name: "Ref Sample".to_string(),
        }))
        .await;
}
