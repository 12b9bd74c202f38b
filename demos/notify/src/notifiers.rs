//! Notifier collaborators.
//!
//! These construct handlers (stateful objects and plain closures) and
//! register them against the named events during startup. The "emails" and
//! Slack webhook calls are simulated with log output.

use std::sync::Arc;

use async_trait::async_trait;
use fanout_core::{BoxedSender, Handler, HandlerId, OrderedHandler};
use time::OffsetDateTime;
use tracing::info;

use crate::events::{
    SAMPLE, SAMPLE_REF, SamplePayload, USER_CREATED, USER_DELETED, UserCreatedPayload,
    UserDeletedPayload,
};

/// Registers every notifier against its event. Called once at startup.
pub async fn wire() -> anyhow::Result<()> {
    let created = UserCreatedNotifier {
        admin_email: "the.boss@example.com".to_string(),
        slack_hook: "https://hooks.slack.com/services/create".to_string(),
    };
    USER_CREATED.register(HandlerId(1), Some(Arc::new(created))).await?;

    let deleted = UserDeletedNotifier {
        admin_email: "the.boss@example.com".to_string(),
        slack_hook: "https://hooks.slack.com/services/delete".to_string(),
    };
    USER_DELETED.register(HandlerId(1), Some(Arc::new(deleted))).await?;

    // Both handler shapes on the ordered event: an object and a closure.
    SAMPLE.register(Arc::new(SampleNotifier));
    SAMPLE.register_fn(|payload: SamplePayload| async move {
        info!(name = %payload.name, "sample closure handler");
    });

    SAMPLE_REF.register_fn(|payload: Arc<SamplePayload>| async move {
        info!(
            name = %payload.name,
            instance = ?Arc::as_ptr(&payload),
            "sample ref handler 1"
        );
    });
    SAMPLE_REF.register_fn(|payload: Arc<SamplePayload>| async move {
        info!(
            name = %payload.name,
            instance = ?Arc::as_ptr(&payload),
            "sample ref handler 2"
        );
    });

    Ok(())
}

/// Notifies the admin and a Slack channel when a user is created.
struct UserCreatedNotifier {
    admin_email: String,
    slack_hook: String,
}

impl UserCreatedNotifier {
    fn notify_admin(&self, email: &str, at: OffsetDateTime) {
        info!(admin = %self.admin_email, user = email, %at, "admin notified: user created");
    }

    fn send_to_slack(&self, email: &str, at: OffsetDateTime) {
        let body = serde_json::json!({
            "text": format!("user {email} created at {at}"),
        });
        info!(hook = %self.slack_hook, %body, "slack webhook: user created");
    }
}

#[async_trait]
impl Handler<Arc<UserCreatedPayload>> for UserCreatedNotifier {
    async fn handle(&self, sender: Option<BoxedSender>, payload: Arc<UserCreatedPayload>) {
        if let Some(sender) = &sender {
            info!(from = sender.name(), "user-created trigger received");
        }
        self.notify_admin(&payload.email, payload.at);
        self.send_to_slack(&payload.email, payload.at);
    }
}

/// Notifies the admin and a Slack channel when a user is deleted.
struct UserDeletedNotifier {
    admin_email: String,
    slack_hook: String,
}

impl UserDeletedNotifier {
    fn notify_admin(&self, email: &str, at: OffsetDateTime) {
        info!(admin = %self.admin_email, user = email, %at, "admin notified: user deleted");
    }

    fn send_to_slack(&self, email: &str, at: OffsetDateTime) {
        let body = serde_json::json!({
            "text": format!("user {email} deleted at {at}"),
        });
        info!(hook = %self.slack_hook, %body, "slack webhook: user deleted");
    }
}

#[async_trait]
impl Handler<UserDeletedPayload> for UserDeletedNotifier {
    async fn handle(&self, _sender: Option<BoxedSender>, payload: UserDeletedPayload) {
        self.notify_admin(&payload.email, payload.at);
        self.send_to_slack(&payload.email, payload.at);
    }
}

/// A stateless sample notifier exercising the object handler shape.
struct SampleNotifier;

#[async_trait]
impl OrderedHandler<SamplePayload> for SampleNotifier {
    async fn handle(&self, payload: SamplePayload) {
        info!(name = %payload.name, "sample notifier");
    }
}
