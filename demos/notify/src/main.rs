//! Notify Demo
//!
//! A small end-to-end demonstration of the fanout engine: notifier
//! collaborators register handlers against process-wide named events at
//! startup, then user flows trigger those events in both dispatch modes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package notify-demo
//! ```

mod events;
mod notifiers;
mod user;

use std::time::Duration;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = fanout_runtime::config::load_config()?;
    fanout_runtime::logging::init_from_config(&config.logging);

    notifiers::wire().await?;

    user::create_user().await;
    user::delete_user().await;

    user::sample_publish().await;

    // Give fire-and-forget handlers a moment to finish before the process
    // exits.
    tokio::time::sleep(Duration::from_secs(1)).await;

    Ok(())
}
