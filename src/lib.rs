//! permwebhook - relays permission-change events to Discord webhooks.
//!
//! The notifier subscribes to permission events (node added, removed, cleared and
//! remote log entries), renders each into a short message and posts it to every
//! configured webhook.
//!
//! # Architecture
//!
//! - **Event**: read-only permission events, parsed from JSON
//! - **Config**: the `webhook_url` setting and its placeholder filtering
//! - **Message**: event-to-text rendering and the `@everyone` rule
//! - **Delivery**: one POST per webhook, sequential, failures contained
//! - **Notifier**: lifecycle glue subscribing to an [`EventSource`]
//!
//! # Examples
//!
//! ```no_run
//! use permwebhook::{process_event, Activation, Config, EventBus, Notifier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.json")?;
//!     let bus = EventBus::new();
//!
//!     if let Activation::Active(_) = Notifier::start(&config, Some(&bus))? {
//!         let event_json = r#"{"kind": "removed", "principal": "Steve", "key": "perm.*"}"#;
//!         process_event(event_json, &bus).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod message;
pub mod notifier;

// Re-export commonly used types at the crate root
pub use bus::{EventBus, EventSource, PermissionListener};
pub use config::{Config, WebhookTargets};
pub use delivery::{DeliveryOutcome, Dispatcher, HttpTransport, Transport};
pub use error::{NotificationError, Result};
pub use event::{EventKind, Node, PermissionEvent};
pub use notifier::{Activation, Notifier};

/// Parses a single event and publishes it on `bus`.
///
/// Returns the number of listeners the event was dispatched to.
///
/// # Errors
///
/// Returns an error if the event JSON cannot be parsed. Delivery failures are
/// logged by the notifier and never surface here.
pub async fn process_event(event_json: &str, bus: &EventBus) -> Result<usize> {
    let event = PermissionEvent::from_json(event_json)?;
    Ok(bus.publish(&event).await)
}
