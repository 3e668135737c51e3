//! The notifier component.
//!
//! Owns the webhook targets for its whole lifetime, listens to the four
//! permission event kinds and relays each rendered event to every target.

use crate::bus::{EventSource, PermissionListener};
use crate::config::{Config, WebhookTargets};
use crate::delivery::{DeliveryOutcome, Dispatcher, HttpTransport, Transport};
use crate::error::{NotificationError, Result};
use crate::event::{EventKind, PermissionEvent};
use crate::message::render;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of starting the notifier.
///
/// A disabled notifier never subscribed to anything and stays that way until
/// the host restarts it with new configuration.
pub enum Activation {
    Active(Arc<Notifier>),
    Disabled(NotificationError),
}

impl Activation {
    pub fn is_active(&self) -> bool {
        matches!(self, Activation::Active(_))
    }
}

/// Relays permission events to Discord webhooks.
pub struct Notifier {
    targets: WebhookTargets,
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(targets: WebhookTargets, dispatcher: Dispatcher) -> Self {
        Self {
            targets,
            dispatcher,
        }
    }

    /// Validates configuration and subscribes to `source` using the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingDependency`] if there is no event
    /// source, or a network error if the HTTP client cannot be built.
    /// Configuration problems are not errors; they yield [`Activation::Disabled`].
    pub fn start(config: &Config, source: Option<&dyn EventSource>) -> Result<Activation> {
        Self::start_inner(config, source, || {
            let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.timeout())?);
            Ok(transport)
        })
    }

    /// Same as [`Notifier::start`] with a caller-supplied transport.
    pub fn start_with(
        config: &Config,
        source: Option<&dyn EventSource>,
        transport: Arc<dyn Transport>,
    ) -> Result<Activation> {
        Self::start_inner(config, source, || Ok(transport))
    }

    /// Configuration is checked first, then the event source; the transport
    /// is only built once both are usable.
    fn start_inner<F>(config: &Config, source: Option<&dyn EventSource>, transport: F) -> Result<Activation>
    where
        F: FnOnce() -> Result<Arc<dyn Transport>>,
    {
        let targets = match Self::validate(config) {
            Ok(targets) => targets,
            Err(reason) => return Ok(Activation::Disabled(reason)),
        };
        let source = source.ok_or(NotificationError::MissingDependency)?;

        Ok(Self::activate(targets, source, transport()?))
    }

    fn validate(config: &Config) -> Result<WebhookTargets> {
        config.targets().map_err(|reason| {
            match &reason {
                NotificationError::NoEffectiveTargets => {
                    warn!("No webhook URLs found. Disabling notifier.")
                }
                other => warn!("{}. Disabling notifier.", other),
            }
            reason
        })
    }

    fn activate(
        targets: WebhookTargets,
        source: &dyn EventSource,
        transport: Arc<dyn Transport>,
    ) -> Activation {
        let notifier = Arc::new(Notifier::new(targets, Dispatcher::new(transport)));
        for kind in EventKind::ALL {
            source.subscribe(kind, notifier.clone());
        }

        info!(targets = notifier.targets.len(), "Permission webhook notifier has been enabled.");
        Activation::Active(notifier)
    }

    /// Stops the notifier. Unsubscribing is left to the host.
    pub fn stop(&self) {
        info!("Permission webhook notifier has been disabled.");
    }

    pub fn targets(&self) -> &WebhookTargets {
        &self.targets
    }

    /// Renders `event` and delivers it to every target.
    pub async fn notify(&self, event: &PermissionEvent) -> Vec<DeliveryOutcome> {
        let message = render(event);
        debug!(kind = %event.kind(), "Relaying permission event");
        self.dispatcher.deliver(&self.targets, &message).await
    }
}

#[async_trait]
impl PermissionListener for Notifier {
    async fn on_event(&self, event: &PermissionEvent) {
        self.notify(event).await;
    }
}
