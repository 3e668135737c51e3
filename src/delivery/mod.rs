//! Webhook delivery.
//!
//! This module defines the transport trait and the dispatcher that fans a
//! message out to every configured webhook target.

use crate::config::WebhookTargets;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub mod webhook;

pub use webhook::HttpTransport;

/// Status code a webhook answers with on success.
pub const SUCCESS_STATUS: u16 = 204;

/// Trait for the HTTP transport behind the dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as JSON to `url` and returns the response status code.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received at all.
    async fn post_json(&self, url: &str, body: &Value) -> Result<u16>;
}

/// Outcome of delivering one message to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The webhook answered 204
    Delivered,
    /// The webhook answered with any other status
    Rejected(u16),
    /// The request failed before a status was received
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Builds the JSON body posted to a Discord webhook.
pub fn build_payload(message: &str) -> Value {
    json!({ "content": message })
}

/// Sends messages to webhook targets one after another.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Delivers `message` to every target in configuration order.
    ///
    /// Each target gets exactly one attempt. A failure is logged and the next
    /// target is tried; nothing is returned as an error.
    pub async fn deliver(&self, targets: &WebhookTargets, message: &str) -> Vec<DeliveryOutcome> {
        let payload = build_payload(message);
        let mut outcomes = Vec::with_capacity(targets.len());

        for (index, url) in targets.iter().enumerate() {
            debug!(target_index = index, "Posting notification to webhook");

            let outcome = match self.transport.post_json(url, &payload).await {
                Ok(SUCCESS_STATUS) => {
                    info!(target_index = index, "Message successfully sent to Discord.");
                    DeliveryOutcome::Delivered
                }
                Ok(status) => {
                    warn!(
                        target_index = index,
                        "Failed to send message to Discord. Response code: {}", status
                    );
                    DeliveryOutcome::Rejected(status)
                }
                Err(e) => {
                    error!(
                        target_index = index,
                        "An error occurred while sending the message to Discord: {}", e
                    );
                    DeliveryOutcome::Failed(e.to_string())
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
