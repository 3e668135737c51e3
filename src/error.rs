//! Error types for permwebhook.
//!
//! Configuration errors decide whether the notifier activates at all. Delivery
//! errors never leave the dispatcher; they are turned into outcomes and logged.

use thiserror::Error;

/// Errors that can occur while loading, activating or delivering notifications.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// `webhook_url` is neither a string nor a list of strings.
    #[error("Invalid format for webhook_url. Must be string or list of strings.")]
    ConfigShape,

    /// Every configured URL was a placeholder, or the list was empty.
    #[error("No webhook URLs found")]
    NoEffectiveTargets,

    /// Failed to read or parse the configuration file.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The permission event source is not available to subscribe to.
    #[error("Permission event source not found")]
    MissingDependency,

    /// Failed to parse an incoming permission event.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Network request failed before a status code was received.
    #[error("Network request failed: {0}")]
    Network(String),

    /// Generic I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotificationError>;
