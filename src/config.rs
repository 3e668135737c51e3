//! Configuration system for permwebhook.
//!
//! This module handles loading the JSON configuration file and turning the raw
//! `webhook_url` setting into the list of webhook targets.

use crate::error::{NotificationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Values shipped in the default configuration. They count as "unset".
pub const PLACEHOLDER_URLS: [&str; 2] = ["WEBHOOK_URL", "https://discord.com/api/webhooks/..."];

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// A single URL or a list of URLs. Kept raw so the shape can be validated
    /// at activation time.
    #[serde(default)]
    pub webhook_url: Value,

    /// Upper bound for a single webhook request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl fmt::Debug for Config {
    // Discord webhook URLs embed their token, so only the shape is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.webhook_url {
            Value::String(_) => "string".to_string(),
            Value::Array(items) => format!("list of {}", items.len()),
            Value::Null => "missing".to_string(),
            _ => "invalid".to_string(),
        };
        f.debug_struct("Config")
            .field("webhook_url", &shape)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: Value::String(PLACEHOLDER_URLS[0].to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// The ordered list of webhook URLs notifications are sent to.
///
/// Never empty; duplicates are kept and order follows the configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTargets(Vec<String>);

impl fmt::Debug for WebhookTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTargets")
            .field("count", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl WebhookTargets {
    /// Builds the target list from a raw `webhook_url` value.
    ///
    /// A string becomes a one-element list. In a list, strings are kept,
    /// numbers and booleans are stringified and nested values are skipped.
    /// Secret references are resolved, then placeholders and blank entries
    /// are dropped.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::ConfigShape`] if the value is neither a string nor a list
    /// - [`NotificationError::InvalidConfig`] if a secret reference cannot be resolved
    /// - [`NotificationError::NoEffectiveTargets`] if nothing usable remains
    pub fn from_value(raw: &Value) -> Result<Self> {
        let candidates: Vec<String> = match raw {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect(),
            _ => return Err(NotificationError::ConfigShape),
        };

        let mut urls = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let url = resolve_secret_string(&candidate)?;
            if url.trim().is_empty() || PLACEHOLDER_URLS.contains(&url.as_str()) {
                continue;
            }
            urls.push(url);
        }

        if urls.is_empty() {
            return Err(NotificationError::NoEffectiveTargets);
        }

        Ok(Self(urls))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Config {
    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            NotificationError::InvalidConfig(format!("Failed to read config file: {}", e))
        })?;

        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| NotificationError::InvalidConfig(format!("Invalid JSON: {}", e)))?;

        Ok(config)
    }

    /// Writes the default configuration to `path` unless a file already exists.
    ///
    /// Returns `true` if a file was written.
    pub fn save_default<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let defaults = Config::default();
        let content = serde_json::to_string_pretty(&json!({
            "webhook_url": defaults.webhook_url,
            "timeout_secs": defaults.timeout_secs,
        }))
        .map_err(|e| NotificationError::InvalidConfig(format!("Failed to encode defaults: {}", e)))?;
        fs::write(path, content + "\n")?;

        Ok(true)
    }

    /// Validates `webhook_url` and returns the effective targets.
    pub fn targets(&self) -> Result<WebhookTargets> {
        WebhookTargets::from_value(&self.webhook_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Resolves secret references in a configured URL.
///
/// Supports:
/// - `{{env.VAR_NAME}}` - Environment variables
/// - `{{file.path/to/file}}` - Read from file
fn resolve_secret_string(s: &str) -> Result<String> {
    let mut result = s.to_string();

    // Environment variables: {{env.VAR_NAME}}
    if let Some(start) = result.find("{{env.") {
        if let Some(end) = result[start..].find("}}") {
            let var_name = result[start + 6..start + end].to_string();
            let value = std::env::var(&var_name).map_err(|_| {
                NotificationError::InvalidConfig(format!(
                    "Environment variable not found: {}",
                    var_name
                ))
            })?;
            result = result.replace(&format!("{{{{env.{}}}}}", var_name), &value);
        }
    }

    // File: {{file.path/to/file}}
    if let Some(start) = result.find("{{file.") {
        if let Some(end) = result[start..].find("}}") {
            let file_path = result[start + 7..start + end].to_string();
            let expanded_path = shellexpand::tilde(&file_path);
            let value = fs::read_to_string(expanded_path.as_ref())
                .map_err(|e| {
                    NotificationError::InvalidConfig(format!(
                        "Failed to read file {}: {}",
                        file_path, e
                    ))
                })?
                .trim()
                .to_string();
            result = result.replace(&format!("{{{{file.{}}}}}", file_path), &value);
        }
    }

    Ok(result)
}
