//! Permission event types.
//!
//! This module defines the read-only view of the permission events the notifier
//! subscribes to. Events arrive as JSON objects tagged by `kind`.

use crate::error::{NotificationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    #[serde(default = "default_value")]
    pub value: bool,
}

impl Node {
    pub fn new(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

fn default_value() -> bool {
    true
}

fn default_context() -> String {
    "{}".to_string()
}

/// A permission-change event emitted by the permission system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionEvent {
    /// A node was added to a principal.
    Added {
        principal: String,
        key: String,
        #[serde(default = "default_value")]
        value: bool,
        /// Rendered context set, e.g. `{server=survival}`
        #[serde(default = "default_context")]
        context: String,
    },

    /// A node was removed from a principal.
    Removed { principal: String, key: String },

    /// Every node of a principal was cleared.
    Cleared {
        principal: String,
        #[serde(default)]
        nodes: Vec<Node>,
    },

    /// A change made on another server, received through the action log.
    RemoteLogEntry {
        target_name: String,
        target_id: String,
        description: String,
        actor_name: String,
    },
}

/// The event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Removed,
    Cleared,
    RemoteLogEntry,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Added,
        EventKind::Removed,
        EventKind::Cleared,
        EventKind::RemoteLogEntry,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Added => "added",
            EventKind::Removed => "removed",
            EventKind::Cleared => "cleared",
            EventKind::RemoteLogEntry => "remote_log_entry",
        };
        f.write_str(name)
    }
}

impl PermissionEvent {
    /// Parses an event from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or does not describe a known
    /// event kind.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(json))
            .map_err(|e| NotificationError::InvalidEvent(e.to_string()))
    }

    /// Returns the kind this event is dispatched under.
    pub fn kind(&self) -> EventKind {
        match self {
            PermissionEvent::Added { .. } => EventKind::Added,
            PermissionEvent::Removed { .. } => EventKind::Removed,
            PermissionEvent::Cleared { .. } => EventKind::Cleared,
            PermissionEvent::RemoteLogEntry { .. } => EventKind::RemoteLogEntry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_added_with_defaults() {
        let json = r#"{"kind": "added", "principal": "Steve", "key": "group.admin"}"#;
        let event = PermissionEvent::from_json(json).unwrap();
        assert_eq!(
            event,
            PermissionEvent::Added {
                principal: "Steve".to_string(),
                key: "group.admin".to_string(),
                value: true,
                context: "{}".to_string(),
            }
        );
        assert_eq!(event.kind(), EventKind::Added);
    }

    #[test]
    fn test_parse_cleared_keeps_node_order() {
        let json = r#"{"kind": "cleared", "principal": "Alex", "nodes": [
            {"key": "b.node", "value": false},
            {"key": "a.node"}
        ]}"#;
        let event = PermissionEvent::from_json(json).unwrap();
        match event {
            PermissionEvent::Cleared { nodes, .. } => {
                assert_eq!(nodes, vec![Node::new("b.node", false), Node::new("a.node", true)]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_remote_log_entry() {
        let json = r#"{"kind": "remote_log_entry", "target_name": "Steve",
            "target_id": "069a79f4-44e9-4726-a5be-fca90e38aaf5",
            "description": "permission set essentials.*", "actor_name": "Console"}"#;
        let event = PermissionEvent::from_json(json).unwrap();
        assert_eq!(event.kind(), EventKind::RemoteLogEntry);
    }

    #[test]
    fn test_unknown_kind() {
        let json = r#"{"kind": "promoted", "principal": "Steve"}"#;
        assert!(PermissionEvent::from_json(json).is_err());
    }

    #[test]
    fn test_wrong_field_type() {
        let json = r#"{"kind": "removed", "principal": "Steve", "key": 5}"#;
        let err = PermissionEvent::from_json(json).unwrap_err();
        assert!(matches!(err, NotificationError::InvalidEvent(_)));
    }
}
