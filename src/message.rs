//! Renders permission events into notification text.

use crate::event::PermissionEvent;

/// Prefix that pings every member of the channel.
pub const BROADCAST_PREFIX: &str = "@everyone ";

const WILDCARD: char = '*';

/// Renders an event into the plain-text message posted to the webhooks.
///
/// Added, removed and remote log events touching a wildcard get the
/// [`BROADCAST_PREFIX`]. Cleared events never do.
///
/// # Examples
///
/// ```
/// use permwebhook::{message::render, PermissionEvent};
///
/// let event = PermissionEvent::Removed {
///     principal: "Steve".to_string(),
///     key: "perm.*".to_string(),
/// };
/// assert_eq!(render(&event), "@everyone **Permission Removed** from Steve : perm.*");
/// ```
pub fn render(event: &PermissionEvent) -> String {
    match event {
        PermissionEvent::Added {
            principal,
            key,
            value,
            context,
        } => broadcast_if(
            key.contains(WILDCARD),
            format!(
                "**Permission Added** for {}( {} = {}@{})",
                principal, key, value, context
            ),
        ),
        PermissionEvent::Removed { principal, key } => broadcast_if(
            key.contains(WILDCARD),
            format!("**Permission Removed** from {} : {}", principal, key),
        ),
        PermissionEvent::Cleared { principal, nodes } => {
            let mut message = format!("**All Permissions Cleared** for {}", principal);
            for node in nodes {
                message.push_str(&format!("\n {} = {}", node.key, node.value));
            }
            message
        }
        PermissionEvent::RemoteLogEntry {
            target_name,
            target_id,
            description,
            actor_name,
        } => broadcast_if(
            description.contains(WILDCARD),
            format!(
                "**Permission Remotely Modified** for {} ({}): {} via {}",
                target_name, target_id, description, actor_name
            ),
        ),
    }
}

fn broadcast_if(wildcard: bool, message: String) -> String {
    if wildcard {
        format!("{}{}", BROADCAST_PREFIX, message)
    } else {
        message
    }
}
