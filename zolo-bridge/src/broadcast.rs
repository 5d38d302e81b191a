//! Non-blocking broadcast and user-targeted send: one task per recipient,
//! never awaited by the caller, so a slow client never delays a fast one.

use axum::extract::ws::Message;

use crate::connection::{ConnectionId, ConnectionRegistry};

/// Broadcast `message` to every connected client (optionally skipping
/// `sender`). Each send runs on its own task; connection-closed errors are
/// swallowed since a disconnect mid-broadcast isn't exceptional.
pub fn broadcast(registry: &ConnectionRegistry, message: Message, sender: Option<&ConnectionId>) {
    for handle in registry.all_connections() {
        if Some(&handle.id) == sender {
            continue;
        }
        let broadcaster = handle.broadcaster.clone();
        let message = message.clone();
        tokio::spawn(async move {
            broadcaster.send(message);
        });
    }
}

/// Send `message` to every connection belonging to `user_id`. Returns the
/// number of connections a send was queued for (an O(1) index lookup, not
/// a scan of all clients).
pub fn send_to_user(registry: &ConnectionRegistry, user_id: &str, message: Message) -> usize {
    let connections = registry.connections_for_user(user_id);
    let count = connections.len();
    for id in connections {
        if let Some(handle) = registry.get(&id) {
            let broadcaster = handle.broadcaster.clone();
            let message = message.clone();
            tokio::spawn(async move {
                broadcaster.send(message);
            });
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionHandle;
    use crate::ws::WsBroadcaster;

    fn handle(id: &str, user: Option<&str>) -> ConnectionHandle {
        ConnectionHandle {
            id: ConnectionId(id.to_string()),
            user_id: user.map(String::from),
            broadcaster: WsBroadcaster::new(8),
        }
    }

    #[tokio::test]
    async fn send_to_user_returns_count_of_that_users_connections() {
        let registry = ConnectionRegistry::new();
        registry.register(handle("c1", Some("u1")));
        registry.register(handle("c2", Some("u1")));
        registry.register(handle("c3", Some("u2")));

        let count = send_to_user(&registry, "u1", Message::Text("hi".to_string().into()));
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn send_to_user_for_unknown_user_returns_zero() {
        let registry = ConnectionRegistry::new();
        let count = send_to_user(&registry, "ghost", Message::Text("hi".to_string().into()));
        assert_eq!(count, 0);
    }
}
