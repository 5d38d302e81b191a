//! Connection lifecycle and shutdown. Event dispatch itself is
//! application-defined (the handler table lives with whatever wires the
//! Loop Engine to the bridge); this module owns what's generic: accept,
//! origin validation, registration, disconnect cleanup, and shutdown.

use axum::extract::ws::Message;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::wire::CLOSE_CODE_INVALID_ORIGIN;

/// Outcome of validating an incoming connection's `Origin` header against
/// an allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Accept,
    /// Reject with close code 1008.
    Reject,
}

/// An empty allowlist accepts any origin (no restriction configured);
/// otherwise the origin must appear verbatim in the list.
pub fn validate_origin(origin: Option<&str>, allowed: &[String]) -> OriginDecision {
    if allowed.is_empty() {
        return OriginDecision::Accept;
    }
    match origin {
        Some(o) if allowed.iter().any(|a| a == o) => OriginDecision::Accept,
        _ => OriginDecision::Reject,
    }
}

pub const REJECTED_ORIGIN_CLOSE_CODE: u16 = CLOSE_CODE_INVALID_ORIGIN;

/// Register a newly-accepted connection and return its assigned id.
pub fn accept(registry: &ConnectionRegistry, handle: ConnectionHandle) -> ConnectionId {
    let id = handle.id.clone();
    registry.register(handle);
    id
}

/// Disconnect cleanup: remove from every index. Callers are additionally
/// responsible for clearing that connection's paused generator and private
/// schema cache (owned by whatever holds those, not this registry).
pub fn disconnect(registry: &ConnectionRegistry, id: &ConnectionId) {
    registry.unregister(id);
}

/// `shutdown(timeout)`: notify every client, then the caller closes each
/// connection and the listening socket with a bounded wait. This function
/// only does the notification half — the actual socket/task teardown is
/// owned by whatever accepted the connections.
pub async fn shutdown(registry: &ConnectionRegistry, message: impl Into<String>) {
    let event = crate::wire::ServerShutdownEvent::new(message);
    let payload = serde_json::to_string(&event).unwrap_or_default();
    crate::broadcast::broadcast(registry, Message::Text(payload.into()), None);
}

/// `sync_shutdown`: used when called from inside a running event loop.
/// Skips notification, clears every index immediately.
pub fn sync_shutdown(registry: &ConnectionRegistry) {
    for handle in registry.all_connections() {
        registry.unregister(&handle.id);
    }
}
