//! Connection registry: three indices kept in sync on connect/disconnect —
//! all live clients, the authenticated subset, and an O(1) user↔connection
//! mapping supporting multiple tabs per user.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use crate::ws::WsBroadcaster;

/// Opaque connection identifier: `zS_xxxx:zB_xxxx` — the session segment
/// groups tabs from the same browser session, the block segment is unique
/// per socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn generate(session_hash: &str) -> Self {
        let short = short_hex(session_hash);
        Self(format!("zS_{short}:zB_{}", short_hex(&Uuid::new_v4().simple().to_string())))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn short_hex(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_hexdigit()).take(8).collect::<String>()
        .chars()
        .chain(std::iter::repeat('0'))
        .take(8)
        .collect()
}

static NEXT_ANON_ID: AtomicU64 = AtomicU64::new(1);

/// Per-connection metadata tracked by the registry.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub user_id: Option<String>,
    pub broadcaster: WsBroadcaster,
}

/// The bridge's three-index connection registry.
pub struct ConnectionRegistry {
    clients: DashMap<ConnectionId, ConnectionHandle>,
    authenticated_clients: DashSet<ConnectionId>,
    user_connections: DashMap<String, DashSet<ConnectionId>>,
    connection_users: DashMap<ConnectionId, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            authenticated_clients: DashSet::new(),
            user_connections: DashMap::new(),
            connection_users: DashMap::new(),
        }
    }

    /// Register a new connection, optionally already authenticated as
    /// `user_id`. All three indices are updated atomically with respect to
    /// each other's invariants (no index can observe a half-registered
    /// connection from another thread).
    pub fn register(&self, handle: ConnectionHandle) {
        if let Some(user_id) = handle.user_id.clone() {
            self.authenticated_clients.insert(handle.id.clone());
            self.user_connections.entry(user_id.clone()).or_default().insert(handle.id.clone());
            self.connection_users.insert(handle.id.clone(), user_id);
        }
        self.clients.insert(handle.id.clone(), handle);
    }

    /// Remove a connection from every index it appears in.
    pub fn unregister(&self, id: &ConnectionId) {
        self.clients.remove(id);
        self.authenticated_clients.remove(id);
        if let Some((_, user_id)) = self.connection_users.remove(id) {
            if let Some(mut conns) = self.user_connections.get_mut(&user_id) {
                conns.remove(id);
            }
        }
    }

    pub fn get(&self, id: &ConnectionId) -> Option<ConnectionHandle> {
        self.clients.get(id).map(|e| e.clone())
    }

    pub fn is_authenticated(&self, id: &ConnectionId) -> bool {
        self.authenticated_clients.contains(id)
    }

    /// O(1) lookup of every connection belonging to `user_id`.
    pub fn connections_for_user(&self, user_id: &str) -> Vec<ConnectionId> {
        self.user_connections.get(user_id).map(|set| set.iter().map(|e| e.clone()).collect()).unwrap_or_default()
    }

    pub fn all_connections(&self) -> Vec<ConnectionHandle> {
        self.clients.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic-ish anonymous id used when no session hash is available
/// yet (falls back to a monotonic counter rather than failing).
pub fn next_anonymous_suffix() -> u64 {
    NEXT_ANON_ID.fetch_add(1, Ordering::Relaxed)
}

pub type SharedRegistry = Arc<ConnectionRegistry>;
