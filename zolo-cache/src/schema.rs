//! `schema` tier: live database connection handles with transaction
//! control. Handles are never serialized — only connection metadata is
//! mirrored for inspection via [`SchemaTier::list`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::error::CacheError;

/// A live connection handle. Implementors own the actual DB adapter; this
/// trait is the minimal surface the schema tier needs to manage it.
pub trait SchemaHandle: Send + Sync {
    fn backend_name(&self) -> &str;
    fn begin_transaction(&self) -> Result<(), CacheError>;
    fn commit(&self) -> Result<(), CacheError>;
    fn rollback(&self) -> Result<(), CacheError>;
    fn disconnect(&self) -> Result<(), CacheError>;
}

struct ConnectionEntry {
    handle: Box<dyn SchemaHandle>,
    backend: String,
    connected_at: SystemTime,
    transaction_active: AtomicBool,
}

pub struct SchemaTier {
    connections: DashMap<String, ConnectionEntry>,
}

/// Metadata about a live connection, returned by [`SchemaTier::list`].
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub alias: String,
    pub backend: String,
    pub age: Duration,
    pub transaction_active: bool,
}

impl SchemaTier {
    pub fn new() -> Self {
        Self { connections: DashMap::new() }
    }

    pub fn set(&self, alias: &str, handle: Box<dyn SchemaHandle>) {
        let backend = handle.backend_name().to_string();
        self.connections.insert(
            alias.to_string(),
            ConnectionEntry {
                handle,
                backend,
                connected_at: SystemTime::now(),
                transaction_active: AtomicBool::new(false),
            },
        );
    }

    pub fn has(&self, alias: &str) -> bool {
        self.connections.contains_key(alias)
    }

    pub fn begin(&self, alias: &str) -> Result<(), CacheError> {
        let entry = self
            .connections
            .get(alias)
            .ok_or_else(|| CacheError::NoConnection(alias.to_string()))?;
        entry.handle.begin_transaction()?;
        entry.transaction_active.store(true, Ordering::SeqCst);
        info!(alias, "transaction started");
        Ok(())
    }

    pub fn commit(&self, alias: &str) -> Result<(), CacheError> {
        let entry = self
            .connections
            .get(alias)
            .ok_or_else(|| CacheError::NoConnection(alias.to_string()))?;
        entry.handle.commit()?;
        entry.transaction_active.store(false, Ordering::SeqCst);
        info!(alias, "transaction committed");
        Ok(())
    }

    pub fn rollback(&self, alias: &str) -> Result<(), CacheError> {
        let entry = self
            .connections
            .get(alias)
            .ok_or_else(|| CacheError::NoConnection(alias.to_string()))?;
        entry.handle.rollback()?;
        entry.transaction_active.store(false, Ordering::SeqCst);
        warn!(alias, "transaction rolled back");
        Ok(())
    }

    pub fn is_transaction_active(&self, alias: &str) -> bool {
        self.connections
            .get(alias)
            .map(|e| e.transaction_active.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn disconnect(&self, alias: &str) {
        if let Some((_, entry)) = self.connections.remove(alias) {
            if let Err(err) = entry.handle.disconnect() {
                warn!(alias, error = %err, "error disconnecting");
            }
        }
    }

    /// Disconnect every live connection. Individual failures are logged and
    /// never propagated — a best-effort sweep, matching the original's
    /// `finally`-guaranteed cleanup semantics.
    pub fn clear(&self) {
        let aliases: Vec<String> = self.connections.iter().map(|e| e.key().clone()).collect();
        for alias in aliases {
            self.disconnect(&alias);
        }
    }

    pub fn list(&self) -> Vec<ConnectionInfo> {
        self.connections
            .iter()
            .map(|e| ConnectionInfo {
                alias: e.key().clone(),
                backend: e.value().backend.clone(),
                age: e.value().connected_at.elapsed().unwrap_or_default(),
                transaction_active: e.value().transaction_active.load(Ordering::SeqCst),
            })
            .collect()
    }
}

impl Default for SchemaTier {
    fn default() -> Self {
        Self::new()
    }
}
