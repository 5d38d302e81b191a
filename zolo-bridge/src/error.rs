#[derive(Debug)]
pub enum BridgeError {
    /// The inbound message wasn't valid JSON, or was missing `event`.
    InvalidMessage(String),
    /// No handler registered for this event name.
    UnknownEvent(String),
    /// The target connection/user isn't registered.
    NoSuchConnection(String),
    /// A gate/menu resume was requested for a connection with no paused run.
    NothingPaused(String),
    /// `set_cache_ttl` outside the allowed `1..=3600` range.
    TtlOutOfRange(u64),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::InvalidMessage(msg) => write!(f, "invalid message format: {msg}"),
            BridgeError::UnknownEvent(name) => write!(f, "unknown event: {name}"),
            BridgeError::NoSuchConnection(id) => write!(f, "no such connection: {id}"),
            BridgeError::NothingPaused(id) => write!(f, "no paused run for connection: {id}"),
            BridgeError::TtlOutOfRange(ttl) => write!(f, "ttl {ttl} out of range 1..=3600"),
        }
    }
}

impl std::error::Error for BridgeError {}

zolo_core::map_error! {
    BridgeError => Connection,
}
