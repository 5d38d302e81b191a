//! WebSocket Bridge: connection registry, wire protocol, and non-blocking
//! broadcast on top of the ergonomic `WsStream`/`WsHandler` layer.

pub mod bridge;
pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod wire;
pub mod ws;

pub mod prelude;

pub use bridge::{accept, disconnect, shutdown, sync_shutdown, validate_origin, OriginDecision};
pub use broadcast::{broadcast as broadcast_message, send_to_user};
pub use connection::{ConnectionHandle, ConnectionId, ConnectionRegistry, SharedRegistry};
pub use dispatcher::{handle_form_submit, handle_menu_selection, validate_cache_ttl, PausedRun, PausedRunStore};
pub use error::BridgeError;
pub use events::{clear_cache_scope, is_builtin, ClearCacheScope, BUILTIN_EVENTS};
