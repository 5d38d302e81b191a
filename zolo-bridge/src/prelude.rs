pub use crate::bridge::{accept, disconnect, shutdown, sync_shutdown, validate_origin, OriginDecision};
pub use crate::broadcast::{broadcast, send_to_user};
pub use crate::connection::{ConnectionHandle, ConnectionId, ConnectionRegistry, SharedRegistry};
pub use crate::dispatcher::{handle_form_submit, handle_menu_selection, validate_cache_ttl, PausedRun, PausedRunStore};
pub use crate::error::BridgeError;
pub use crate::events::{clear_cache_scope, is_builtin, ClearCacheScope, BUILTIN_EVENTS};
pub use crate::wire::{
    ConnectionInfoEvent, ErrorEvent, FormSubmit, GetSchema, InboundEnvelope, InputResponse,
    InvalidMessageResponse, MenuSelectedEvent, MenuSelection, PageUnload, RenderChunkEvent,
    ServerShutdownEvent, SetCacheTtl,
};
pub use crate::ws::{WsBroadcaster, WsBroadcastReceiver, WsError, WsHandler, WsRooms, WsStream};
