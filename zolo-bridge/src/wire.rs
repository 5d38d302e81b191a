//! The JSON wire protocol: client→server and server→client message shapes.
//! All messages are flat JSON objects; client messages carry a required
//! `event` field, server messages are tagged by Serde's internal tagging so
//! `event` still appears as a field on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A raw inbound message before its `event` field has been validated.
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    pub event: Option<String>,
    #[serde(flatten)]
    pub payload: JsonValue,
}

/// `{error: "Invalid message format", message: "..."}` — the response to a
/// missing-`event` or unparsable inbound message.
#[derive(Debug, Serialize)]
pub struct InvalidMessageResponse {
    pub error: &'static str,
    pub message: String,
}

impl InvalidMessageResponse {
    pub fn missing_event() -> Self {
        Self { error: "Invalid message format", message: "The 'event' field is required".to_string() }
    }
}

/// `input_response` — `{requestId, value}`.
#[derive(Debug, Deserialize)]
pub struct InputResponse {
    pub request_id: String,
    pub value: JsonValue,
}

/// `menu_selection` — `{menu_key, selected}`.
#[derive(Debug, Deserialize)]
pub struct MenuSelection {
    pub menu_key: String,
    pub selected: JsonValue,
}

/// `form_submit` — `{block, data}`.
#[derive(Debug, Deserialize)]
pub struct FormSubmit {
    pub block: String,
    pub data: JsonValue,
}

/// `get_schema` — `{model}`.
#[derive(Debug, Deserialize)]
pub struct GetSchema {
    pub model: String,
}

/// `set_cache_ttl` — `{ttl}`.
#[derive(Debug, Deserialize)]
pub struct SetCacheTtl {
    pub ttl: u64,
}

/// `page_unload` — `{reason, timestamp}`.
#[derive(Debug, Deserialize)]
pub struct PageUnload {
    pub reason: String,
    pub timestamp: i64,
}

/// `connection_info` (s→c) — `{server_version, features, cache_stats,
/// available_models?, session}`.
#[derive(Debug, Serialize)]
pub struct ConnectionInfoEvent {
    pub event: &'static str,
    pub server_version: String,
    pub features: Vec<String>,
    pub cache_stats: JsonValue,
    pub available_models: Option<Vec<String>>,
    pub session: JsonValue,
}

impl ConnectionInfoEvent {
    pub fn new(server_version: impl Into<String>, features: Vec<String>, cache_stats: JsonValue, session: JsonValue) -> Self {
        Self { event: "connection_info", server_version: server_version.into(), features, cache_stats, available_models: None, session }
    }
}

/// `render_chunk` (s→c) — `{keys, is_gate, value?}`.
#[derive(Debug, Serialize)]
pub struct RenderChunkEvent {
    pub event: &'static str,
    pub keys: Vec<String>,
    pub is_gate: bool,
    pub value: Option<JsonValue>,
}

/// `menu_selected` (s→c) — `{menu_key, selected, success}`.
#[derive(Debug, Serialize)]
pub struct MenuSelectedEvent {
    pub event: &'static str,
    pub menu_key: String,
    pub selected: JsonValue,
    pub success: bool,
}

/// `server_shutdown` (s→c) — `{message}`.
#[derive(Debug, Serialize)]
pub struct ServerShutdownEvent {
    pub event: &'static str,
    pub message: String,
}

impl ServerShutdownEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self { event: "server_shutdown", message: message.into() }
    }
}

/// `error` (s→c) — `{error, message | details}`.
#[derive(Debug, Serialize)]
pub struct ErrorEvent {
    pub event: &'static str,
    pub error: String,
    pub message: Option<String>,
}

impl ErrorEvent {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self { event: "error", error: error.into(), message: Some(message.into()) }
    }
}

/// Reject an invalid `Origin` header with close code 1008.
pub const CLOSE_CODE_INVALID_ORIGIN: u16 = 1008;

pub const CACHE_TTL_MIN: u64 = 1;
pub const CACHE_TTL_MAX: u64 = 3600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_message_response_matches_contract() {
        let resp = InvalidMessageResponse::missing_event();
        assert_eq!(resp.error, "Invalid message format");
        assert_eq!(resp.message, "The 'event' field is required");
    }

    #[test]
    fn inbound_envelope_parses_missing_event_as_none() {
        let parsed: InboundEnvelope = serde_json::from_str(r#"{"foo": "bar"}"#).unwrap();
        assert!(parsed.event.is_none());
    }
}
