//! Routes the inbound events that resume a suspended [`ChunkedRun`]:
//! `menu_selection` and `form_submit`. Everything else in
//! [`crate::events::BUILTIN_EVENTS`] is awaited inline by whatever wires
//! the Loop Engine to the bridge — this module owns only the piece that's
//! generic across applications: holding the paused generator per
//! connection and driving it forward.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_yaml::Value as YamlValue;

use zolo_core::block::Block;
use zolo_core::session::Session;
use zolo_wizard::engine::{Chunk, ChunkedRun, RunStatus};
use zolo_wizard::{Dispatcher, FunctionRegistry};

use crate::connection::ConnectionId;
use crate::error::BridgeError;
use crate::wire::{RenderChunkEvent, SetCacheTtl, CACHE_TTL_MAX, CACHE_TTL_MIN};

/// Everything needed to drive a suspended [`ChunkedRun`] forward again.
/// Resolved `_data` and the auth flag are snapshotted at suspend time —
/// they don't change while the client is thinking about a form or menu.
pub struct PausedRun {
    pub run: ChunkedRun,
    pub block: Arc<Block>,
    pub session: Session,
    pub resolved_data: HashMap<String, YamlValue>,
    pub auth_available: bool,
}

/// One paused [`ChunkedRun`] per connection, keyed by connection id.
#[derive(Default)]
pub struct PausedRunStore {
    paused: DashMap<ConnectionId, PausedRun>,
}

impl PausedRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a freshly-suspended run for `id`, replacing anything already
    /// paused there.
    pub fn insert(&self, id: ConnectionId, paused: PausedRun) {
        self.paused.insert(id, paused);
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.paused.contains_key(id)
    }

    /// Drop a connection's paused run without resuming it (disconnect
    /// cleanup).
    pub fn drop_paused(&self, id: &ConnectionId) {
        self.paused.remove(id);
    }

    /// Resume the run paused for `id` with `resumed_input`. Re-parks it if
    /// still paused afterwards, removes it once the run is `Done`.
    async fn resume(
        &self,
        id: &ConnectionId,
        resumed_input: Option<YamlValue>,
        dispatcher: &dyn Dispatcher,
        functions: &dyn FunctionRegistry,
    ) -> Result<Chunk, BridgeError> {
        let mut entry = self.paused.get_mut(id).ok_or_else(|| BridgeError::NothingPaused(id.to_string()))?;
        let PausedRun { run, block, session, resolved_data, auth_available } = &mut *entry;

        let chunk = run
            .resume(block.as_ref(), &*resolved_data, &*session, dispatcher, functions, *auth_available, None, resumed_input)
            .await
            .map_err(|e| BridgeError::InvalidMessage(e.to_string()))?;

        let done = matches!(run.status, RunStatus::Done);
        drop(entry);
        if done {
            self.paused.remove(id);
        }
        Ok(chunk)
    }
}

/// `menu_selection` — `{menu_key, selected}`. Appends `menu_key` to the
/// active scope's breadcrumb trail, then resumes the paused run with
/// `selected` as the result of the suspended menu step.
pub async fn handle_menu_selection(
    store: &PausedRunStore,
    id: &ConnectionId,
    menu_key: &str,
    selected: YamlValue,
    dispatcher: &dyn Dispatcher,
    functions: &dyn FunctionRegistry,
) -> Result<RenderChunkEvent, BridgeError> {
    {
        let mut entry = store.paused.get_mut(id).ok_or_else(|| BridgeError::NothingPaused(id.to_string()))?;
        let scope = entry.session.scope_key();
        zolo_nav::breadcrumbs::append(&mut entry.session.crumbs, &scope, menu_key);
    }

    let chunk = store.resume(id, Some(selected), dispatcher, functions).await?;
    Ok(render_chunk_event(chunk))
}

/// `form_submit` — `{block, data}`. `block` identifies which gate's form is
/// being answered; the paused run is keyed by connection, not by block, so
/// it's accepted here for wire-contract completeness but the resume
/// targets whatever run is actually paused for this connection.
pub async fn handle_form_submit(
    store: &PausedRunStore,
    id: &ConnectionId,
    data: YamlValue,
    dispatcher: &dyn Dispatcher,
    functions: &dyn FunctionRegistry,
) -> Result<RenderChunkEvent, BridgeError> {
    let chunk = store.resume(id, Some(data), dispatcher, functions).await?;
    Ok(render_chunk_event(chunk))
}

fn render_chunk_event(chunk: Chunk) -> RenderChunkEvent {
    RenderChunkEvent {
        event: "render_chunk",
        keys: chunk.keys,
        is_gate: chunk.is_gate,
        value: chunk.gate_value.map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null)),
    }
}

/// `set_cache_ttl` — `{ttl}`, rejected outside `CACHE_TTL_MIN..=CACHE_TTL_MAX`.
pub fn validate_cache_ttl(payload: &SetCacheTtl) -> Result<u64, BridgeError> {
    if (CACHE_TTL_MIN..=CACHE_TTL_MAX).contains(&payload.ttl) {
        Ok(payload.ttl)
    } else {
        Err(BridgeError::TtlOutOfRange(payload.ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use zolo_core::block::StepValue;
    use zolo_wizard::{DispatchContext, EngineError};

    struct EchoDispatcher;

    #[async_trait]
    impl Dispatcher for EchoDispatcher {
        async fn dispatch(
            &self,
            _key: &str,
            value: &StepValue,
            _ctx: &DispatchContext<'_>,
        ) -> Result<Option<YamlValue>, EngineError> {
            Ok(Some(value.inner().clone()))
        }
    }

    struct NoFunctions;
    impl FunctionRegistry for NoFunctions {
        fn call(&self, _name: &str, _args: &[YamlValue]) -> Option<YamlValue> {
            None
        }
    }

    fn block_from_yaml(yaml: &str) -> Block {
        let mapping: indexmap::IndexMap<YamlValue, YamlValue> = serde_yaml::from_str(yaml).unwrap();
        Block::from_yaml_mapping(&mapping)
    }

    async fn paused_gate_run(id: &ConnectionId, store: &PausedRunStore) {
        let block = Arc::new(block_from_yaml("A: one\n\"B!\": {form: true}\nC: three\n"));
        let mut run = ChunkedRun::new(&block);
        run.resume(&block, &HashMap::new(), &Session::new("h"), &EchoDispatcher, &NoFunctions, true, None, None)
            .await
            .unwrap();

        store.insert(
            id.clone(),
            PausedRun {
                run,
                block,
                session: Session::new("h"),
                resolved_data: HashMap::new(),
                auth_available: true,
            },
        );
    }

    #[tokio::test]
    async fn resume_with_no_paused_run_errors() {
        let store = PausedRunStore::new();
        let id = ConnectionId("c1".to_string());
        let err = store.resume(&id, None, &EchoDispatcher, &NoFunctions).await.unwrap_err();
        assert!(matches!(err, BridgeError::NothingPaused(_)));
    }

    #[tokio::test]
    async fn form_submit_resumes_the_paused_gate() {
        let store = PausedRunStore::new();
        let id = ConnectionId("c1".to_string());
        paused_gate_run(&id, &store).await;

        let event = handle_form_submit(
            &store,
            &id,
            YamlValue::String("submitted".into()),
            &EchoDispatcher,
            &NoFunctions,
        )
        .await
        .unwrap();

        assert_eq!(event.keys, vec!["B!", "C"]);
        assert!(!store.contains(&id));
    }

    #[tokio::test]
    async fn menu_selection_appends_breadcrumb_then_resumes() {
        struct MenuThenEcho;
        #[async_trait]
        impl Dispatcher for MenuThenEcho {
            async fn dispatch(
                &self,
                key: &str,
                value: &StepValue,
                _ctx: &DispatchContext<'_>,
            ) -> Result<Option<YamlValue>, EngineError> {
                if key == "M*" {
                    Ok(None)
                } else {
                    Ok(Some(value.inner().clone()))
                }
            }
        }

        let store = PausedRunStore::new();
        let id = ConnectionId("c1".to_string());
        let block = Arc::new(block_from_yaml("\"M*\": {menu: true}\nC: three\n"));
        let mut run = ChunkedRun::new(&block);
        run.resume(&block, &HashMap::new(), &Session::new("h"), &MenuThenEcho, &NoFunctions, true, None, None)
            .await
            .unwrap();
        store.insert(
            id.clone(),
            PausedRun { run, block, session: Session::new("h"), resolved_data: HashMap::new(), auth_available: true },
        );

        let event = handle_menu_selection(
            &store,
            &id,
            "M*",
            YamlValue::String("option-1".into()),
            &MenuThenEcho,
            &NoFunctions,
        )
        .await
        .unwrap();

        assert_eq!(event.keys, vec!["M*", "C"]);
        assert!(!store.contains(&id));
    }

    #[test]
    fn ttl_within_range_is_accepted() {
        assert_eq!(validate_cache_ttl(&SetCacheTtl { ttl: 60 }).unwrap(), 60);
    }

    #[test]
    fn ttl_below_minimum_is_rejected() {
        assert!(matches!(validate_cache_ttl(&SetCacheTtl { ttl: 0 }), Err(BridgeError::TtlOutOfRange(0))));
    }

    #[test]
    fn ttl_above_maximum_is_rejected() {
        let err = validate_cache_ttl(&SetCacheTtl { ttl: 999_999 }).unwrap_err();
        assert!(matches!(err, BridgeError::TtlOutOfRange(999_999)));
    }
}
