//! The Loop Engine: executes an ordered block's steps, gating each on RBAC,
//! resolving `%`/`&` references, dispatching, and interpreting the result
//! as a navigation signal, key-jump, or menu pause.
//!
//! Two strategies share the per-step pipeline in [`step`]: [`run_sequential`]
//! blocks straight through (Terminal/Walker), and [`ChunkedRun`] is an
//! explicit resumable state machine standing in for the two-way generator
//! the original uses for Bifrost mode — Rust has no coroutines, so the
//! suspend points (`!` gates, `*` menu pauses) are modelled as an enum the
//! bridge drives forward by calling `resume`.

use std::collections::HashMap;

use serde_yaml::Value as YamlValue;
use zolo_auth::AuthenticatedUser;
use zolo_core::block::{Block, StepValue};
use zolo_core::session::Session;
use zolo_core::Accumulator;

use crate::dispatch::{DispatchContext, Dispatcher};
use crate::error::EngineError;
use crate::interpolation::{self, FunctionRegistry};
use crate::rbac;
use crate::shorthand;
use crate::signal::{self, Signal};

/// Block-level navigation key shapes (distinct from the step-payload field
/// sigils in [`zolo_core::block::shape`]): a key "contains" one of these
/// characters anywhere, except `^` which must lead.
mod keyshape {
    pub fn is_anchor(key: &str) -> bool {
        key.contains('~')
    }
    pub fn is_menu(key: &str) -> bool {
        key.contains('*')
    }
    pub fn is_gate(key: &str) -> bool {
        key.contains('!')
    }
}

/// Metadata keys (leading `_`) pulled out of a block before iteration:
/// `_data` (pre-resolved queries), `_transaction`, `_config`.
#[derive(Debug, Default)]
pub struct BlockMetadata {
    pub data: Option<YamlValue>,
    pub transaction: bool,
    pub config: Option<YamlValue>,
}

/// Split a block into its metadata and the ordered, executable steps.
pub fn split_metadata(block: &Block) -> (BlockMetadata, Vec<(&str, &StepValue)>) {
    let mut metadata = BlockMetadata::default();
    let mut steps = Vec::new();

    for (key, value) in &block.steps {
        match key.as_str() {
            "_data" => metadata.data = Some(value.inner().clone()),
            "_transaction" => metadata.transaction = value.inner().as_bool().unwrap_or(false),
            "_config" => metadata.config = Some(value.inner().clone()),
            "zRBAC" => {} // block-level RBAC, handled separately by the caller
            _ => steps.push((key.as_str(), value)),
        }
    }

    (metadata, steps)
}

/// Resolve `_data`'s queries via the dispatcher before the block's children
/// run, landing the result under each sub-query's own key for `%data.X`
/// interpolation.
pub async fn resolve_data_metadata(
    data: &YamlValue,
    dispatcher: &dyn Dispatcher,
    ctx: &DispatchContext<'_>,
) -> Result<HashMap<String, YamlValue>, EngineError> {
    let step = StepValue::Data(data.clone());
    let result = dispatcher.dispatch("_data", &step, ctx).await?;
    let mut resolved = HashMap::new();
    if let Some(YamlValue::Mapping(mapping)) = result {
        for (k, v) in mapping {
            if let Some(key) = k.as_str() {
                resolved.insert(key.to_string(), v);
            }
        }
    }
    Ok(resolved)
}

/// What happened after running one step.
pub enum StepOutcome {
    /// No navigation meaning — advance normally (menu loopback still runs).
    Continue,
    /// Jump iteration to this key.
    KeyJump(String),
    /// A terminating or caller-visible navigation signal.
    Signal(Signal),
    /// A menu step whose dispatch returned no selection yet — the chunked
    /// strategy treats this as a pause; the sequential strategy treats it
    /// as "continue" (there's no one to resume it synchronously).
    MenuPause,
}

/// Run the per-step pipeline (§4.2.1) for a single key: shorthand
/// expansion, RBAC, interpolation, dispatch, and result classification.
/// Shared by both execution strategies.
pub async fn step(
    key: &str,
    value: &StepValue,
    block_keys: &[&str],
    accumulator: &mut Accumulator<YamlValue>,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
    dispatcher: &dyn Dispatcher,
    functions: &dyn FunctionRegistry,
    auth_available: bool,
    user: Option<&AuthenticatedUser>,
    bifrost_mode: bool,
) -> Result<StepOutcome, EngineError> {
    let (expanded_key, expanded_value) =
        shorthand::expand(key, value.inner()).unwrap_or_else(|| (key.to_string(), value.inner().clone()));
    let effective = if expanded_key == key { value.clone() } else { StepValue::from_keyed(&expanded_key, expanded_value) };

    match rbac::check(key, effective.inner(), auth_available, user) {
        zolo_auth::RbacOutcome::Granted => {}
        zolo_auth::RbacOutcome::DeniedZGuest { .. } => return Ok(StepOutcome::Signal(Signal::Back)),
        zolo_auth::RbacOutcome::Denied { .. } => return Ok(StepOutcome::Continue),
    }

    let resolved_value = interpolation::resolve(effective.inner(), accumulator, resolved_data, session, functions);
    let resolved_step = StepValue::from_keyed(&expanded_key, resolved_value);

    let ctx = DispatchContext { accumulator, session, bifrost_mode };
    let dispatch_result = dispatcher.dispatch(key, &resolved_step, &ctx).await?;

    let Some(result) = dispatch_result else {
        if keyshape::is_menu(key) {
            return Ok(StepOutcome::MenuPause);
        }
        return Ok(StepOutcome::Continue);
    };

    accumulator.append(key.to_string(), result.clone());

    match signal::classify(&result, block_keys) {
        Some(Signal::KeyJump(target)) => Ok(StepOutcome::KeyJump(target)),
        Some(other) => Ok(StepOutcome::Signal(other)),
        None => Ok(StepOutcome::Continue),
    }
}

/// After a successful step, scan backward from `from_index` for the
/// nearest anchored menu (`~` and `*` both present in the key) and loop
/// back to it; otherwise advance by one.
pub fn menu_loopback(keys: &[&str], from_index: usize) -> usize {
    for i in (0..=from_index).rev() {
        let k = keys[i];
        if keyshape::is_menu(k) && keyshape::is_anchor(k) {
            return i;
        }
    }
    from_index + 1
}

/// Sequential strategy (Terminal/Walker): run 4.2.1 straight through until
/// the block ends or a terminating signal is produced.
#[allow(clippy::too_many_arguments)]
pub async fn run_sequential(
    block: &Block,
    resolved_data: &HashMap<String, YamlValue>,
    session: &Session,
    dispatcher: &dyn Dispatcher,
    functions: &dyn FunctionRegistry,
    auth_available: bool,
    user: Option<&AuthenticatedUser>,
    start_key: Option<&str>,
) -> Result<(Accumulator<YamlValue>, Option<Signal>), EngineError> {
    let (_, steps) = split_metadata(block);
    let keys: Vec<&str> = steps.iter().map(|(k, _)| *k).collect();
    let mut accumulator = Accumulator::new();

    let mut index = match start_key {
        Some(k) => keys.iter().position(|&key| key == k).unwrap_or(0),
        None => 0,
    };

    while index < steps.len() {
        let (key, value) = steps[index];
        let outcome = step(
            key,
            value,
            &keys,
            &mut accumulator,
            resolved_data,
            session,
            dispatcher,
            functions,
            auth_available,
            user,
            false,
        )
        .await?;

        match outcome {
            StepOutcome::Signal(signal) => return Ok((accumulator, Some(signal))),
            StepOutcome::KeyJump(target) => {
                index = keys.iter().position(|&k| k == target).unwrap_or(index + 1);
            }
            StepOutcome::MenuPause | StepOutcome::Continue => {
                index = menu_loopback(&keys, index);
            }
        }
    }

    Ok((accumulator, None))
}

/// A chunk yielded by the chunked generator strategy: the keys executed
/// since the last yield, whether this chunk ends on a gate, and the gate's
/// raw value (or a pause/denial sentinel).
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub keys: Vec<String>,
    pub is_gate: bool,
    pub gate_value: Option<YamlValue>,
}

/// Execution status of a [`ChunkedRun`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Paused { at_key: String },
    Done,
}

/// The explicit, resumable state machine standing in for the original's
/// two-way generator. The bridge owns one per paused connection and drives
/// it forward with [`ChunkedRun::resume`].
pub struct ChunkedRun {
    keys: Vec<String>,
    index: usize,
    pub accumulator: Accumulator<YamlValue>,
    pub status: RunStatus,
}

impl ChunkedRun {
    pub fn new(block: &Block) -> Self {
        let (_, steps) = split_metadata(block);
        let keys = steps.iter().map(|(k, _)| k.to_string()).collect();
        Self { keys, index: 0, accumulator: Accumulator::new(), status: RunStatus::Running }
    }

    /// Block-level RBAC denial: yields the sentinel chunk and marks `Done`.
    pub fn deny_block(&mut self) -> Chunk {
        self.status = RunStatus::Done;
        let mut gate_value = serde_yaml::Mapping::new();
        gate_value.insert(YamlValue::String("zRBAC_denied".into()), YamlValue::Bool(true));
        gate_value.insert(YamlValue::String("_signal".into()), YamlValue::String("navigate_back".into()));
        Chunk { keys: Vec::new(), is_gate: false, gate_value: Some(YamlValue::Mapping(gate_value)) }
    }

    /// Advance execution until the next gate, menu pause, or the block's
    /// end. `resumed_input`, if present, becomes the result context for the
    /// step right after a previous pause (a form submission or menu
    /// selection) rather than being dispatched again, and `self.index` is
    /// advanced past it before the loop continues.
    #[allow(clippy::too_many_arguments)]
    pub async fn resume(
        &mut self,
        block: &Block,
        resolved_data: &HashMap<String, YamlValue>,
        session: &Session,
        dispatcher: &dyn Dispatcher,
        functions: &dyn FunctionRegistry,
        auth_available: bool,
        user: Option<&AuthenticatedUser>,
        resumed_input: Option<YamlValue>,
    ) -> Result<Chunk, EngineError> {
        let (_, steps) = split_metadata(block);
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        let mut chunk_keys = Vec::new();

        if let Some(input) = resumed_input {
            if matches!(self.status, RunStatus::Paused { .. }) && self.index < steps.len() {
                let (key, _) = steps[self.index];
                self.accumulator.append(key.to_string(), input.clone());
                chunk_keys.push(key.to_string());
                self.status = RunStatus::Running;

                match signal::classify(&input, &keys) {
                    Some(Signal::KeyJump(target)) => {
                        self.index = self.keys.iter().position(|k| k == &target).unwrap_or(self.index + 1);
                    }
                    Some(other) => {
                        self.status = RunStatus::Done;
                        let _ = other;
                        return Ok(Chunk { keys: chunk_keys, is_gate: false, gate_value: None });
                    }
                    None => {
                        self.index = menu_loopback(&keys, self.index);
                    }
                }
            }
        }

        while self.index < steps.len() {
            let (key, value) = steps[self.index];

            if keyshape::is_gate(key) {
                // gate: yield before dispatch so the frontend can render the form.
                chunk_keys.push(key.to_string());
                self.status = RunStatus::Paused { at_key: key.to_string() };
                let gate_value = Some(value.inner().clone());
                return Ok(Chunk { keys: chunk_keys, is_gate: true, gate_value });
            }

            let outcome = step(
                key,
                value,
                &keys,
                &mut self.accumulator,
                resolved_data,
                session,
                dispatcher,
                functions,
                auth_available,
                user,
                true,
            )
            .await?;

            chunk_keys.push(key.to_string());

            match outcome {
                StepOutcome::MenuPause => {
                    self.status = RunStatus::Paused { at_key: key.to_string() };
                    let mut paused = serde_yaml::Mapping::new();
                    paused.insert(YamlValue::String("_paused".into()), YamlValue::Bool(true));
                    return Ok(Chunk { keys: chunk_keys, is_gate: false, gate_value: Some(YamlValue::Mapping(paused)) });
                }
                StepOutcome::Signal(_) => {
                    self.status = RunStatus::Done;
                    return Ok(Chunk { keys: chunk_keys, is_gate: false, gate_value: None });
                }
                StepOutcome::KeyJump(target) => {
                    self.index = self.keys.iter().position(|k| k == &target).unwrap_or(self.index + 1);
                    continue;
                }
                StepOutcome::Continue => {
                    self.index = menu_loopback(&keys, self.index);
                }
            }
        }

        self.status = RunStatus::Done;
        Ok(Chunk { keys: chunk_keys, is_gate: false, gate_value: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

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

    #[tokio::test]
    async fn sequential_runs_every_step_in_order() {
        let block = block_from_yaml("A: one\nB: two\n");
        let session = Session::new("h");
        let resolved_data = HashMap::new();
        let (accumulator, signal) = run_sequential(
            &block, &resolved_data, &session, &EchoDispatcher, &NoFunctions, true, None, None,
        )
        .await
        .unwrap();
        assert!(signal.is_none());
        assert_eq!(accumulator.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn sequential_stops_on_terminating_signal() {
        let block = block_from_yaml("A: zBack\nB: two\n");
        let session = Session::new("h");
        let resolved_data = HashMap::new();
        let (accumulator, signal) = run_sequential(
            &block, &resolved_data, &session, &EchoDispatcher, &NoFunctions, true, None, None,
        )
        .await
        .unwrap();
        assert_eq!(signal, Some(Signal::Back));
        assert_eq!(accumulator.keys().collect::<Vec<_>>(), vec!["A"]);
    }

    #[tokio::test]
    async fn chunked_run_yields_at_gate() {
        let block = block_from_yaml("A: one\n\"B!\": {form: true}\nC: three\n");
        let mut run = ChunkedRun::new(&block);
        let session = Session::new("h");
        let resolved_data = HashMap::new();
        let chunk = run
            .resume(&block, &resolved_data, &session, &EchoDispatcher, &NoFunctions, true, None, None)
            .await
            .unwrap();
        assert!(chunk.is_gate);
        assert_eq!(chunk.keys, vec!["A", "B!"]);
        assert_eq!(run.status, RunStatus::Paused { at_key: "B!".to_string() });
    }

    #[tokio::test]
    async fn resume_after_gate_consumes_input_and_runs_the_rest() {
        let block = block_from_yaml("A: one\n\"B!\": {form: true}\nC: three\n");
        let mut run = ChunkedRun::new(&block);
        let session = Session::new("h");
        let resolved_data = HashMap::new();

        let gate_chunk = run
            .resume(&block, &resolved_data, &session, &EchoDispatcher, &NoFunctions, true, None, None)
            .await
            .unwrap();
        assert!(gate_chunk.is_gate);

        let submitted = YamlValue::String("submitted-value".into());
        let next_chunk = run
            .resume(&block, &resolved_data, &session, &EchoDispatcher, &NoFunctions, true, None, Some(submitted.clone()))
            .await
            .unwrap();

        assert!(!next_chunk.is_gate);
        assert_eq!(next_chunk.keys, vec!["B!", "C"]);
        assert_eq!(run.status, RunStatus::Done);
        assert_eq!(run.accumulator.by_key("B!").map(|v| v.as_ref()), Some(&submitted));
        assert_eq!(run.accumulator.by_key("C").map(|v| v.as_ref()), Some(&YamlValue::String("three".into())));
    }

    #[tokio::test]
    async fn resume_after_menu_pause_consumes_selection_and_advances() {
        let block = block_from_yaml("\"M*\": {menu: true}\nC: three\n");
        let mut run = ChunkedRun::new(&block);
        let session = Session::new("h");
        let resolved_data = HashMap::new();

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

        let pause_chunk = run
            .resume(&block, &resolved_data, &session, &MenuThenEcho, &NoFunctions, true, None, None)
            .await
            .unwrap();
        assert!(!pause_chunk.is_gate);
        assert_eq!(run.status, RunStatus::Paused { at_key: "M*".to_string() });

        let selected = YamlValue::String("option-1".into());
        let next_chunk = run
            .resume(&block, &resolved_data, &session, &MenuThenEcho, &NoFunctions, true, None, Some(selected.clone()))
            .await
            .unwrap();

        assert_eq!(next_chunk.keys, vec!["M*", "C"]);
        assert_eq!(run.status, RunStatus::Done);
        assert_eq!(run.accumulator.by_key("M*").map(|v| v.as_ref()), Some(&selected));
    }

    #[test]
    fn deny_block_yields_sentinel_and_marks_done() {
        let block = block_from_yaml("A: one\n");
        let mut run = ChunkedRun::new(&block);
        let chunk = run.deny_block();
        assert!(chunk.keys.is_empty());
        assert_eq!(run.status, RunStatus::Done);
    }

    #[test]
    fn menu_loopback_finds_nearest_anchored_menu() {
        let keys = vec!["A", "Menu~*", "B"];
        assert_eq!(menu_loopback(&keys, 2), 1);
    }

    #[test]
    fn menu_loopback_advances_when_no_menu_precedes() {
        let keys = vec!["A", "B", "C"];
        assert_eq!(menu_loopback(&keys, 1), 2);
    }
}
