//! The dispatch collaborator: routes a step's key/value to whichever
//! subsystem understands its shape (`zDisplay`, `zData`, `zFunc`, `zLink`,
//! `zDialog`, or a nested block). The engine calls this once per step and
//! only interprets the navigation-signal shape of the result — everything
//! else about rendering, querying, or dialog prompting is the
//! collaborator's business.

use serde_yaml::Value as YamlValue;
use zolo_core::block::StepValue;
use zolo_core::session::Session;
use zolo_core::Accumulator;

use crate::error::EngineError;

/// Context passed to a dispatch call: the accumulator so far, the active
/// session, and whether the engine is running in chunked (Bifrost) mode.
pub struct DispatchContext<'a> {
    pub accumulator: &'a Accumulator<YamlValue>,
    pub session: &'a Session,
    pub bifrost_mode: bool,
}

/// Implemented by whatever owns the data/display/function/dialog
/// subsystems. `dispatch` returns `Ok(None)` for a menu step that's pausing
/// for input — the chunked strategy treats that as a menu pause.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        key: &str,
        value: &StepValue,
        ctx: &DispatchContext<'_>,
    ) -> Result<Option<YamlValue>, EngineError>;
}
