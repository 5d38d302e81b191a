//! The Loop Engine (Wizard): ordered block execution with RBAC gating,
//! variable/function interpolation, transaction scoping, and two execution
//! strategies (sequential blocking, chunked progressive rendering).

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod interpolation;
pub mod rbac;
pub mod shorthand;
pub mod signal;
pub mod transaction;

pub mod prelude;

pub use dispatch::{DispatchContext, Dispatcher};
pub use engine::{run_sequential, step, BlockMetadata, Chunk, ChunkedRun, RunStatus, StepOutcome};
pub use error::EngineError;
pub use interpolation::FunctionRegistry;
pub use signal::Signal;
