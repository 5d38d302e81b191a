pub use crate::dispatch::{DispatchContext, Dispatcher};
pub use crate::engine::{run_sequential, step, BlockMetadata, Chunk, ChunkedRun, RunStatus, StepOutcome};
pub use crate::error::EngineError;
pub use crate::interpolation::FunctionRegistry;
pub use crate::signal::Signal;
