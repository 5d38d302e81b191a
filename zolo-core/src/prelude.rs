//! Convenience re-exports for consumers of the shared data model.

pub use crate::accumulator::Accumulator;
pub use crate::block::{shape, Block, StepValue};
pub use crate::config::ZoloConfig;
pub use crate::error::{ValidationDetail, ZoloError};
pub use crate::session::{AuthContext, BreadcrumbState, Session, ZAuth, ZMode};
pub use crate::zpath::ZPath;
