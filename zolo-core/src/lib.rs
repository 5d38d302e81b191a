pub mod accumulator;
pub mod block;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod zpath;

pub mod prelude;

pub use accumulator::Accumulator;
pub use block::{Block, StepValue};
pub use config::ZoloConfig;
pub use error::{ValidationDetail, ZoloError};
pub use session::{AuthContext, BreadcrumbState, Session, ZAuth, ZMode};
pub use zpath::ZPath;
