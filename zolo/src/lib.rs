//! Zolo — a declarative YAML workflow engine: a Loop Engine that walks
//! blocks of steps, a Cache Orchestrator backing lookups and sessions, a
//! Navigation State Machine for breadcrumbs/links/menus, and a WebSocket
//! Bridge for driving it all from a browser.
//!
//! This facade crate re-exports the subsystem crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use zolo::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate          |
//! |-----------|---------|----------------|
//! | `auth`    | **yes** | `zolo-auth`    |
//! | `nav`     | **yes** | `zolo-nav`     |
//! | `wizard`  | **yes** | `zolo-wizard`  |
//! | `bridge`  | **yes** | `zolo-bridge`  |
//! | `full`    | no      | All of the above |

pub extern crate zolo_core;
pub extern crate zolo_cache;

pub use zolo_core::*;

#[cfg(feature = "auth")]
pub use zolo_auth;

#[cfg(feature = "nav")]
pub use zolo_nav;

#[cfg(feature = "wizard")]
pub use zolo_wizard;

#[cfg(feature = "bridge")]
pub use zolo_bridge;

/// Unified prelude — import everything with `use zolo::prelude::*`.
pub mod prelude {
    pub use zolo_core::prelude::*;
    pub use zolo_cache::prelude::*;

    #[cfg(feature = "auth")]
    pub use zolo_auth::prelude::*;

    #[cfg(feature = "nav")]
    pub use zolo_nav::prelude::*;

    #[cfg(feature = "wizard")]
    pub use zolo_wizard::prelude::*;

    #[cfg(feature = "bridge")]
    pub use zolo_bridge::prelude::*;
}
