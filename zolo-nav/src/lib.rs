//! The Navigation State Machine: breadcrumb trails, cross-file `zLink`
//! resolution, and menu building/rendering/selection.

pub mod breadcrumbs;
pub mod error;
pub mod linking;
pub mod menu;

pub mod prelude;

pub use breadcrumbs::{pop, pop_to, zpath_from_position, BackResult};
pub use error::NavError;
pub use linking::{check_permissions, parse as parse_link, LinkTarget};
pub use menu::{interact as interact_menu, Menu, MenuDisplay, OptionSource, Selection};
