pub use crate::breadcrumbs::{append, pop, pop_to, zpath_from_position, BackResult};
pub use crate::error::NavError;
pub use crate::linking::{check_permissions, parse as parse_link, LinkTarget};
pub use crate::menu::{interact as interact_menu, Menu, MenuDisplay, OptionSource, Selection};
