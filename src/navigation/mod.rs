//! Permission-filtered navigation.
//!
//! The menu is static data; what a user sees is a pure projection of it over
//! their grants and account class.

mod menu;
mod permissions;

pub use menu::{MENU_ITEMS, MenuItem, Section, filter_menu, resolve_active_section};
pub use permissions::{AccountClass, Permission, RequiredPermission};
