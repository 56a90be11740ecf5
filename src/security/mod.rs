//! Privilege checks

pub mod privilege;

pub use privilege::{is_root, require_root};
