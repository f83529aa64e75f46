//! Query syntax parsers.
//!
//! Turns client SELECT text into the projection AST in [`crate::ir`].

pub mod common;
mod select;

pub use select::{can_handle, parse_select};
