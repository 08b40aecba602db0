//! Shared definition records for Delve content.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_game};
