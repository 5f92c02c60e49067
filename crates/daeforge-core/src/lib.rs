//! daeforge core library
//!
//! This crate provides the error type, math types and logging setup
//! shared across all daeforge components.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
