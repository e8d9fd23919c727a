//! Shared types for the clipcheck workspace
//!
//! Holds the pieces both the engine and any surface layer need: the common
//! error type, the per-job event bus, and configuration-file loading.

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
