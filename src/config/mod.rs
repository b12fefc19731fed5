//! Configuration Module
//!
//! Handles configuration loading, validation, and saving.

pub mod secrets;
mod types;

pub use secrets::SecretString;
pub use types::*;
