//! Utility modules for common functionality

pub mod sanitize;

pub use sanitize::{redact_fields, redact_url};
