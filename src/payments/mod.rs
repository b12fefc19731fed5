//! Payment Provider (Stripe Connect)
//!
//! Readiness check, the round trip through the provider's hosted onboarding,
//! and the pieces that make that round trip work from a terminal: a browser
//! launcher and a loopback return listener.

pub mod browser;
pub mod callback;
mod client;
mod handoff;
mod types;

pub use browser::open_url;
pub use callback::ReturnListener;
pub use client::PaymentsApi;
pub use handoff::{HANDOFF_SLOT, ProviderHandoff};
pub use types::*;
