//! Tenant Console - setup and navigation core of the multi-tenant admin console
//!
//! Everything an organization goes through before it reaches its dashboard,
//! and the dashboard entry point itself.
//!
//! ## Features
//!
//! - **Setup Wizards:** Organization setup and campaign creation with per-step validation
//! - **Payment Handoff:** Stripe Connect onboarding round trip with the form parked across the redirect
//! - **Completion Gate:** Persisted onboarding flag reconciled against the server on every mount
//! - **Navigation:** Menu filtered by the user's grants and account class
//!
//! ## Quick Start
//!
//! ```bash
//! # Set up the organization from a JSON form file
//! tenant-console setup organization --data org.json
//!
//! # Open the dashboard on a section
//! tenant-console dashboard --section campaigns
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod navigation;
pub mod payments;
pub mod storage;
pub mod utils;
pub mod wizard;

// Re-export commonly used types
pub use error::{ConsoleError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
