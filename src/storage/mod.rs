//! Persisted State
//!
//! Typed access to the two scopes of local state the console keeps:
//! the profile scope (onboarding flag, tenant context) and the session
//! scope (the pending payment-provider handoff).

mod handoff;
mod state;
mod store;

pub use handoff::{HandoffMeta, PendingHandoff};
pub use state::PersistedState;
pub use store::{FileStore, MemoryStore, StateStore};
