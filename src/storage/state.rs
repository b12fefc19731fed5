use super::store::StateStore;
use crate::error::Result;
use std::sync::Arc;

const ONBOARDING_COMPLETE: &str = "onboarding_complete";
const ORGANIZATION_ID: &str = "organization_id";
const USER_ID: &str = "user_id";

/// Typed view over the profile-scoped store.
///
/// This is the only place that knows the key names; everything else asks for
/// values by meaning. The onboarding flag here is a cache of the server's
/// flag, see [`crate::gate::DashboardGate::reconcile`].
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn StateStore>,
    namespace: String,
}

impl PersistedState {
    pub fn new(store: Arc<dyn StateStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}:{}", self.namespace, name)
    }

    /// `None` when the flag was never written (or holds garbage).
    pub fn onboarding_complete(&self) -> Result<Option<bool>> {
        let raw = self.store.get(&self.key(ONBOARDING_COMPLETE))?;
        Ok(match raw.as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                tracing::warn!("Ignoring unexpected onboarding flag value: {:?}", other);
                None
            }
        })
    }

    pub fn set_onboarding_complete(&self, complete: bool) -> Result<()> {
        tracing::debug!("Onboarding flag set to {}", complete);
        self.store.set(
            &self.key(ONBOARDING_COMPLETE),
            if complete { "true" } else { "false" },
        )
    }

    pub fn organization_id(&self) -> Result<Option<String>> {
        self.store.get(&self.key(ORGANIZATION_ID))
    }

    pub fn set_organization_id(&self, id: &str) -> Result<()> {
        self.store.set(&self.key(ORGANIZATION_ID), id)
    }

    pub fn user_id(&self) -> Result<Option<String>> {
        self.store.get(&self.key(USER_ID))
    }

    pub fn set_user_id(&self, id: &str) -> Result<()> {
        self.store.set(&self.key(USER_ID), id)
    }

    /// Remove every key owned by the console.
    pub fn clear(&self) -> Result<()> {
        for name in [ONBOARDING_COMPLETE, ORGANIZATION_ID, USER_ID] {
            self.store.remove(&self.key(name))?;
        }
        Ok(())
    }
}
