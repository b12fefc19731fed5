//! Backend REST API
//!
//! The console talks to the tenant backend for sessions, organization setup
//! and campaign creation. Payment-provider endpoints live in
//! [`crate::payments`], on the same client.

mod client;
mod types;

pub use client::ApiClient;
pub use types::*;

use crate::error::Result;
use crate::wizard::FormFields;
use async_trait::async_trait;

/// Backend calls the setup flows depend on.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Current user, grants and the server-side onboarding flag.
    async fn session(&self) -> Result<SessionInfo>;

    /// Create the organization from the setup wizard.
    async fn submit_organization(&self, fields: &FormFields) -> Result<OrganizationOnboarding>;

    async fn create_campaign(
        &self,
        organization_id: &str,
        fields: &FormFields,
    ) -> Result<CampaignCreated>;

    /// Record on the server that setup finished.
    async fn mark_onboarded(&self, organization_id: &str) -> Result<()>;
}
