//! Payment-provider handoff.
//!
//! Leaving for the provider is a full navigation: the wizard in memory is
//! gone by the time the browser comes back. The form is parked in the
//! session store right before leaving and picked up again on return.
//!
//! Order on the way out: create-account call, then snapshot, then navigate.
//! A failed create-account therefore never leaves a snapshot behind.

use super::client::PaymentsApi;
use super::types::*;
use crate::config::PaymentsConfig;
use crate::error::{ConsoleError, Result};
use crate::storage::{HandoffMeta, PendingHandoff, StateStore};
use crate::utils::{redact_fields, redact_url};
use crate::wizard::FormFields;
use std::sync::Arc;

/// Session store slot used for the parked form.
pub const HANDOFF_SLOT: &str = "payment-setup";

pub struct ProviderHandoff {
    api: Arc<dyn PaymentsApi>,
    relay: PendingHandoff<FormFields>,
    return_url: String,
    success_param: String,
    success_value: String,
}

impl ProviderHandoff {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        session: Arc<dyn StateStore>,
        namespace: &str,
        config: &PaymentsConfig,
    ) -> Self {
        Self {
            api,
            relay: PendingHandoff::new(session, namespace, HANDOFF_SLOT),
            return_url: config.return_url(),
            success_param: config.success_param.clone(),
            success_value: config.success_value.clone(),
        }
    }

    /// Use a different return URL, e.g. the one of an already bound listener.
    pub fn with_return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = return_url.into();
        self
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    /// The return URL with the success marker in its query. This is where
    /// the provider lands the browser once onboarding is done; the bare
    /// return URL serves as the refresh link.
    pub fn success_return_url(&self) -> Result<String> {
        let mut url = reqwest::Url::parse(&self.return_url)
            .map_err(|e| ConsoleError::Handoff(format!("Invalid return URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair(&self.success_param, &self.success_value);
        Ok(url.into())
    }

    /// Ask the backend whether the organization's account can take payments.
    pub async fn readiness(&self, organization_id: &str) -> Result<PaymentGate> {
        let status = self.api.account_status(organization_id).await?;
        if status.is_ready() {
            tracing::debug!("Payment account for {} is ready", organization_id);
            Ok(PaymentGate::Ready)
        } else {
            tracing::info!(
                "Payment account for {} not ready, missing: {}",
                organization_id,
                status.missing().join(", ")
            );
            Ok(PaymentGate::ConnectRequired(status))
        }
    }

    /// Request a provider onboarding link and park `fields` for the return.
    ///
    /// Nothing is written when the create-account call fails.
    pub async fn connect(
        &self,
        organization_id: &str,
        fields: &FormFields,
    ) -> Result<HandoffRedirect> {
        let success_url = self.success_return_url()?;
        let url = self
            .api
            .create_account(organization_id, &success_url, &self.return_url)
            .await
            .inspect_err(|e| tracing::warn!("Create account for {} failed: {}", organization_id, e))?;
        self.stash(&url, fields)
    }

    /// Park `fields` for a provider link obtained elsewhere (the organization
    /// submit hands one back directly).
    pub fn stash(&self, url: &str, fields: &FormFields) -> Result<HandoffRedirect> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ConsoleError::Handoff(format!("Invalid payment setup link: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConsoleError::Handoff(format!(
                "Unsupported payment setup link scheme: {}",
                parsed.scheme()
            )));
        }

        let snapshot = fields.persistable();
        let meta = self.relay.write(&snapshot)?;
        tracing::info!(
            "Parked form {} before leaving for {}",
            meta.id,
            redact_url(url)
        );
        tracing::debug!("Parked fields: {}", redact_fields(&snapshot));

        Ok(HandoffRedirect {
            url: url.to_string(),
            snapshot: meta,
        })
    }

    /// Whether `url` is the provider sending the browser back successfully.
    pub fn is_return(&self, url: &str) -> bool {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return false;
        };
        parsed
            .query_pairs()
            .any(|(k, v)| k == self.success_param.as_str() && v == self.success_value.as_str())
    }

    /// Pick up the parked form after a provider return.
    ///
    /// Never calls the backend. The record is gone afterwards whether or not
    /// it could be decoded.
    pub fn resume(&self, return_url: &str) -> Result<ResumeOutcome> {
        if !self.is_return(return_url) {
            tracing::debug!("{} is not a provider return", redact_url(return_url));
            return Ok(ResumeOutcome::NotAReturn);
        }
        match self.relay.take()? {
            Some(fields) => {
                tracing::info!("Resumed {} parked fields after provider return", fields.len());
                Ok(ResumeOutcome::Resumed(fields))
            }
            None => {
                tracing::warn!("Provider return without a parked form");
                Ok(ResumeOutcome::NothingPending)
            }
        }
    }

    /// Id and age of the parked form, if any.
    pub fn pending(&self) -> Result<Option<HandoffMeta>> {
        self.relay.meta()
    }

    /// Throw the parked form away. Returns whether one existed.
    pub fn discard(&self) -> Result<bool> {
        self.relay.discard()
    }
}
