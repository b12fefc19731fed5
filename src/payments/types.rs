use crate::storage::HandoffMeta;
use crate::wizard::FormFields;
use serde::{Deserialize, Serialize};

/// Connected-account state reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    #[serde(default)]
    pub is_fully_verified: bool,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
}

impl AccountStatus {
    /// The account can take payments and pay out.
    pub fn is_ready(&self) -> bool {
        self.is_fully_verified && self.charges_enabled && self.payouts_enabled
    }

    /// Human-readable list of what is still missing.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.is_fully_verified {
            missing.push("identity verification");
        }
        if !self.charges_enabled {
            missing.push("charges");
        }
        if !self.payouts_enabled {
            missing.push("payouts");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentGate {
    Ready,
    /// Show a "connect" action; the status says what is missing.
    ConnectRequired(AccountStatus),
}

/// Where to send the browser, plus the id of the snapshot written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRedirect {
    pub url: String,
    pub snapshot: HandoffMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Provider return with a pending snapshot; the record has been consumed.
    Resumed(FormFields),
    /// The URL carries no success marker. Nothing was touched.
    NotAReturn,
    /// Provider return, but no snapshot was waiting.
    NothingPending,
}

/// Result of trying to show a URL in the system browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserLaunch {
    Opened,
    /// No opener could be started; the URL has to be opened by hand.
    Blocked,
}
