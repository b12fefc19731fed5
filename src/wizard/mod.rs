//! Setup Wizards
//!
//! Multi-step forms with per-step validation: organization setup and
//! campaign creation. The controller is generic over the flow definition.

pub mod campaign;
mod controller;
mod flow;
pub mod organization;
mod types;

#[cfg(test)]
mod tests;

pub use campaign::CampaignFlow;
pub use controller::WizardController;
pub use flow::{PAYMENT_ACCOUNT_FIELD, WizardFlow};
pub use organization::OrganizationFlow;
pub use types::{
    Attachment, FieldErrors, FieldValue, FormFields, SubmitBlocked, SubmitOutcome, WizardPhase,
};
