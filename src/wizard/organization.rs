//! Organization setup wizard: organization details, address, payments.
//!
//! The payment-provider onboarding for a new organization happens after the
//! submit call, driven by the `onboardingUrl` the backend hands back.

use super::flow::{self, WizardFlow};
use super::types::{FieldErrors, FormFields};

pub const ORGANIZATION_NAME: &str = "organizationName";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const WEBSITE: &str = "website";
pub const ADDRESS_LINE1: &str = "addressLine1";
pub const CITY: &str = "city";
pub const COUNTRY: &str = "country";
pub const POSTAL_CODE: &str = "postalCode";
pub const CURRENCY: &str = "currency";
pub const ACCEPT_TERMS: &str = "acceptTerms";
pub const LOGO: &str = "logo";

const DETAILS: &[&str] = &[ORGANIZATION_NAME, EMAIL, PHONE, WEBSITE, LOGO];
const ADDRESS: &[&str] = &[ADDRESS_LINE1, CITY, COUNTRY, POSTAL_CODE];
const PAYMENTS: &[&str] = &[CURRENCY, ACCEPT_TERMS];

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationFlow;

impl WizardFlow for OrganizationFlow {
    fn name(&self) -> &'static str {
        "organization"
    }

    fn total_steps(&self) -> usize {
        3
    }

    fn step_title(&self, step: usize) -> &'static str {
        match step {
            1 => "Organization Details",
            2 => "Address",
            3 => "Payments",
            _ => "",
        }
    }

    fn step_fields(&self, step: usize) -> &'static [&'static str] {
        match step {
            1 => DETAILS,
            2 => ADDRESS,
            3 => PAYMENTS,
            _ => &[],
        }
    }

    fn validate(&self, step: usize, fields: &FormFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            1 => {
                flow::required(
                    fields,
                    &mut errors,
                    ORGANIZATION_NAME,
                    "Organization name is required",
                );
                if flow::required(fields, &mut errors, EMAIL, "Email is required") {
                    flow::email(fields, &mut errors, EMAIL);
                }
                flow::phone(fields, &mut errors, PHONE);
                flow::website(fields, &mut errors, WEBSITE);
            }
            2 => {
                flow::required(fields, &mut errors, ADDRESS_LINE1, "Address is required");
                flow::required(fields, &mut errors, CITY, "City is required");
                flow::required(fields, &mut errors, COUNTRY, "Country is required");
            }
            3 => {
                if flow::required(fields, &mut errors, CURRENCY, "Currency is required") {
                    flow::currency(fields, &mut errors, CURRENCY);
                }
                if !fields.flag(ACCEPT_TERMS) {
                    errors.insert(ACCEPT_TERMS, "You must accept the terms to continue");
                }
            }
            _ => {}
        }
        errors
    }
}
