//! Campaign creation wizard: basics, schedule, payments.

use super::flow::{self, WizardFlow};
use super::types::{FieldErrors, FormFields};

pub const NAME: &str = "name";
pub const TARGET_AMOUNT: &str = "targetAmount";
pub const DESCRIPTION: &str = "description";
pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";
pub const CURRENCY: &str = "currency";
pub const MINIMUM_DONATION: &str = "minimumDonation";

const BASICS: &[&str] = &[NAME, TARGET_AMOUNT, DESCRIPTION];
const SCHEDULE: &[&str] = &[START_DATE, END_DATE];
const PAYMENTS: &[&str] = &[CURRENCY, MINIMUM_DONATION];

#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignFlow;

impl WizardFlow for CampaignFlow {
    fn name(&self) -> &'static str {
        "campaign"
    }

    fn total_steps(&self) -> usize {
        3
    }

    fn step_title(&self, step: usize) -> &'static str {
        match step {
            1 => "Campaign Basics",
            2 => "Schedule",
            3 => "Payments",
            _ => "",
        }
    }

    fn step_fields(&self, step: usize) -> &'static [&'static str] {
        match step {
            1 => BASICS,
            2 => SCHEDULE,
            3 => PAYMENTS,
            _ => &[],
        }
    }

    fn validate(&self, step: usize, fields: &FormFields) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            1 => {
                flow::required(fields, &mut errors, NAME, "Campaign name is required");
                if flow::required(fields, &mut errors, TARGET_AMOUNT, "Goal amount is required") {
                    flow::positive_amount(fields, &mut errors, TARGET_AMOUNT, "Goal amount");
                }
                flow::max_len(fields, &mut errors, DESCRIPTION, 2000);
            }
            2 => {
                let start = if flow::required(fields, &mut errors, START_DATE, "Start date is required")
                {
                    flow::date(fields, &mut errors, START_DATE)
                } else {
                    None
                };
                let end = flow::date(fields, &mut errors, END_DATE);
                if let (Some(start), Some(end)) = (start, end)
                    && end < start
                {
                    errors.insert(END_DATE, "End date must be on or after the start date");
                }
            }
            3 => {
                if flow::required(fields, &mut errors, CURRENCY, "Currency is required") {
                    flow::currency(fields, &mut errors, CURRENCY);
                }
                flow::positive_amount(fields, &mut errors, MINIMUM_DONATION, "Minimum donation");
            }
            _ => {}
        }
        errors
    }

    fn payment_step(&self) -> Option<usize> {
        Some(3)
    }
}
