use super::types::{FieldErrors, FormFields};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Field name used for the "payment account not connected" blocker.
pub const PAYMENT_ACCOUNT_FIELD: &str = "paymentAccount";

/// Static description of a multi-step form.
///
/// `validate` must be pure: same step and data, same errors. It only looks at
/// the fields that belong to `step`.
pub trait WizardFlow {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Number of steps (steps are 1-based)
    fn total_steps(&self) -> usize;

    fn step_title(&self, step: usize) -> &'static str;

    /// Field names shown on `step`
    fn step_fields(&self, step: usize) -> &'static [&'static str];

    fn validate(&self, step: usize, fields: &FormFields) -> FieldErrors;

    /// Step that needs a connected payment account before it can be left or
    /// submitted. `None` when the flow has no such gate.
    fn payment_step(&self) -> Option<usize> {
        None
    }
}

// Shared field rules. Each one only runs its checks when the previous ones
// passed, so a field ends up with the most specific message.

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("valid phone regex"));

static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid currency regex"));

/// Non-blank check. Returns whether the field is present.
pub(super) fn required(
    fields: &FormFields,
    errors: &mut FieldErrors,
    name: &str,
    message: &str,
) -> bool {
    if fields.is_filled(name) {
        true
    } else {
        errors.insert(name, message);
        false
    }
}

/// Parses a strictly positive amount. Skips blank optional values.
pub(super) fn positive_amount(
    fields: &FormFields,
    errors: &mut FieldErrors,
    name: &str,
    label: &str,
) -> Option<f64> {
    let raw = fields.text(name)?;
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if !v.is_finite() => {
            errors.insert(name, format!("{label} must be a number"));
            None
        }
        Ok(v) if v <= 0.0 => {
            errors.insert(name, format!("{label} must be greater than zero"));
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.insert(name, format!("{label} must be a number"));
            None
        }
    }
}

/// Parses an ISO `YYYY-MM-DD` date. Skips blank optional values.
pub(super) fn date(fields: &FormFields, errors: &mut FieldErrors, name: &str) -> Option<NaiveDate> {
    let raw = fields.text(name)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.insert(name, "Invalid date, use YYYY-MM-DD");
            None
        }
    }
}

pub(super) fn email(fields: &FormFields, errors: &mut FieldErrors, name: &str) {
    if let Some(raw) = fields.text(name)
        && !EMAIL_RE.is_match(raw)
    {
        errors.insert(name, "Enter a valid email address");
    }
}

pub(super) fn phone(fields: &FormFields, errors: &mut FieldErrors, name: &str) {
    if let Some(raw) = fields.text(name)
        && !PHONE_RE.is_match(raw)
    {
        errors.insert(name, "Enter a valid phone number");
    }
}

pub(super) fn website(fields: &FormFields, errors: &mut FieldErrors, name: &str) {
    if let Some(raw) = fields.text(name) {
        let lower = raw.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            errors.insert(name, "Website must start with http:// or https://");
        }
    }
}

pub(super) fn currency(fields: &FormFields, errors: &mut FieldErrors, name: &str) {
    if let Some(raw) = fields.text(name)
        && !CURRENCY_RE.is_match(raw)
    {
        errors.insert(name, "Use a 3-letter currency code such as USD");
    }
}

pub(super) fn max_len(fields: &FormFields, errors: &mut FieldErrors, name: &str, max: usize) {
    if let Some(raw) = fields.text(name)
        && raw.chars().count() > max
    {
        errors.insert(name, format!("Keep this under {max} characters"));
    }
}
