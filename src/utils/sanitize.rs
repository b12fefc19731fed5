//! Form data sanitization for logs.
//!
//! Wizard snapshots and provider links pass through the log on their way to
//! the session store and the browser. Bank details, tax ids and one-time link
//! tokens must never end up there; field names and harmless values stay so a
//! log line still shows what was submitted.

use crate::wizard::{FieldValue, FormFields};
use serde_json::{Map, Value};

/// Field name patterns (case-insensitive) whose values are always redacted.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "iban",
    "accountnumber",
    "account_number",
    "routingnumber",
    "routing_number",
    "taxid",
    "tax_id",
    "ssn",
    "cardnumber",
    "card_number",
    "cvc",
];

const REDACTED: &str = "[REDACTED]";

/// Returns true if a field name looks like it holds a sensitive value.
fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|&pat| lower.contains(pat))
}

/// `hello@harborfood.org` → `h***@harborfood.org`
fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        _ => REDACTED.to_string(),
    }
}

/// Log-safe JSON view of a form.
///
/// - Sensitive field names have their values replaced with `"[REDACTED]"`
/// - Email fields keep only the first character and the domain
/// - Attachments are reduced to file name and size
pub fn redact_fields(fields: &FormFields) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for (name, value) in fields.iter() {
        let redacted = if is_sensitive_key(name) {
            Value::String(REDACTED.to_string())
        } else {
            match value {
                FieldValue::Text(text) if name.to_lowercase().contains("email") => {
                    Value::String(mask_email(text))
                }
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::Flag(flag) => Value::Bool(*flag),
                FieldValue::List(items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
                FieldValue::Attachment(file) => Value::String(format!(
                    "<file {} ({} bytes)>",
                    file.file_name, file.size
                )),
            }
        };
        out.insert(name.clone(), redacted);
    }
    Value::Object(out)
}

/// Drop the query string and fragment of a link before logging it. Provider
/// onboarding links carry one-time tokens there.
pub fn redact_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            let had_query = parsed.query().is_some();
            parsed.set_query(None);
            parsed.set_fragment(None);
            if had_query {
                format!("{parsed}?{REDACTED}")
            } else {
                parsed.to_string()
            }
        }
        Err(_) => REDACTED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Attachment;

    #[test]
    fn redacts_bank_details() {
        let fields: FormFields = [
            ("organizationName", "Harbor Food Bank"),
            ("bankAccountNumber", "000123456789"),
            ("taxId", "12-3456789"),
        ]
        .into_iter()
        .collect();
        let out = redact_fields(&fields);
        assert_eq!(out["bankAccountNumber"], REDACTED);
        assert_eq!(out["taxId"], REDACTED);
        assert_eq!(out["organizationName"], "Harbor Food Bank");
    }

    #[test]
    fn masks_email() {
        let fields: FormFields = [("email", "hello@harborfood.org"), ("contactEmail", "bad")]
            .into_iter()
            .collect();
        let out = redact_fields(&fields);
        assert_eq!(out["email"], "h***@harborfood.org");
        assert_eq!(out["contactEmail"], REDACTED);
    }

    #[test]
    fn describes_attachments() {
        let mut fields = FormFields::new();
        fields.set("acceptTerms", true);
        fields.set(
            "logo",
            Attachment {
                file_name: "logo.png".to_string(),
                path: "/home/me/logo.png".into(),
                size: 512,
            },
        );
        let out = redact_fields(&fields);
        assert_eq!(out["logo"], "<file logo.png (512 bytes)>");
        assert_eq!(out["acceptTerms"], true);
    }

    #[test]
    fn strips_link_tokens() {
        let url = "https://connect.stripe.com/setup/s/acct_1/abc?token=zzz#frag";
        let out = redact_url(url);
        assert_eq!(out, "https://connect.stripe.com/setup/s/acct_1/abc?[REDACTED]");
        assert!(!out.contains("zzz"));
        assert_eq!(redact_url("not a url"), REDACTED);
    }
}
