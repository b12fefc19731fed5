use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file picked for upload. Only its description lives in form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Value held by a single form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
    Attachment(Attachment),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Blank text or an empty list. Flags and attachments are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.iter().all(|i| i.trim().is_empty()),
            Self::Flag(_) | Self::Attachment(_) => false,
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, Self::Attachment(_))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Attachment> for FieldValue {
    fn from(a: Attachment) -> Self {
        Self::Attachment(a)
    }
}

/// All inputs of a wizard, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, FieldValue>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Trimmed text of `name`, `None` when absent, blank, or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        self.0
            .get(name)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    /// Present and not blank.
    pub fn is_filled(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_blank())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    /// Copy every entry of `other` over this form; `other` wins on conflicts.
    pub fn merge(&mut self, other: FormFields) {
        self.0.extend(other.0);
    }

    /// Everything except attachments. This is what may cross a navigation.
    pub fn persistable(&self) -> FormFields {
        FormFields(
            self.0
                .iter()
                .filter(|(_, v)| !v.is_attachment())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormFields(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Validation messages keyed by field name, one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; a later message for the same field replaces it.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the wizard is, apart from the step number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    /// Filling in steps
    Editing,
    /// Final create call in flight; further submits are refused
    Submitting,
    /// Create call succeeded
    Complete,
    /// Create call failed; holds the banner text. Form data is untouched.
    Failed(String),
}

/// Why a submission could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// A submission is already in flight
    InFlight,
    AlreadyComplete,
    /// Submission is only possible from the last step
    NotOnLastStep,
    /// The last step does not validate
    Invalid(FieldErrors),
}

/// Result of a submit attempt, never an `Err`: failures become state.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Completed(T),
    Failed(String),
    Blocked(SubmitBlocked),
}

impl<T> SubmitOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
