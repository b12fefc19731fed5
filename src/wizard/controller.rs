use super::flow::{PAYMENT_ACCOUNT_FIELD, WizardFlow};
use super::types::*;
use crate::error::Result;
use std::future::Future;

/// Drives one wizard session: step position, form data, errors, submission.
///
/// Dropping the controller throws all of it away; the only state that
/// outlives it is what the payment handoff writes to the session store.
pub struct WizardController<F: WizardFlow> {
    flow: F,
    current_step: usize,
    fields: FormFields,
    errors: FieldErrors,
    phase: WizardPhase,
    payment_connected: bool,
}

impl<F: WizardFlow> WizardController<F> {
    pub fn new(flow: F) -> Self {
        Self::with_fields(flow, FormFields::new())
    }

    /// Start at step 1 with pre-filled fields.
    pub fn with_fields(flow: F, fields: FormFields) -> Self {
        Self {
            flow,
            current_step: 1,
            fields,
            errors: FieldErrors::new(),
            phase: WizardPhase::Editing,
            payment_connected: false,
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.flow.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step >= self.flow.total_steps()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    pub fn is_complete(&self) -> bool {
        self.phase == WizardPhase::Complete
    }

    /// Top-level error from the last failed submission.
    pub fn banner(&self) -> Option<&str> {
        match &self.phase {
            WizardPhase::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Update one input. Inputs are locked while submitting or once complete.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        if matches!(self.phase, WizardPhase::Submitting | WizardPhase::Complete) {
            tracing::debug!("[{}] ignoring edit of {} while locked", self.flow.name(), name);
            return false;
        }
        self.errors.remove(name);
        self.fields.set(name, value);
        true
    }

    pub fn payment_connected(&self) -> bool {
        self.payment_connected
    }

    /// The payment account passed its readiness check.
    pub fn mark_payment_connected(&mut self) {
        self.payment_connected = true;
        self.errors.remove(PAYMENT_ACCOUNT_FIELD);
    }

    /// Merge a snapshot brought back from the payment provider and mark the
    /// payment step satisfied. Snapshot values win over current ones.
    pub fn restore_handoff(&mut self, snapshot: FormFields) {
        tracing::debug!(
            "[{}] restoring {} fields from handoff",
            self.flow.name(),
            snapshot.len()
        );
        self.fields.merge(snapshot);
        self.mark_payment_connected();
    }

    fn step_errors(&self, step: usize) -> FieldErrors {
        let mut errors = self.flow.validate(step, &self.fields);
        if self.flow.payment_step() == Some(step) && !self.payment_connected {
            errors.insert(
                PAYMENT_ACCOUNT_FIELD,
                "Connect a payment account to continue",
            );
        }
        errors
    }

    /// Advance to the next step if the current one validates.
    ///
    /// Returns `false` and keeps the step when validation fails, when already
    /// on the last step (use [`Self::begin_submission`]) or while locked.
    pub fn next_step(&mut self) -> bool {
        if matches!(self.phase, WizardPhase::Submitting | WizardPhase::Complete) {
            return false;
        }
        self.phase = WizardPhase::Editing;

        let errors = self.step_errors(self.current_step);
        if !errors.is_empty() {
            tracing::debug!(
                "[{}] step {} blocked by {} error(s)",
                self.flow.name(),
                self.current_step,
                errors.len()
            );
            self.errors = errors;
            return false;
        }
        self.errors = FieldErrors::new();

        if self.is_last_step() {
            return false;
        }
        self.current_step += 1;
        tracing::debug!(
            "[next_step] {} → step {}",
            self.flow.name(),
            self.current_step
        );
        true
    }

    /// Go back one step. Returns `true` when already on step 1, which signals
    /// the caller to cancel the wizard.
    pub fn prev_step(&mut self) -> bool {
        if matches!(self.phase, WizardPhase::Submitting | WizardPhase::Complete) {
            return false;
        }
        self.phase = WizardPhase::Editing;
        self.errors = FieldErrors::new();

        if self.current_step <= 1 {
            return true;
        }
        self.current_step -= 1;
        false
    }

    /// Validate the last step and lock the form for the create call.
    ///
    /// Hands back the form data to send. While a submission is in flight every
    /// further call is refused, so repeated triggers cannot create duplicates.
    pub fn begin_submission(&mut self) -> std::result::Result<FormFields, SubmitBlocked> {
        match self.phase {
            WizardPhase::Submitting => return Err(SubmitBlocked::InFlight),
            WizardPhase::Complete => return Err(SubmitBlocked::AlreadyComplete),
            WizardPhase::Editing | WizardPhase::Failed(_) => {}
        }
        if !self.is_last_step() {
            return Err(SubmitBlocked::NotOnLastStep);
        }

        let errors = self.step_errors(self.current_step);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(SubmitBlocked::Invalid(errors));
        }

        self.errors = FieldErrors::new();
        self.phase = WizardPhase::Submitting;
        tracing::info!("[{}] submitting", self.flow.name());
        Ok(self.fields.clone())
    }

    /// Record the outcome of the create call started by [`Self::begin_submission`].
    ///
    /// On failure the step and the form data stay as they were and the error
    /// becomes the banner; the user resubmits explicitly.
    pub fn finish_submission<T>(&mut self, result: Result<T>) -> SubmitOutcome<T> {
        if self.phase != WizardPhase::Submitting {
            tracing::warn!(
                "[{}] submission result arrived in phase {:?}",
                self.flow.name(),
                self.phase
            );
        }
        match result {
            Ok(value) => {
                tracing::info!("[{}] submission complete", self.flow.name());
                self.phase = WizardPhase::Complete;
                SubmitOutcome::Completed(value)
            }
            Err(e) => {
                tracing::error!("[{}] submission failed: {}", self.flow.name(), e);
                let message = e.user_message();
                self.phase = WizardPhase::Failed(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// `begin_submission`, run `call` with the form data, `finish_submission`.
    pub async fn submit<T, C, Fut>(&mut self, call: C) -> SubmitOutcome<T>
    where
        C: FnOnce(FormFields) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let fields = match self.begin_submission() {
            Ok(fields) => fields,
            Err(blocked) => return SubmitOutcome::Blocked(blocked),
        };
        let result = call(fields).await;
        self.finish_submission(result)
    }
}
