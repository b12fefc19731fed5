use super::campaign::{CURRENCY, END_DATE, NAME, START_DATE, TARGET_AMOUNT};
use super::*;
use crate::error::ConsoleError;
use crate::storage::{MemoryStore, PendingHandoff};
use proptest::prelude::*;
use std::sync::Arc;

fn campaign_at_last_step() -> WizardController<CampaignFlow> {
    let fields: FormFields = [
        (NAME, "Spring Drive"),
        (TARGET_AMOUNT, "5000"),
        (START_DATE, "2026-03-01"),
        (END_DATE, "2026-04-30"),
        (CURRENCY, "USD"),
    ]
    .into_iter()
    .collect();
    let mut wizard = WizardController::with_fields(CampaignFlow, fields);
    assert!(wizard.next_step());
    assert!(wizard.next_step());
    wizard.mark_payment_connected();
    wizard
}

fn server_error() -> ConsoleError {
    ConsoleError::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

#[test]
fn test_wizard_creation() {
    let wizard = WizardController::new(CampaignFlow);
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(wizard.total_steps(), 3);
    assert_eq!(wizard.phase(), &WizardPhase::Editing);
    assert!(wizard.fields().is_empty());
    assert!(!wizard.payment_connected());
}

#[test]
fn test_empty_name_stays_on_step_one() {
    let mut wizard = WizardController::new(CampaignFlow);
    wizard.set_field(TARGET_AMOUNT, "100");

    assert!(!wizard.next_step());
    assert_eq!(wizard.current_step(), 1);
    assert!(wizard.errors().get(NAME).is_some());
}

#[test]
fn test_negative_goal_amount() {
    let mut wizard = WizardController::new(CampaignFlow);
    wizard.set_field(NAME, "Spring Drive");
    wizard.set_field(TARGET_AMOUNT, "-5");

    assert!(!wizard.next_step());
    assert_eq!(
        wizard.errors().get(TARGET_AMOUNT),
        Some("Goal amount must be greater than zero")
    );
}

#[test]
fn test_correct_and_retry_advances() {
    let mut wizard = WizardController::new(CampaignFlow);
    wizard.set_field(NAME, "Spring Drive");
    wizard.set_field(TARGET_AMOUNT, "-5");
    assert!(!wizard.next_step());
    assert!(!wizard.next_step());

    wizard.set_field(TARGET_AMOUNT, "250");
    // Editing the field clears its message right away
    assert!(wizard.errors().is_empty());
    assert!(wizard.next_step());
    assert_eq!(wizard.current_step(), 2);
}

#[test]
fn test_payment_step_blocks_until_connected() {
    let fields: FormFields = [
        (NAME, "Drive"),
        (TARGET_AMOUNT, "10"),
        (START_DATE, "2026-01-01"),
        (CURRENCY, "EUR"),
    ]
    .into_iter()
    .collect();
    let mut wizard = WizardController::with_fields(CampaignFlow, fields);
    wizard.next_step();
    wizard.next_step();
    assert!(wizard.is_last_step());

    let blocked = wizard.begin_submission();
    match blocked {
        Err(SubmitBlocked::Invalid(errors)) => assert!(errors.contains(PAYMENT_ACCOUNT_FIELD)),
        other => panic!("expected payment blocker, got {other:?}"),
    }

    wizard.mark_payment_connected();
    assert!(wizard.begin_submission().is_ok());
}

#[test]
fn test_prev_step_cancel() {
    let mut wizard = WizardController::new(OrganizationFlow);
    // Going back from step 1 signals cancel
    assert!(wizard.prev_step());
    assert_eq!(wizard.current_step(), 1);
}

#[test]
fn test_prev_step_keeps_fields() {
    let mut wizard = campaign_at_last_step();
    assert!(!wizard.prev_step());
    assert_eq!(wizard.current_step(), 2);
    assert_eq!(wizard.fields().text(NAME), Some("Spring Drive"));
}

#[test]
fn test_next_on_last_step_is_noop() {
    let mut wizard = campaign_at_last_step();
    assert!(!wizard.next_step());
    assert_eq!(wizard.current_step(), 3);
    assert!(wizard.errors().is_empty());
}

#[test]
fn test_submit_only_from_last_step() {
    let mut wizard = WizardController::new(CampaignFlow);
    assert_eq!(
        wizard.begin_submission(),
        Err(SubmitBlocked::NotOnLastStep)
    );
}

#[test]
fn test_duplicate_submission_refused() {
    let mut wizard = campaign_at_last_step();
    assert!(wizard.begin_submission().is_ok());
    assert!(wizard.is_submitting());
    assert_eq!(wizard.begin_submission(), Err(SubmitBlocked::InFlight));
    // Inputs are locked as well
    assert!(!wizard.set_field(NAME, "Other"));
    assert!(!wizard.next_step());
    assert!(!wizard.prev_step());
}

#[tokio::test]
async fn test_successful_submission_completes() {
    let mut wizard = campaign_at_last_step();
    let outcome = wizard
        .submit(|fields| async move {
            assert_eq!(fields.text(NAME), Some("Spring Drive"));
            Ok::<_, ConsoleError>("cmp_1".to_string())
        })
        .await;

    assert_eq!(outcome, SubmitOutcome::Completed("cmp_1".to_string()));
    assert!(wizard.is_complete());
    assert_eq!(
        wizard.begin_submission(),
        Err(SubmitBlocked::AlreadyComplete)
    );
}

#[tokio::test]
async fn test_failed_submission_keeps_step_and_fields() {
    let mut wizard = campaign_at_last_step();
    let step_before = wizard.current_step();
    let fields_before = wizard.fields().clone();

    let outcome: SubmitOutcome<()> = wizard.submit(|_| async { Err(server_error()) }).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(wizard.current_step(), step_before);
    assert_eq!(wizard.fields(), &fields_before);
    assert!(wizard.banner().is_some());
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let mut wizard = campaign_at_last_step();
    let _: SubmitOutcome<()> = wizard.submit(|_| async { Err(server_error()) }).await;

    let outcome = wizard.submit(|_| async { Ok(42) }).await;
    assert_eq!(outcome, SubmitOutcome::Completed(42));
    assert!(wizard.banner().is_none());
}

#[tokio::test]
async fn test_blocked_submit_never_calls_remote() {
    let mut wizard = WizardController::new(CampaignFlow);
    let outcome: SubmitOutcome<()> = wizard.submit(|_| async { Err(server_error()) }).await;
    assert_eq!(outcome, SubmitOutcome::Blocked(SubmitBlocked::NotOnLastStep));
    assert_eq!(wizard.phase(), &WizardPhase::Editing);
}

#[test]
fn test_restore_handoff_merges_and_connects() {
    let mut wizard = WizardController::new(CampaignFlow);
    wizard.set_field(NAME, "Draft");

    let snapshot: FormFields = [(NAME, "Spring Drive"), (TARGET_AMOUNT, "5000")]
        .into_iter()
        .collect();
    wizard.restore_handoff(snapshot);

    assert!(wizard.payment_connected());
    assert_eq!(wizard.fields().text(NAME), Some("Spring Drive"));
    assert_eq!(wizard.fields().text(TARGET_AMOUNT), Some("5000"));
}

#[test]
fn test_persistable_drops_attachments() {
    let mut fields = FormFields::new();
    fields.set("organizationName", "Harbor");
    fields.set(
        "logo",
        Attachment {
            file_name: "logo.png".to_string(),
            path: "/tmp/logo.png".into(),
            size: 2048,
        },
    );

    let kept = fields.persistable();
    assert_eq!(kept.len(), 1);
    assert!(kept.get("logo").is_none());
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        any::<bool>().prop_map(FieldValue::Flag),
        ".*".prop_map(FieldValue::Text),
        prop::collection::vec(".*", 0..4).prop_map(FieldValue::List),
    ]
}

proptest! {
    #[test]
    fn prop_snapshot_round_trips(
        entries in prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_]{0,15}", field_value(), 0..12)
    ) {
        let fields: FormFields = entries.into_iter().collect();
        let relay: PendingHandoff<FormFields> =
            PendingHandoff::new(Arc::new(MemoryStore::new()), "tc", "setup");

        relay.write(&fields.persistable()).unwrap();
        let restored = relay.take().unwrap().expect("record present");

        prop_assert_eq!(restored, fields);
        prop_assert!(!relay.is_pending().unwrap());
    }

    #[test]
    fn prop_invalid_step_never_advances(amount in "-[0-9]{1,6}") {
        let mut wizard = WizardController::new(CampaignFlow);
        wizard.set_field(NAME, "Drive");
        wizard.set_field(TARGET_AMOUNT, amount);
        prop_assert!(!wizard.next_step());
        prop_assert_eq!(wizard.current_step(), 1);
    }
}
