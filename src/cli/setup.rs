//! Setup wizards driven from form files.
//!
//! Each command walks the wizard step by step exactly as an interactive host
//! would, so a bad field stops at the step that owns it.

use super::commands::render_dashboard;
use super::form::load_form;
use crate::api::{ApiClient, ConsoleApi};
use crate::config::Config;
use crate::gate::{DashboardGate, Navigate};
use crate::payments::{
    BrowserLaunch, HandoffRedirect, PaymentGate, PaymentsApi, ProviderHandoff, ResumeOutcome,
    ReturnListener, open_url,
};
use crate::storage::{FileStore, PersistedState};
use crate::wizard::{
    CampaignFlow, FieldErrors, FormFields, OrganizationFlow, SubmitBlocked, SubmitOutcome,
    WizardController, WizardFlow, campaign, organization,
};
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, wired from config.
pub(crate) struct SetupContext {
    pub config: Config,
    pub api: Arc<dyn ConsoleApi>,
    pub payments: Arc<dyn PaymentsApi>,
    pub session: Arc<FileStore>,
    pub gate: DashboardGate,
}

impl SetupContext {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(ApiClient::new(&config.api).context("Failed to build HTTP client")?);
        let profile = Arc::new(FileStore::new(&config.storage.profile_path));
        let session = Arc::new(FileStore::new(&config.storage.session_path));
        let state = PersistedState::new(profile, config.storage.namespace.clone());

        Ok(Self {
            config: config.clone(),
            api: client.clone(),
            payments: client,
            session,
            gate: DashboardGate::new(state),
        })
    }

    pub fn handoff(&self) -> ProviderHandoff {
        ProviderHandoff::new(
            self.payments.clone(),
            self.session.clone(),
            &self.config.storage.namespace,
            &self.config.payments,
        )
    }

    fn return_timeout(&self) -> Option<Duration> {
        self.config.payments.return_timeout_secs.map(Duration::from_secs)
    }

    /// Organization id from the profile, falling back to the session.
    async fn organization_id(&self) -> Result<String> {
        if let Some(id) = self.gate.state().organization_id()? {
            return Ok(id);
        }
        let session = self
            .api
            .session()
            .await
            .context("Failed to load your session")?;
        match session.organization_id {
            Some(id) => {
                self.gate.state().set_organization_id(&id)?;
                Ok(id)
            }
            None => bail!("No organization yet. Run `tenant-console setup organization` first"),
        }
    }
}

fn print_errors<F: WizardFlow>(wizard: &WizardController<F>, errors: &FieldErrors) {
    let step = wizard.current_step();
    eprintln!(
        "Step {}/{} ({}) needs attention:",
        step,
        wizard.total_steps(),
        wizard.flow().step_title(step)
    );
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

/// Advance through every step before the last one.
fn walk_to_last_step<F: WizardFlow>(wizard: &mut WizardController<F>) -> Result<()> {
    while !wizard.is_last_step() {
        if !wizard.next_step() {
            print_errors(wizard, wizard.errors());
            bail!(
                "Fix step {} and run the command again",
                wizard.current_step()
            );
        }
    }
    Ok(())
}

/// Turn a submit outcome into the created value or a CLI error.
fn finish<F: WizardFlow, T>(wizard: &WizardController<F>, outcome: SubmitOutcome<T>) -> Result<T> {
    match outcome {
        SubmitOutcome::Completed(value) => Ok(value),
        SubmitOutcome::Failed(banner) => bail!("{banner}"),
        SubmitOutcome::Blocked(SubmitBlocked::Invalid(errors)) => {
            print_errors(wizard, &errors);
            bail!("Fix the last step and run the command again")
        }
        SubmitOutcome::Blocked(other) => bail!("Submission could not start: {other:?}"),
    }
}

/// Send the browser to the provider. Prints the link when no browser opens.
fn navigate(ctx: &SetupContext, url: &str) {
    let launched = if ctx.config.payments.open_browser {
        open_url(url)
    } else {
        BrowserLaunch::Blocked
    };
    match launched {
        BrowserLaunch::Opened => println!("Continue payment setup in your browser."),
        BrowserLaunch::Blocked => {
            println!("Open this link to continue payment setup:");
            println!();
            println!("  {url}");
        }
    }
    println!();
}

/// Wait for the provider to send the browser back and pick up the parked form.
async fn await_return(
    ctx: &SetupContext,
    handoff: &ProviderHandoff,
    listener: ReturnListener,
) -> Result<Option<FormFields>> {
    println!(
        "Waiting for the provider to send you back to {}",
        listener.return_url()
    );
    println!(
        "If your browser lands somewhere else, run: tenant-console setup resume --return-url '<URL>'"
    );

    let returned = listener.wait(ctx.return_timeout()).await?;
    match handoff.resume(&returned)? {
        ResumeOutcome::Resumed(snapshot) => Ok(Some(snapshot)),
        ResumeOutcome::NothingPending => Ok(None),
        ResumeOutcome::NotAReturn => {
            bail!("Payment setup was not finished. Run the setup command again to get a new link")
        }
    }
}

pub(crate) async fn cmd_setup_organization(config: &Config, data: &Path) -> Result<()> {
    let ctx = SetupContext::new(config)?;
    let mut wizard = WizardController::with_fields(OrganizationFlow, load_form(data)?);
    walk_to_last_step(&mut wizard)?;

    // Bound before the create call
    let listener =
        ReturnListener::bind(&config.payments.return_bind, config.payments.return_port).await?;
    let handoff = ctx.handoff().with_return_url(listener.return_url());

    let (organization_id, redirect) = match ctx.gate.state().organization_id()? {
        Some(id) => {
            // Created on an earlier run: never create it twice
            println!("Organization {id} already exists, continuing its setup");
            let redirect = match handoff.readiness(&id).await? {
                PaymentGate::Ready => None,
                PaymentGate::ConnectRequired(_) => {
                    Some(connect_organization(&handoff, &id, wizard.fields()).await?)
                }
            };
            (Some(id), redirect)
        }
        None => create_organization(&ctx, &handoff, &mut wizard).await?,
    };

    if let Some(redirect) = redirect {
        navigate(&ctx, &redirect.url);
        if let Some(snapshot) = await_return(&ctx, &handoff, listener).await? {
            wizard.restore_handoff(snapshot);
        }
    }

    complete(&ctx, organization_id.as_deref()).await
}

/// Submit the organization and park the form for the provider link the
/// backend handed back, if any. The new id is recorded before anything else
/// can fail.
async fn create_organization(
    ctx: &SetupContext,
    handoff: &ProviderHandoff,
    wizard: &mut WizardController<OrganizationFlow>,
) -> Result<(Option<String>, Option<HandoffRedirect>)> {
    let api = ctx.api.clone();
    let outcome = wizard
        .submit(|fields| async move { api.submit_organization(&fields).await })
        .await;
    let onboarding = finish(wizard, outcome)?;

    let organization_id = match onboarding.organization_id {
        Some(id) => Some(id),
        None => ctx.api.session().await.ok().and_then(|s| s.organization_id),
    };
    if let Some(id) = &organization_id {
        ctx.gate.state().set_organization_id(id)?;
    }
    println!(
        "Organization {} created",
        wizard.fields().text(organization::ORGANIZATION_NAME).unwrap_or("")
    );

    let Some(url) = onboarding.onboarding_url else {
        return Ok((organization_id, None));
    };
    let redirect = match (handoff.stash(&url, wizard.fields()), &organization_id) {
        (Ok(redirect), _) => redirect,
        (Err(e), Some(id)) => {
            tracing::warn!("Backend payment setup link unusable, requesting a new one: {}", e);
            connect_organization(handoff, id, wizard.fields()).await?
        }
        (Err(e), None) => return Err(e.into()),
    };
    Ok((organization_id, Some(redirect)))
}

/// Fresh provider link for an organization that already exists.
async fn connect_organization(
    handoff: &ProviderHandoff,
    organization_id: &str,
    fields: &FormFields,
) -> Result<HandoffRedirect> {
    handoff
        .connect(organization_id, fields)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Organization {organization_id} exists but payment setup could not start: {}. \
                 Run the same command again to retry",
                e.user_message()
            )
        })
}

async fn complete(ctx: &SetupContext, organization_id: Option<&str>) -> Result<()> {
    match ctx
        .gate
        .complete_setup(ctx.api.as_ref(), organization_id)
        .await?
    {
        Navigate::DashboardRoot => {
            println!("Setup complete.");
            println!();
            // Rebuilt from storage and the server, nothing carried over
            render_dashboard(ctx, None).await
        }
        other => bail!("Unexpected navigation after setup: {other:?}"),
    }
}

pub(crate) async fn cmd_setup_campaign(config: &Config, data: &Path) -> Result<()> {
    let ctx = SetupContext::new(config)?;
    let organization_id = ctx.organization_id().await?;
    let mut wizard = WizardController::with_fields(CampaignFlow, load_form(data)?);
    walk_to_last_step(&mut wizard)?;

    let handoff = ctx.handoff();
    let readiness = handoff.readiness(&organization_id).await?;
    match readiness {
        PaymentGate::Ready => wizard.mark_payment_connected(),
        PaymentGate::ConnectRequired(status) => {
            println!(
                "Your payment account needs setup ({}).",
                status.missing().join(", ")
            );
            let listener =
                ReturnListener::bind(&config.payments.return_bind, config.payments.return_port)
                    .await?;
            let handoff = handoff.with_return_url(listener.return_url());
            let redirect = match handoff.connect(&organization_id, wizard.fields()).await {
                Ok(redirect) => redirect,
                Err(e) => bail!("{}", e.user_message()),
            };
            navigate(&ctx, &redirect.url);

            match await_return(&ctx, &handoff, listener).await? {
                Some(snapshot) => wizard.restore_handoff(snapshot),
                None => {
                    if handoff.readiness(&organization_id).await? != PaymentGate::Ready {
                        bail!("Payment account is still not ready");
                    }
                    wizard.mark_payment_connected();
                }
            }
        }
    }

    submit_campaign(&ctx, &mut wizard, &organization_id).await
}

async fn submit_campaign(
    ctx: &SetupContext,
    wizard: &mut WizardController<CampaignFlow>,
    organization_id: &str,
) -> Result<()> {
    let api = ctx.api.clone();
    let org = organization_id.to_string();
    let outcome = wizard
        .submit(|fields| async move { api.create_campaign(&org, &fields).await })
        .await;
    let created = finish(wizard, outcome)?;
    println!(
        "Campaign {} created ({})",
        wizard.fields().text(campaign::NAME).unwrap_or(""),
        created.id
    );
    Ok(())
}

/// Which wizard a parked form came from.
fn parked_flow(snapshot: &FormFields) -> Option<&'static str> {
    if snapshot.get(organization::ORGANIZATION_NAME).is_some() {
        Some(OrganizationFlow.name())
    } else if snapshot.get(campaign::TARGET_AMOUNT).is_some() {
        Some(CampaignFlow.name())
    } else {
        None
    }
}

/// Continue in a new process after the browser came back on its own.
pub(crate) async fn cmd_setup_resume(config: &Config, return_url: &str) -> Result<()> {
    let ctx = SetupContext::new(config)?;
    let snapshot = match ctx.handoff().resume(return_url)? {
        ResumeOutcome::Resumed(snapshot) => snapshot,
        ResumeOutcome::NotAReturn => bail!(
            "That URL is not a successful payment setup return (missing {}={})",
            config.payments.success_param,
            config.payments.success_value
        ),
        ResumeOutcome::NothingPending => {
            bail!("No payment setup is waiting. It may have been resumed already")
        }
    };

    match parked_flow(&snapshot) {
        Some("organization") => {
            let organization_id = ctx.gate.state().organization_id()?;
            complete(&ctx, organization_id.as_deref()).await
        }
        Some("campaign") => {
            let organization_id = ctx.organization_id().await?;
            let mut wizard = WizardController::new(CampaignFlow);
            wizard.restore_handoff(snapshot);
            walk_to_last_step(&mut wizard)?;
            submit_campaign(&ctx, &mut wizard, &organization_id).await
        }
        _ => bail!("The parked form does not belong to a known setup flow"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, PaymentsConfig, StorageConfig};
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    fn config_for(server: &Server, dir: &TempDir, return_port: u16) -> Config {
        Config {
            api: ApiConfig {
                base_url: server.url(),
                ..ApiConfig::default()
            },
            payments: PaymentsConfig {
                return_port,
                open_browser: false,
                return_timeout_secs: Some(5),
                ..PaymentsConfig::default()
            },
            storage: StorageConfig {
                profile_path: dir.path().join("profile.json"),
                session_path: dir.path().join("session.json"),
                namespace: "tc".to_string(),
            },
            ..Config::default()
        }
    }

    fn org_form(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("org.json");
        std::fs::write(
            &path,
            r#"{
                "organizationName": "Harbor Food Bank",
                "email": "hello@harborfood.org",
                "addressLine1": "1 Pier Rd",
                "city": "Portland",
                "country": "US",
                "currency": "USD",
                "acceptTerms": true
            }"#,
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_existing_organization_is_not_created_again() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir, 0);
        SetupContext::new(&config)
            .unwrap()
            .gate
            .state()
            .set_organization_id("org_7")
            .unwrap();

        let create = server
            .mock("POST", "/organization/onboarding")
            .expect(0)
            .create_async()
            .await;
        let _status = server
            .mock("POST", "/stripe/accountStatus")
            .with_body(
                r#"{"status":true,"data":{"isFullyVerified":true,"chargesEnabled":true,"payoutsEnabled":true}}"#,
            )
            .create_async()
            .await;
        let onboarded = server
            .mock("POST", "/organization/onboarded")
            .match_body(Matcher::PartialJson(serde_json::json!({ "organizationId": "org_7" })))
            .with_body(r#"{"status":true}"#)
            .create_async()
            .await;
        let _session = server
            .mock("GET", "/auth/session")
            .with_body(
                r#"{"status":true,"data":{"userId":"u1","organizationId":"org_7","onboarded":true}}"#,
            )
            .create_async()
            .await;

        cmd_setup_organization(&config, &org_form(&dir)).await.unwrap();

        create.assert_async().await;
        onboarded.assert_async().await;
        let gate = SetupContext::new(&config).unwrap().gate;
        assert_eq!(gate.state().onboarding_complete().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_busy_return_port_stops_before_create() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = config_for(&server, &dir, taken.local_addr().unwrap().port());

        let create = server
            .mock("POST", "/organization/onboarding")
            .expect(0)
            .create_async()
            .await;

        assert!(cmd_setup_organization(&config, &org_form(&dir)).await.is_err());
        create.assert_async().await;
        let ctx = SetupContext::new(&config).unwrap();
        assert_eq!(ctx.gate.state().organization_id().unwrap(), None);
    }

    #[tokio::test]
    async fn test_created_organization_is_recorded_when_handoff_fails() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir, 0);

        let create = server
            .mock("POST", "/organization/onboarding")
            .with_body(
                r#"{"status":true,"data":{"organizationId":"org_9","onboardingUrl":"javascript:alert(1)"}}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let relink = server
            .mock("POST", "/stripe/createAccount")
            .match_body(Matcher::PartialJson(serde_json::json!({ "organizationId": "org_9" })))
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = cmd_setup_organization(&config, &org_form(&dir))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("org_9"));
        create.assert_async().await;
        relink.assert_async().await;

        // A re-run sees the organization and skips the create call
        let ctx = SetupContext::new(&config).unwrap();
        assert_eq!(
            ctx.gate.state().organization_id().unwrap().as_deref(),
            Some("org_9")
        );
        assert!(ctx.handoff().pending().unwrap().is_none());
    }

    #[test]
    fn test_parked_flow_detection() {
        let org: FormFields = [(organization::ORGANIZATION_NAME, "Harbor")]
            .into_iter()
            .collect();
        assert_eq!(parked_flow(&org), Some("organization"));

        let cmp: FormFields = [(campaign::NAME, "Drive"), (campaign::TARGET_AMOUNT, "10")]
            .into_iter()
            .collect();
        assert_eq!(parked_flow(&cmp), Some("campaign"));

        assert_eq!(parked_flow(&FormFields::new()), None);
    }

    #[test]
    fn test_walk_stops_at_failing_step() {
        let fields: FormFields = [(campaign::NAME, "Drive"), (campaign::TARGET_AMOUNT, "10")]
            .into_iter()
            .collect();
        let mut wizard = WizardController::with_fields(CampaignFlow, fields);
        assert!(walk_to_last_step(&mut wizard).is_err());
        assert_eq!(wizard.current_step(), 2);
    }

    #[test]
    fn test_walk_reaches_last_step() {
        let fields: FormFields = [
            (campaign::NAME, "Drive"),
            (campaign::TARGET_AMOUNT, "10"),
            (campaign::START_DATE, "2026-05-01"),
        ]
        .into_iter()
        .collect();
        let mut wizard = WizardController::with_fields(CampaignFlow, fields);
        walk_to_last_step(&mut wizard).unwrap();
        assert!(wizard.is_last_step());
    }
}
