//! CLI command implementations (everything except the setup wizards).

use super::setup::SetupContext;
use crate::config::{Config, console_home};
use crate::gate::{DashboardView, Mounted, Reconciliation, SetupAction};
use crate::navigation::Section;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from file or defaults
pub(crate) fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        Config::load_from_path(path)?
    } else {
        Config::load()?
    };
    Ok(config)
}

/// Fetch the session, reconcile, and render what the user may see.
pub(crate) async fn cmd_dashboard(config: &Config, section: Option<Section>) -> Result<()> {
    let ctx = SetupContext::new(config)?;
    render_dashboard(&ctx, section).await
}

pub(crate) async fn render_dashboard(ctx: &SetupContext, section: Option<Section>) -> Result<()> {
    let session = ctx
        .api
        .session()
        .await
        .context("Failed to load your session")?;

    let Mounted {
        view,
        reconciliation,
    } = ctx.gate.mount(&session, section)?;

    // A completion the server missed earlier gets another try here
    if reconciliation == Reconciliation::ServerBehind
        && let Some(org) = session.organization_id.as_deref()
        && let Err(e) = ctx.api.mark_onboarded(org).await
    {
        tracing::warn!("Retrying server onboarding update failed: {}", e);
    }

    match view {
        DashboardView::SetupRequired { actions } => {
            let parked = ctx.handoff().pending()?.is_some();
            println!("Setup required");
            println!();
            println!("  Finish setting up your organization to continue.");
            println!();
            for action in actions {
                println!("  {:<14} {}", action.label(), setup_hint(action, parked));
            }
        }
        DashboardView::Dashboard { menu, active } => {
            println!("Tenant Console v{}", crate::VERSION);
            println!();
            for item in &menu {
                let marker = if Some(item.section) == active { ">" } else { " " };
                println!(
                    "{} {} {:<14} {}",
                    marker, item.icon, item.label, item.description
                );
            }
            if menu.is_empty() {
                println!("  No sections are available for your account.");
            }
        }
    }
    Ok(())
}

/// Command offered for a setup-gate action. A parked payment setup is
/// finished through `setup resume`, never by creating the organization again.
fn setup_hint(action: SetupAction, parked: bool) -> &'static str {
    match action {
        SetupAction::ResumeSetup if parked => "tenant-console setup resume --return-url '<URL>'",
        SetupAction::ResumeSetup => "tenant-console setup organization --data <FILE>",
        SetupAction::LogOut => "tenant-console logout",
    }
}

/// Show local state: config paths, onboarding flag, parked payment setup.
pub(crate) fn cmd_status(config: &Config, clear_session: bool) -> Result<()> {
    let ctx = SetupContext::new(config)?;

    if clear_session {
        ctx.session.clear().context("Failed to clear session store")?;
        println!("Session store cleared");
    }

    let state = ctx.gate.state();
    println!("Tenant Console v{}", crate::VERSION);
    println!();
    println!("Backend:        {}", config.api.base_url);
    println!(
        "Token:          {}",
        if config.api.token.is_some() { "configured" } else { "not set" }
    );
    println!("Profile store:  {}", config.storage.profile_path.display());
    println!("Session store:  {}", ctx.session.path().display());
    println!();

    let flag = match state.onboarding_complete()? {
        Some(true) => "complete",
        Some(false) => "not complete",
        None => "unknown",
    };
    println!("Onboarding:     {}", flag);
    println!(
        "Organization:   {}",
        state.organization_id()?.unwrap_or_else(|| "-".to_string())
    );
    println!(
        "User:           {}",
        state.user_id()?.unwrap_or_else(|| "-".to_string())
    );

    match ctx.handoff().pending()? {
        Some(meta) => println!(
            "Payment setup:  waiting for provider return since {} ({})",
            meta.written_at.format("%Y-%m-%d %H:%M UTC"),
            meta.id
        ),
        None => println!("Payment setup:  nothing pending"),
    }
    Ok(())
}

pub(crate) fn cmd_logout(config: &Config) -> Result<()> {
    let ctx = SetupContext::new(config)?;
    ctx.gate.log_out().context("Failed to clear profile state")?;
    ctx.session.clear().context("Failed to clear session store")?;
    println!("Logged out");
    Ok(())
}

/// Initialize configuration
pub(crate) fn cmd_init(config: &Config, force: bool) -> Result<()> {
    let config_path = Config::system_config_path();

    if config_path.exists() && !force {
        println!("Configuration already exists: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::create_dir_all(console_home()).context("Failed to create config directory")?;
    config
        .save(&config_path)
        .context("Failed to save configuration")?;

    println!("Configuration initialized: {}", config_path.display());
    println!();
    println!("Put your API token in {}:", crate::config::keys_path().display());
    println!("  [api]");
    println!("  token = \"...\"");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_hint_prefers_resume_when_parked() {
        assert_eq!(
            setup_hint(SetupAction::ResumeSetup, true),
            "tenant-console setup resume --return-url '<URL>'"
        );
        assert_eq!(
            setup_hint(SetupAction::ResumeSetup, false),
            "tenant-console setup organization --data <FILE>"
        );
        assert_eq!(setup_hint(SetupAction::LogOut, true), "tenant-console logout");
    }
}
