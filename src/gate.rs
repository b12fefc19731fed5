//! Completion / Redirect Gate
//!
//! Decides on every dashboard mount whether the user gets the dashboard or
//! the blocking setup screen, and performs the hand-over once setup is done.

use crate::api::{ConsoleApi, SessionInfo};
use crate::error::Result;
use crate::navigation::{MENU_ITEMS, MenuItem, Section, filter_menu, resolve_active_section};
use crate::storage::PersistedState;

/// Where the host must go next. Always a full navigation: session-derived
/// state is rebuilt from storage and the server, never reused from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    DashboardRoot,
    Setup,
    SignIn,
}

/// The only actions offered on the blocking setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupAction {
    ResumeSetup,
    LogOut,
}

impl SetupAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ResumeSetup => "Resume setup",
            Self::LogOut => "Log out",
        }
    }
}

pub const SETUP_ACTIONS: [SetupAction; 2] = [SetupAction::ResumeSetup, SetupAction::LogOut];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    /// Setup unfinished. Nothing else is reachable.
    SetupRequired { actions: [SetupAction; 2] },
    Dashboard {
        menu: Vec<&'static MenuItem>,
        active: Option<Section>,
    },
}

/// What reconciling the local flag against the server did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Local and server agree.
    InSync(bool),
    /// No usable local flag; the server value was cached.
    Cached(bool),
    /// Local said not onboarded, server said onboarded; local was corrected.
    Corrected,
    /// Local completion the server has not recorded yet. Local stays `true`;
    /// the server update is worth retrying.
    ServerBehind,
}

impl Reconciliation {
    pub fn onboarded(&self) -> bool {
        match self {
            Self::InSync(flag) | Self::Cached(flag) => *flag,
            Self::Corrected | Self::ServerBehind => true,
        }
    }
}

/// Result of a dashboard mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mounted {
    pub view: DashboardView,
    /// The reconciliation this mount performed; `ServerBehind` asks the host
    /// to retry the server update.
    pub reconciliation: Reconciliation,
}

#[derive(Clone)]
pub struct DashboardGate {
    state: PersistedState,
}

impl DashboardGate {
    pub fn new(state: PersistedState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Single point where the local onboarding flag meets the server's.
    ///
    /// The server moves the flag forward; a local completion is never undone
    /// by a server that has not caught up.
    pub fn reconcile(&self, server_flag: bool) -> Result<Reconciliation> {
        let outcome = match self.state.onboarding_complete()? {
            None => {
                self.state.set_onboarding_complete(server_flag)?;
                Reconciliation::Cached(server_flag)
            }
            Some(local) if local == server_flag => Reconciliation::InSync(local),
            Some(false) => {
                self.state.set_onboarding_complete(true)?;
                Reconciliation::Corrected
            }
            Some(true) => Reconciliation::ServerBehind,
        };
        match outcome {
            Reconciliation::InSync(_) => {}
            Reconciliation::ServerBehind => {
                tracing::info!("Server has not recorded onboarding yet")
            }
            other => tracing::debug!("Onboarding flag reconciled: {:?}", other),
        }
        Ok(outcome)
    }

    /// Decide what a dashboard mount shows. Reconciles exactly once.
    pub fn mount(&self, session: &SessionInfo, requested: Option<Section>) -> Result<Mounted> {
        self.remember_session(session)?;

        let reconciliation = self.reconcile(session.onboarded)?;
        if !reconciliation.onboarded() {
            tracing::info!("Setup unfinished for user {}, showing setup gate", session.user_id);
            return Ok(Mounted {
                view: DashboardView::SetupRequired {
                    actions: SETUP_ACTIONS,
                },
                reconciliation,
            });
        }

        let menu = filter_menu(MENU_ITEMS, &session.permissions, session.account_class);
        let active = resolve_active_section(&menu, requested);
        tracing::debug!(
            "Dashboard for {}: {} menu item(s), active {:?}",
            session.user_id,
            menu.len(),
            active
        );
        Ok(Mounted {
            view: DashboardView::Dashboard { menu, active },
            reconciliation,
        })
    }

    fn remember_session(&self, session: &SessionInfo) -> Result<()> {
        if self.state.user_id()?.as_deref() != Some(session.user_id.as_str()) {
            self.state.set_user_id(&session.user_id)?;
        }
        if let Some(org) = &session.organization_id
            && self.state.organization_id()?.as_deref() != Some(org.as_str())
        {
            self.state.set_organization_id(org)?;
        }
        Ok(())
    }

    /// Setup finished: persist the flag, tell the server (best effort),
    /// then send the host to the dashboard root.
    pub async fn complete_setup(
        &self,
        api: &dyn ConsoleApi,
        organization_id: Option<&str>,
    ) -> Result<Navigate> {
        self.state.set_onboarding_complete(true)?;
        if let Some(org) = organization_id {
            self.state.set_organization_id(org)?;
        }

        match self.state.organization_id()? {
            Some(org) => {
                if let Err(e) = api.mark_onboarded(&org).await {
                    tracing::warn!("Could not record onboarding on the server: {}", e);
                }
            }
            None => tracing::warn!("No organization id known, skipping server onboarding update"),
        }

        tracing::info!("Setup complete");
        Ok(Navigate::DashboardRoot)
    }

    pub fn resume_setup(&self) -> Navigate {
        Navigate::Setup
    }

    /// Forget the console-owned profile keys.
    pub fn log_out(&self) -> Result<Navigate> {
        self.state.clear()?;
        tracing::info!("Logged out");
        Ok(Navigate::SignIn)
    }
}
