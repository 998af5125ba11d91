//! View-models for the shared presentation pieces

use crate::form::FieldErrors;
use crate::routes::AppRoute;
use crate::session::SessionState;

/// Right-hand action of the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    /// Session still resolving, nothing shown
    Hidden,
    /// Signed in: user icon linking to the dashboard
    Dashboard,
    /// Signed out: login icon
    Login,
}

impl HeaderAction {
    pub fn target(&self) -> Option<AppRoute> {
        match self {
            HeaderAction::Hidden => None,
            HeaderAction::Dashboard => Some(AppRoute::Dashboard),
            HeaderAction::Login => Some(AppRoute::Login),
        }
    }
}

pub fn header_action(state: &SessionState) -> HeaderAction {
    match (state.loading_auth, state.signed()) {
        (true, _) => HeaderAction::Hidden,
        (false, true) => HeaderAction::Dashboard,
        (false, false) => HeaderAction::Login,
    }
}

/// Link shown in the dashboard panel header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLink {
    pub label: &'static str,
    pub route: AppRoute,
}

pub fn panel_links() -> Vec<PanelLink> {
    vec![
        PanelLink {
            label: "Dashboard",
            route: AppRoute::Dashboard,
        },
        PanelLink {
            label: "Cadastrar carro",
            route: AppRoute::DashboardNew,
        },
    ]
}

/// Label of the panel's sign-out action
pub const SIGN_OUT_LABEL: &str = "Sair da conta";

/// Props of a form input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProps {
    pub name: &'static str,
    pub input_type: &'static str,
    pub placeholder: &'static str,
    pub error: Option<String>,
}

impl InputProps {
    pub fn new(name: &'static str, input_type: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            input_type,
            placeholder,
            error: None,
        }
    }

    /// Attach the current error for this input, if any
    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.error = errors.get(self.name).map(str::to_string);
        self
    }
}
