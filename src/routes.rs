//! Client-side routes and the guard in front of the dashboard

use std::fmt::Display;

use crate::session::SessionState;

/// Application routes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// Listing browser
    #[default]
    Home,
    /// Listing detail
    Car(String),
    Login,
    Register,
    /// Owner's listings (requires auth)
    Dashboard,
    /// New listing form (requires auth)
    DashboardNew,
    NotFound,
}

impl AppRoute {
    /// Parse a URL path into a route
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/dashboard/new" => Self::DashboardNew,
            _ => match trimmed.strip_prefix("/car/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::Car(id.to_string()),
                _ => Self::NotFound,
            },
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Car(id) => format!("/car/{}", id),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::DashboardNew => "/dashboard/new".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Whether the route is only reachable while signed in
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard | Self::DashboardNew)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// Outcome of guarding a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Session still resolving; render a placeholder
    Loading,
    Redirect(AppRoute),
    Allow,
}

/// Decide whether `route` may render for the given session
pub fn guard(route: &AppRoute, state: &SessionState) -> Guard {
    if !route.requires_auth() {
        return Guard::Allow;
    }
    if state.loading_auth {
        return Guard::Loading;
    }
    if !state.signed() {
        return Guard::Redirect(AppRoute::Login);
    }
    Guard::Allow
}

/// What the app shows for the current route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Page(AppRoute),
}

/// Navigation state with history
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: AppRoute,
    history: Vec<AppRoute>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &AppRoute {
        &self.current
    }

    /// Visited routes, oldest first, excluding the current one
    pub fn history(&self) -> &[AppRoute] {
        &self.history
    }

    /// Push `path` onto the history and show it
    pub fn navigate(&mut self, path: &str, state: &SessionState) -> Screen {
        self.go(AppRoute::from_path(path), true, state)
    }

    /// Replace the current entry with `path`
    pub fn replace(&mut self, path: &str, state: &SessionState) -> Screen {
        self.go(AppRoute::from_path(path), false, state)
    }

    /// Re-apply the guard to the current route after a session change
    pub fn resolve(&mut self, state: &SessionState) -> Screen {
        let route = self.current.clone();
        self.go(route, false, state)
    }

    /// Go back one entry; returns `None` at the start of history
    pub fn back(&mut self, state: &SessionState) -> Option<Screen> {
        let previous = self.history.pop()?;
        Some(self.go(previous, false, state))
    }

    fn go(&mut self, target: AppRoute, push: bool, state: &SessionState) -> Screen {
        match guard(&target, state) {
            Guard::Allow => {
                self.set(target, push);
                Screen::Page(self.current.clone())
            }
            Guard::Loading => {
                self.set(target, push);
                Screen::Loading
            }
            Guard::Redirect(to) => {
                log::info!("Redirecting {} -> {}", target, to);
                // the guarded page never becomes an entry
                self.set(to, push);
                Screen::Page(self.current.clone())
            }
        }
    }

    fn set(&mut self, route: AppRoute, push: bool) {
        if push && route != self.current {
            let previous = std::mem::replace(&mut self.current, route);
            self.history.push(previous);
        } else {
            self.current = route;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserProfile;

    fn signed_in() -> SessionState {
        SessionState {
            user: Some(UserProfile {
                uid: "u1".into(),
                name: None,
                email: None,
            }),
            loading_auth: false,
        }
    }

    fn signed_out() -> SessionState {
        SessionState {
            user: None,
            loading_auth: false,
        }
    }

    #[test]
    fn parses_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/car/abc"), AppRoute::Car("abc".into()));
        assert_eq!(AppRoute::from_path("/car/"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/dashboard/new"), AppRoute::DashboardNew);
        assert_eq!(AppRoute::from_path("/dashboard/?x=1"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn paths_round_trip_for_every_route() {
        for route in [
            AppRoute::Home,
            AppRoute::Car("x1".into()),
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Dashboard,
            AppRoute::DashboardNew,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn guard_waits_while_loading() {
        let loading = SessionState::default();
        assert_eq!(guard(&AppRoute::Dashboard, &loading), Guard::Loading);
        assert_eq!(guard(&AppRoute::Home, &loading), Guard::Allow);
    }

    #[test]
    fn guard_redirects_signed_out_users() {
        for route in [AppRoute::Dashboard, AppRoute::DashboardNew] {
            assert_eq!(
                guard(&route, &signed_out()),
                Guard::Redirect(AppRoute::Login)
            );
            assert_eq!(guard(&route, &signed_in()), Guard::Allow);
        }
    }

    #[test]
    fn router_redirects_and_keeps_history() {
        let mut router = Router::new();
        let screen = router.navigate("/dashboard/new", &signed_out());
        assert_eq!(screen, Screen::Page(AppRoute::Login));
        assert_eq!(router.current(), &AppRoute::Login);
        assert_eq!(router.history(), &[AppRoute::Home]);
    }

    #[test]
    fn resolve_after_sign_out_leaves_dashboard() {
        let mut router = Router::new();
        router.navigate("/dashboard", &signed_in());
        assert_eq!(router.current(), &AppRoute::Dashboard);

        let screen = router.resolve(&signed_out());
        assert_eq!(screen, Screen::Page(AppRoute::Login));
    }

    #[test]
    fn loading_screen_keeps_target_route() {
        let mut router = Router::new();
        let screen = router.navigate("/dashboard", &SessionState::default());
        assert_eq!(screen, Screen::Loading);

        let screen = router.resolve(&signed_in());
        assert_eq!(screen, Screen::Page(AppRoute::Dashboard));
    }

    #[test]
    fn replace_does_not_grow_history() {
        let mut router = Router::new();
        router.navigate("/register", &signed_out());
        router.replace("/dashboard", &signed_in());
        assert_eq!(router.current(), &AppRoute::Dashboard);
        assert_eq!(router.history(), &[AppRoute::Home]);

        let screen = router.back(&signed_in());
        assert_eq!(screen, Some(Screen::Page(AppRoute::Home)));
        assert!(router.back(&signed_in()).is_none());
    }
}
