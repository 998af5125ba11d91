//! Application shell: gateway, session, router and toasts

use std::sync::Arc;

use crate::components::{header_action, HeaderAction};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::notify::Toasts;
use crate::pages::{CarDetail, Dashboard, Home, Login, Navigation, NewCar, Register};
use crate::routes::{AppRoute, Router, Screen};
use crate::session::SessionContext;

pub struct App {
    gateway: Gateway,
    session: Arc<SessionContext>,
    router: Router,
    toasts: Toasts,
}

impl App {
    /// Start the session context and open the home route
    pub fn new(gateway: Gateway) -> Self {
        let session = Arc::new(SessionContext::start(gateway.auth.as_ref()));
        Self {
            gateway,
            session,
            router: Router::new(),
            toasts: Toasts::new(),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn current_route(&self) -> &AppRoute {
        self.router.current()
    }

    pub fn navigate(&mut self, path: &str) -> Screen {
        self.router.navigate(path, &self.session.state())
    }

    pub fn replace(&mut self, path: &str) -> Screen {
        self.router.replace(path, &self.session.state())
    }

    /// Apply a page's navigation request
    pub fn follow(&mut self, navigation: &Navigation) -> Screen {
        let path = navigation.route.to_path();
        if navigation.replace {
            self.replace(&path)
        } else {
            self.navigate(&path)
        }
    }

    /// Screen for the current route under the latest session state
    pub fn screen(&mut self) -> Screen {
        self.router.resolve(&self.session.state())
    }

    pub fn header(&self) -> HeaderAction {
        header_action(&self.session.state())
    }

    /// Sign out from the panel header and re-check the current route
    pub async fn sign_out(&mut self) -> Result<Screen, Error> {
        self.gateway.auth.sign_out().await?;
        Ok(self.screen())
    }

    pub fn home(&self) -> Home {
        Home::new(self.gateway.clone())
    }

    pub fn car_detail(&self, viewport_width: u32) -> CarDetail {
        CarDetail::new(self.gateway.clone(), viewport_width)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            self.gateway.clone(),
            self.session.clone(),
            self.toasts.clone(),
        )
    }

    pub fn new_car(&self) -> NewCar {
        NewCar::new(
            self.gateway.clone(),
            self.session.clone(),
            self.toasts.clone(),
        )
    }

    pub fn register(&self) -> Register {
        Register::new(
            self.gateway.clone(),
            self.session.clone(),
            self.toasts.clone(),
        )
    }

    pub fn login(&self) -> Login {
        Login::new(self.gateway.clone(), self.toasts.clone())
    }
}
