//! Account creation

use std::sync::Arc;

use super::Navigation;
use crate::error::Error;
use crate::form::{FieldErrors, RegisterForm};
use crate::gateway::Gateway;
use crate::model::UserProfile;
use crate::notify::Toasts;
use crate::routes::AppRoute;
use crate::session::SessionContext;

pub struct Register {
    gateway: Gateway,
    session: Arc<SessionContext>,
    toasts: Toasts,
    pub form: RegisterForm,
    errors: FieldErrors,
}

impl Register {
    pub fn new(gateway: Gateway, session: Arc<SessionContext>, toasts: Toasts) -> Self {
        Self {
            gateway,
            session,
            toasts,
            form: RegisterForm::default(),
            errors: FieldErrors::new(),
        }
    }

    /// Opening the page ends any existing session
    pub async fn on_mount(&self) -> Result<(), Error> {
        self.gateway.auth.sign_out().await
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Re-validate after an input change
    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = self.form.validate();
        &self.errors
    }

    /// Create the account, set its display name and go to the dashboard
    pub async fn submit(&mut self) -> Result<Navigation, Error> {
        self.validate();
        if !self.errors.is_empty() {
            return Err(Error::Validation(self.errors.clone()));
        }

        match self.create_account().await {
            Ok(profile) => {
                log::info!("Registered user {}", profile.uid);
                self.session.handle_info_user(profile);
                self.toasts.success("Bem vindo ao Web Carros");
                Ok(Navigation::replace(AppRoute::Dashboard))
            }
            Err(err) => {
                log::error!("Failed to register user: {}", err);
                self.toasts.error("Erro ao cadastrar");
                Err(err)
            }
        }
    }

    async fn create_account(&self) -> Result<UserProfile, Error> {
        let name = self.form.name.trim();
        let email = self.form.email.trim();

        let user = self.gateway.auth.sign_up(email, &self.form.password).await?;
        self.gateway.auth.update_profile(name).await?;

        Ok(UserProfile {
            uid: user.uid,
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        })
    }
}
