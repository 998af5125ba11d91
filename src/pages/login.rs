//! Email / password sign-in

use super::Navigation;
use crate::error::Error;
use crate::form::{FieldErrors, LoginForm};
use crate::gateway::Gateway;
use crate::notify::Toasts;
use crate::routes::AppRoute;

pub struct Login {
    gateway: Gateway,
    toasts: Toasts,
    pub form: LoginForm,
    errors: FieldErrors,
}

impl Login {
    pub fn new(gateway: Gateway, toasts: Toasts) -> Self {
        Self {
            gateway,
            toasts,
            form: LoginForm::default(),
            errors: FieldErrors::new(),
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = self.form.validate();
        &self.errors
    }

    /// Sign in; the session context picks the user up from the auth stream
    pub async fn submit(&mut self) -> Result<Navigation, Error> {
        self.validate();
        if !self.errors.is_empty() {
            return Err(Error::Validation(self.errors.clone()));
        }

        match self
            .gateway
            .auth
            .sign_in(self.form.email.trim(), &self.form.password)
            .await
        {
            Ok(user) => {
                log::info!("Signed in as {}", user.uid);
                self.toasts.success("Logado com sucesso");
                Ok(Navigation::replace(AppRoute::Dashboard))
            }
            Err(err) => {
                log::error!("Failed to sign in: {}", err);
                self.toasts.error("Erro ao fazer login");
                Err(err)
            }
        }
    }
}
