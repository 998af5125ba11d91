//! Page controllers
//!
//! Each page holds the state its view renders and exposes the user actions as
//! methods. Pages talk to the platform only through [`crate::gateway::Gateway`].

pub mod car;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod new;
pub mod register;

pub use car::{CarDetail, DetailOutcome};
pub use dashboard::{Dashboard, DeleteReport};
pub use home::{CarCard, Home};
pub use login::Login;
pub use new::{ImageFile, ImageState, NewCar, StagedImage};
pub use register::Register;

use crate::routes::AppRoute;

/// Where a page wants to go after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: AppRoute,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl Navigation {
    pub fn push(route: AppRoute) -> Self {
        Self {
            route,
            replace: false,
        }
    }

    pub fn replace(route: AppRoute) -> Self {
        Self {
            route,
            replace: true,
        }
    }
}
