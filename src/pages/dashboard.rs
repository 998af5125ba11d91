//! The owner's listings

use std::sync::Arc;

use crate::error::Error;
use crate::firestore::Query;
use crate::gateway::Gateway;
use crate::model::{decode_listings, Car, CARS_COLLECTION};
use crate::notify::Toasts;
use crate::session::SessionContext;
use crate::storage::StorageRef;

/// What a listing deletion managed to do
///
/// The record is deleted before its images, and the listing leaves the local
/// list only when every image was deleted too. A listing whose record is gone
/// but whose images were not all removed stays visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub car_id: String,
    /// Storage paths deleted
    pub deleted_images: Vec<String>,
    /// Storage paths whose deletion failed
    pub failed_images: Vec<String>,
    pub removed_locally: bool,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed_images.is_empty()
    }
}

pub struct Dashboard {
    gateway: Gateway,
    session: Arc<SessionContext>,
    toasts: Toasts,
    cars: Vec<Car>,
}

impl Dashboard {
    pub fn new(gateway: Gateway, session: Arc<SessionContext>, toasts: Toasts) -> Self {
        Self {
            gateway,
            session,
            toasts,
            cars: Vec::new(),
        }
    }

    /// Load the listings owned by the signed-in user
    pub async fn load_owned(&mut self) -> Result<(), Error> {
        let user = self.session.user().ok_or(Error::NotSignedIn)?;
        let query = Query::new(CARS_COLLECTION).where_eq("uid", user.uid.as_str());

        let docs = self.gateway.db.get_docs(&query).await?;
        self.cars = decode_listings(&docs);
        Ok(())
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Delete a listing and then each of its images
    ///
    /// A failed record delete stops here and returns the error. Image
    /// failures are collected in the report; the record is not restored.
    pub async fn delete(&mut self, car_id: &str) -> Result<DeleteReport, Error> {
        let car = self
            .cars
            .iter()
            .find(|c| c.id == car_id)
            .cloned()
            .ok_or_else(|| Error::general(format!("listing {} is not on the dashboard", car_id)))?;

        if let Err(err) = self.gateway.db.delete_doc(CARS_COLLECTION, &car.id).await {
            log::error!("Failed to delete listing {}: {}", car.id, err);
            self.toasts.error("Erro ao excluir carro");
            return Err(err);
        }

        let mut report = DeleteReport {
            car_id: car.id.clone(),
            deleted_images: Vec::new(),
            failed_images: Vec::new(),
            removed_locally: false,
        };

        for image in &car.images {
            let path = image.storage_path();
            match self.gateway.storage.delete_object(&StorageRef::new(&path)).await {
                Ok(()) => report.deleted_images.push(path),
                Err(err) => {
                    log::warn!("Failed to delete image {}: {}", path, err);
                    report.failed_images.push(path);
                }
            }
        }

        if report.is_complete() {
            self.cars.retain(|c| c.id != car.id);
            report.removed_locally = true;
        } else {
            log::warn!(
                "Listing {} deleted with {} image(s) left in storage",
                car.id,
                report.failed_images.len()
            );
            self.toasts.error("Erro ao tentar excluir as imagens");
        }

        Ok(report)
    }
}
