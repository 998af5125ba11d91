//! New listing form with staged photo uploads

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::Error;
use crate::firestore::{FieldValue, Fields};
use crate::form::{CarField, CarForm, FieldErrors};
use crate::gateway::Gateway;
use crate::model::{image_path, CarImage, CARS_COLLECTION};
use crate::notify::Toasts;
use crate::session::SessionContext;
use crate::storage::StorageRef;
use crate::sync::lock;

/// Content types accepted for listing photos
pub const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Local preview of the picked bytes
    pub fn preview_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Lifecycle of a staged image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Selected,
    Uploading,
    Uploaded { url: String },
    Removed,
}

impl ImageState {
    pub fn label(&self) -> &'static str {
        match self {
            ImageState::Selected => "selected",
            ImageState::Uploading => "uploading",
            ImageState::Uploaded { .. } => "uploaded",
            ImageState::Removed => "removed",
        }
    }

    /// Move to `next`, allowing only selected -> uploading -> uploaded -> removed
    pub fn transition(&self, next: ImageState) -> Result<ImageState, Error> {
        let allowed = matches!(
            (self, &next),
            (ImageState::Selected, ImageState::Uploading)
                | (ImageState::Uploading, ImageState::Uploaded { .. })
                | (ImageState::Uploaded { .. }, ImageState::Removed)
        );
        if allowed {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self.label(),
                to: next.label(),
            })
        }
    }
}

/// An image picked for the listing being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    /// Owner identifier
    pub uid: String,
    /// Generated object name
    pub name: String,
    pub preview_url: String,
    pub state: ImageState,
}

impl StagedImage {
    pub fn storage_path(&self) -> String {
        image_path(&self.uid, &self.name)
    }

    /// Download URL once uploaded
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            ImageState::Uploaded { url } => Some(url),
            _ => None,
        }
    }

    fn to_car_image(&self) -> Option<CarImage> {
        self.url().map(|url| CarImage {
            uid: self.uid.clone(),
            name: self.name.clone(),
            url: url.to_string(),
        })
    }
}

pub struct NewCar {
    gateway: Gateway,
    session: Arc<SessionContext>,
    toasts: Toasts,
    form: CarForm,
    errors: FieldErrors,
    images: Arc<Mutex<Vec<StagedImage>>>,
}

impl NewCar {
    pub fn new(gateway: Gateway, session: Arc<SessionContext>, toasts: Toasts) -> Self {
        Self {
            gateway,
            session,
            toasts,
            form: CarForm::new(),
            errors: FieldErrors::new(),
            images: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn form(&self) -> &CarForm {
        &self.form
    }

    /// Validation messages as of the last keystroke
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn images(&self) -> Vec<StagedImage> {
        lock(&self.images).clone()
    }

    /// Update one input and re-validate the form
    pub fn input(&mut self, field: CarField, value: impl Into<String>) -> &FieldErrors {
        self.form.set(field, value);
        self.errors = self.form.validate();
        &self.errors
    }

    fn set_state(&self, name: &str, next: ImageState) -> Result<(), Error> {
        let mut images = lock(&self.images);
        let image = images
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::general(format!("image {} is not staged", name)))?;
        image.state = image.state.transition(next)?;
        Ok(())
    }

    fn unstage(&self, name: &str) {
        lock(&self.images).retain(|i| i.name != name);
    }

    /// Upload a picked file and stage it
    ///
    /// Only jpeg and png are accepted. A failed upload is unstaged again.
    pub async fn add_image(&self, file: ImageFile) -> Result<StagedImage, Error> {
        if !ACCEPTED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
            self.toasts.error("Envie uma imagem jpeg ou png");
            return Err(Error::UnsupportedImageType(file.content_type));
        }
        let user = self.session.user().ok_or(Error::NotSignedIn)?;

        let staged = StagedImage {
            uid: user.uid.clone(),
            name: Uuid::new_v4().to_string(),
            preview_url: file.preview_url(),
            state: ImageState::Selected,
        };
        let name = staged.name.clone();
        let path = staged.storage_path();
        lock(&self.images).push(staged);
        self.set_state(&name, ImageState::Uploading)?;

        let url = match self.upload(&path, file).await {
            Ok(url) => url,
            Err(err) => {
                log::error!("Failed to upload image {}: {}", path, err);
                self.unstage(&name);
                self.toasts.error("Erro ao enviar imagem");
                return Err(err);
            }
        };

        self.set_state(&name, ImageState::Uploaded { url })?;
        self.toasts.success("Imagem cadastrada com sucesso");

        lock(&self.images)
            .iter()
            .find(|i| i.name == name)
            .cloned()
            .ok_or_else(|| Error::general(format!("image {} is not staged", name)))
    }

    async fn upload(&self, path: &str, file: ImageFile) -> Result<String, Error> {
        let reference = self
            .gateway
            .storage
            .upload_bytes(path, file.bytes, &file.content_type)
            .await?;
        self.gateway.storage.get_download_url(&reference).await
    }

    /// Delete an uploaded image from storage and unstage it
    ///
    /// Images still uploading cannot be removed. On a storage failure the
    /// image stays staged.
    pub async fn remove_image(&self, name: &str) -> Result<(), Error> {
        let image = lock(&self.images)
            .iter()
            .find(|i| i.name == name)
            .cloned()
            .ok_or_else(|| Error::general(format!("image {} is not staged", name)))?;
        image.state.transition(ImageState::Removed)?;

        let reference = StorageRef::new(&image.storage_path());
        match self.gateway.storage.delete_object(&reference).await {
            Ok(()) => {
                self.set_state(name, ImageState::Removed)?;
                self.unstage(name);
                self.toasts.success("Imagem deletada.");
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to delete image {}: {}", reference.full_path(), err);
                self.toasts.error("Erro ao deletar imagem");
                Err(err)
            }
        }
    }

    /// Validate and store the listing, returning its id
    pub async fn submit(&mut self) -> Result<String, Error> {
        self.errors = self.form.validate();
        if !self.errors.is_empty() {
            return Err(Error::Validation(self.errors.clone()));
        }

        let images: Vec<CarImage> = lock(&self.images)
            .iter()
            .filter_map(StagedImage::to_car_image)
            .collect();
        if images.is_empty() {
            self.toasts.error("Envie pelo menos uma imagem.");
            return Err(Error::MissingImages);
        }
        let user = self.session.user().ok_or(Error::NotSignedIn)?;

        let mut fields = Fields::new();
        for field in [
            CarField::Model,
            CarField::Year,
            CarField::KmRodado,
            CarField::Valor,
            CarField::Cidade,
            CarField::Whatsapp,
            CarField::Descricao,
        ] {
            fields.insert(field.key().to_string(), self.form.get(field).into());
        }
        fields.insert("name".into(), self.form.name.to_uppercase().into());
        fields.insert("created".into(), FieldValue::ServerTimestamp);
        fields.insert("owner".into(), user.name.clone().into());
        fields.insert("uid".into(), user.uid.as_str().into());
        fields.insert(
            "images".into(),
            FieldValue::Array(images.iter().map(CarImage::to_field).collect()),
        );

        match self.gateway.db.add_doc(CARS_COLLECTION, fields).await {
            Ok(id) => {
                log::info!("Listing {} created with {} image(s)", id, images.len());
                self.form.reset();
                self.errors = FieldErrors::new();
                // uploads still in flight stay staged
                lock(&self.images).retain(|i| i.url().is_none());
                self.toasts.success("Carro cadastrado com sucesso");
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to save listing: {}", err);
                self.toasts.error("Erro ao cadastrar carro");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_upload_lifecycle() {
        let state = ImageState::Selected;
        let state = state.transition(ImageState::Uploading).unwrap();
        let state = state
            .transition(ImageState::Uploaded { url: "u".into() })
            .unwrap();
        assert!(state.transition(ImageState::Removed).is_ok());
    }

    #[test]
    fn removing_while_uploading_is_rejected() {
        let err = ImageState::Uploading
            .transition(ImageState::Removed)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: "uploading",
                to: "removed"
            }
        ));
    }

    #[test]
    fn removed_is_terminal() {
        assert!(ImageState::Removed
            .transition(ImageState::Uploading)
            .is_err());
    }

    #[test]
    fn preview_is_a_data_url() {
        let file = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(file.preview_url(), "data:image/png;base64,AQID");
    }
}
