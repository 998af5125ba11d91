//! Listing detail

use url::Url;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::model::{Car, CarImage, CARS_COLLECTION};
use crate::routes::AppRoute;

/// Viewports narrower than this show one slide at a time
pub const SLIDE_BREAKPOINT: u32 = 720;

const WHATSAPP_SEND_URL: &str = "https://api.whatsapp.com/send";

pub fn slides_per_view(width: u32) -> u8 {
    if width < SLIDE_BREAKPOINT {
        1
    } else {
        2
    }
}

/// Click-to-chat link for a listing
pub fn whatsapp_link(phone: &str, car_name: &str) -> Result<Url, Error> {
    let text = format!("Olá vi esse {} e fiquei interessado.", car_name);
    Ok(Url::parse_with_params(
        WHATSAPP_SEND_URL,
        &[("phone", phone), ("text", text.as_str())],
    )?)
}

/// Result of loading a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Loaded,
    /// No such listing; the view navigates away
    Redirect(AppRoute),
}

pub struct CarDetail {
    gateway: Gateway,
    car: Option<Car>,
    slides_per_view: u8,
}

impl CarDetail {
    pub fn new(gateway: Gateway, viewport_width: u32) -> Self {
        Self {
            gateway,
            car: None,
            slides_per_view: slides_per_view(viewport_width),
        }
    }

    /// Load the listing `id`
    ///
    /// A missing listing (or an empty id) sends the user home; a record with
    /// the wrong shape is an error.
    pub async fn load_by_id(&mut self, id: &str) -> Result<DetailOutcome, Error> {
        if id.is_empty() {
            return Ok(DetailOutcome::Redirect(AppRoute::Home));
        }

        match self.gateway.db.get_doc(CARS_COLLECTION, id).await? {
            Some(doc) => {
                self.car = Some(Car::from_document(&doc)?);
                Ok(DetailOutcome::Loaded)
            }
            None => {
                log::info!("Listing {} not found", id);
                self.car = None;
                Ok(DetailOutcome::Redirect(AppRoute::Home))
            }
        }
    }

    /// Recompute the carousel layout for a new viewport width
    pub fn handle_resize(&mut self, width: u32) {
        self.slides_per_view = slides_per_view(width);
    }

    pub fn slides_per_view(&self) -> u8 {
        self.slides_per_view
    }

    pub fn car(&self) -> Option<&Car> {
        self.car.as_ref()
    }

    /// Carousel slides, in stored order
    pub fn slides(&self) -> &[CarImage] {
        self.car.as_ref().map(|c| c.images.as_slice()).unwrap_or_default()
    }

    pub fn contact_url(&self) -> Result<String, Error> {
        let car = self
            .car
            .as_ref()
            .ok_or_else(|| Error::general("no listing loaded"))?;
        Ok(whatsapp_link(&car.whatsapp, &car.name)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_switches_slides() {
        assert_eq!(slides_per_view(719), 1);
        assert_eq!(slides_per_view(720), 2);
        assert_eq!(slides_per_view(1280), 2);
        assert_eq!(slides_per_view(0), 1);
    }

    #[test]
    fn whatsapp_link_carries_phone_and_message() {
        let url = whatsapp_link("67999999999", "GOL").unwrap();
        assert_eq!(url.host_str(), Some("api.whatsapp.com"));
        assert_eq!(url.path(), "/send");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("phone".to_string(), "67999999999".to_string()),
                (
                    "text".to_string(),
                    "Olá vi esse GOL e fiquei interessado.".to_string()
                ),
            ]
        );
    }
}
