//! Listing browser with name search

use std::collections::HashSet;

use crate::error::Error;
use crate::firestore::{Direction, Query};
use crate::gateway::Gateway;
use crate::model::{decode_listings, Car, CARS_COLLECTION};
use crate::routes::AppRoute;

/// Appended to a prefix to build the upper bound of a range search
pub const SEARCH_SENTINEL: char = '\u{f8ff}';

/// A listing as shown on the browser grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarCard {
    pub id: String,
    pub name: String,
    /// First image; `None` only for records that bypassed decoding
    pub cover_url: Option<String>,
    /// Whether the cover finished loading; a placeholder is shown until then
    pub image_loaded: bool,
    pub subtitle: String,
    pub price: String,
    pub city: String,
    pub link: AppRoute,
}

pub struct Home {
    gateway: Gateway,
    cars: Vec<Car>,
    loaded_images: HashSet<String>,
}

impl Home {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            cars: Vec::new(),
            loaded_images: HashSet::new(),
        }
    }

    /// Every listing, newest first
    pub fn all_query() -> Query {
        Query::new(CARS_COLLECTION).order_by("created", Direction::Descending)
    }

    /// Listings whose stored name starts with `term`, compared in upper case
    pub fn search_query(term: &str) -> Query {
        let lower = term.to_uppercase();
        let mut upper = lower.clone();
        upper.push(SEARCH_SENTINEL);

        Query::new(CARS_COLLECTION)
            .where_gte("name", lower)
            .where_lte("name", upper)
    }

    /// Replace the listing set with every listing
    ///
    /// On error the current listings are kept.
    pub async fn load_all(&mut self) -> Result<(), Error> {
        let docs = self.gateway.db.get_docs(&Self::all_query()).await?;
        self.cars = decode_listings(&docs);
        Ok(())
    }

    /// Search by name prefix; an empty term loads everything
    ///
    /// The term is used as typed, so surrounding spaces are part of the prefix.
    pub async fn search(&mut self, term: &str) -> Result<(), Error> {
        if term.is_empty() {
            return self.load_all().await;
        }

        self.cars.clear();
        self.loaded_images.clear();

        let docs = self.gateway.db.get_docs(&Self::search_query(term)).await?;
        self.cars = decode_listings(&docs);
        log::debug!("Search {:?} matched {} listings", term, self.cars.len());
        Ok(())
    }

    /// Mark a card's cover image as loaded
    pub fn handle_image_load(&mut self, id: &str) {
        self.loaded_images.insert(id.to_string());
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn cards(&self) -> Vec<CarCard> {
        self.cars
            .iter()
            .map(|car| CarCard {
                id: car.id.clone(),
                name: car.name.clone(),
                cover_url: car.cover().map(|image| image.url.clone()),
                image_loaded: self.loaded_images.contains(&car.id),
                subtitle: format!("{} | {} km", car.year, car.km_rodado),
                price: format!("R$ {}", car.valor),
                city: car.cidade.clone(),
                link: AppRoute::Car(car.id.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_uppercases_and_bounds_prefix() {
        let query = Home::search_query("gol");
        let filters = query.filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].value.as_str(), Some("GOL"));
        assert_eq!(filters[1].value.as_str(), Some("GOL\u{f8ff}"));
    }

    #[test]
    fn all_query_has_no_filters() {
        assert!(Home::all_query().filters().is_empty());
    }
}
