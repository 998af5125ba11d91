//! Listing, image and user records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::error::Error;
use crate::firestore::{Document, FieldValue, Fields};

/// Collection holding every listing
pub const CARS_COLLECTION: &str = "cars";

/// Storage path of a listing photo
pub fn image_path(uid: &str, name: &str) -> String {
    format!("images/{}/{}", uid, name)
}

/// The signed-in user as the pages see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile::from(&user)
    }
}

/// A photo attached to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarImage {
    /// Owner identifier
    pub uid: String,
    /// Generated object name
    pub name: String,
    /// Download URL
    pub url: String,
}

impl CarImage {
    pub fn storage_path(&self) -> String {
        image_path(&self.uid, &self.name)
    }

    pub(crate) fn to_field(&self) -> FieldValue {
        let mut fields = Fields::new();
        fields.insert("uid".into(), self.uid.as_str().into());
        fields.insert("name".into(), self.name.as_str().into());
        fields.insert("url".into(), self.url.as_str().into());
        FieldValue::Map(fields)
    }

    fn from_field(id: &str, index: usize, value: &FieldValue) -> Result<Self, Error> {
        let map = value.as_map().ok_or_else(|| {
            Error::malformed(id, format!("images[{}] is a {}, not a map", index, value.kind()))
        })?;
        let text = |key: &str| -> Result<String, Error> {
            map.get(key)
                .and_then(FieldValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::malformed(id, format!("images[{}].{} must be a string", index, key)))
        };

        Ok(CarImage {
            uid: text("uid")?,
            name: text("name")?,
            url: text("url")?,
        })
    }
}

/// A car listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub name: String,
    pub model: String,
    pub year: String,
    pub km_rodado: String,
    pub valor: String,
    pub cidade: String,
    pub whatsapp: String,
    pub descricao: String,
    pub created: DateTime<Utc>,
    /// Owner display name at creation time
    pub owner: Option<String>,
    /// Owner identifier
    pub uid: String,
    pub images: Vec<CarImage>,
}

impl Car {
    /// Decode a stored listing, rejecting any record that is missing a field
    /// or has no images
    pub fn from_document(doc: &Document) -> Result<Self, Error> {
        let id = doc.id.as_str();
        let text = |key: &str| -> Result<String, Error> {
            match doc.get(key) {
                Some(FieldValue::String(s)) => Ok(s.clone()),
                Some(other) => Err(Error::malformed(
                    id,
                    format!("{} is a {}, expected string", key, other.kind()),
                )),
                None => Err(Error::malformed(id, format!("missing field {}", key))),
            }
        };

        let valor = match doc.get("valor") {
            Some(FieldValue::String(s)) => s.clone(),
            Some(FieldValue::Integer(n)) => n.to_string(),
            Some(FieldValue::Double(n)) => n.to_string(),
            Some(other) => {
                return Err(Error::malformed(
                    id,
                    format!("valor is a {}, expected string or number", other.kind()),
                ))
            }
            None => return Err(Error::malformed(id, "missing field valor")),
        };

        let created = doc
            .get("created")
            .and_then(FieldValue::as_timestamp)
            .ok_or_else(|| Error::malformed(id, "created must be a timestamp"))?;

        let owner = match doc.get("owner") {
            None | Some(FieldValue::Null) => None,
            Some(FieldValue::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(Error::malformed(
                    id,
                    format!("owner is a {}, expected string", other.kind()),
                ))
            }
        };

        let images = doc
            .get("images")
            .and_then(FieldValue::as_array)
            .ok_or_else(|| Error::malformed(id, "images must be an array"))?
            .iter()
            .enumerate()
            .map(|(i, v)| CarImage::from_field(id, i, v))
            .collect::<Result<Vec<_>, _>>()?;
        if images.is_empty() {
            return Err(Error::malformed(id, "listing has no images"));
        }

        Ok(Car {
            id: id.to_string(),
            name: text("name")?,
            model: text("model")?,
            year: text("year")?,
            km_rodado: text("kmRodado")?,
            valor,
            cidade: text("cidade")?,
            whatsapp: text("whatsapp")?,
            descricao: text("descricao")?,
            created,
            owner,
            uid: text("uid")?,
            images,
        })
    }

    /// Cover photo shown on cards
    pub fn cover(&self) -> Option<&CarImage> {
        self.images.first()
    }
}

/// Decode a batch of documents for a list screen, skipping malformed records
pub(crate) fn decode_listings(docs: &[Document]) -> Vec<Car> {
    docs.iter()
        .filter_map(|doc| match Car::from_document(doc) {
            Ok(car) => Some(car),
            Err(err) => {
                log::warn!("Skipping listing: {}", err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn car_fields(name: &str, uid: &str, created_secs: i64, image_names: &[&str]) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), name.into());
        fields.insert("model".into(), "1.0 FLEX".into());
        fields.insert("year".into(), "2016/2017".into());
        fields.insert("kmRodado".into(), "52000".into());
        fields.insert("valor".into(), "35000".into());
        fields.insert("cidade".into(), "Campo Grande".into());
        fields.insert("whatsapp".into(), "67999999999".into());
        fields.insert("descricao".into(), "Único dono".into());
        fields.insert(
            "created".into(),
            FieldValue::Timestamp(Utc.timestamp_opt(created_secs, 0).unwrap()),
        );
        fields.insert("owner".into(), "Maria".into());
        fields.insert("uid".into(), uid.into());
        fields.insert(
            "images".into(),
            FieldValue::Array(
                image_names
                    .iter()
                    .map(|n| {
                        CarImage {
                            uid: uid.to_string(),
                            name: n.to_string(),
                            url: format!("https://img.test/{}", n),
                        }
                        .to_field()
                    })
                    .collect(),
            ),
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::car_fields;
    use super::*;

    fn doc(fields: Fields) -> Document {
        Document {
            id: "car-1".into(),
            fields,
        }
    }

    #[test]
    fn decodes_complete_listing() {
        let car = Car::from_document(&doc(car_fields("GOL", "u1", 10, &["a", "b"]))).unwrap();
        assert_eq!(car.id, "car-1");
        assert_eq!(car.name, "GOL");
        assert_eq!(car.km_rodado, "52000");
        assert_eq!(car.owner.as_deref(), Some("Maria"));
        assert_eq!(car.images.len(), 2);
        assert_eq!(car.cover().map(|i| i.name.as_str()), Some("a"));
        assert_eq!(car.images[1].storage_path(), "images/u1/b");
    }

    #[test]
    fn numeric_price_is_rendered_as_text() {
        let mut fields = car_fields("GOL", "u1", 10, &["a"]);
        fields.insert("valor".into(), FieldValue::Integer(42000));
        let car = Car::from_document(&doc(fields)).unwrap();
        assert_eq!(car.valor, "42000");
    }

    #[test]
    fn listing_without_images_is_malformed() {
        let fields = car_fields("GOL", "u1", 10, &[]);
        let err = Car::from_document(&doc(fields)).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref id, .. } if id == "car-1"));
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut fields = car_fields("GOL", "u1", 10, &["a"]);
        fields.remove("whatsapp");
        let err = Car::from_document(&doc(fields)).unwrap_err();
        assert!(err.to_string().contains("whatsapp"));
    }

    #[test]
    fn image_with_wrong_shape_is_malformed() {
        let mut fields = car_fields("GOL", "u1", 10, &["a"]);
        fields.insert("images".into(), FieldValue::Array(vec!["a".into()]));
        assert!(Car::from_document(&doc(fields)).is_err());
    }

    #[test]
    fn null_owner_is_accepted() {
        let mut fields = car_fields("GOL", "u1", 10, &["a"]);
        fields.insert("owner".into(), FieldValue::Null);
        let car = Car::from_document(&doc(fields)).unwrap();
        assert_eq!(car.owner, None);
    }

    #[test]
    fn list_decode_skips_bad_records() {
        let good = doc(car_fields("GOL", "u1", 10, &["a"]));
        let bad = Document {
            id: "bad".into(),
            fields: car_fields("UNO", "u1", 11, &[]),
        };
        let cars = decode_listings(&[bad, good]);
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].name, "GOL");
    }

    #[test]
    fn profile_from_user() {
        let user = User {
            uid: "u1".into(),
            email: Some("a@b.com".into()),
            display_name: Some("Ana".into()),
        };
        let profile = UserProfile::from(&user);
        assert_eq!(profile.name.as_deref(), Some("Ana"));
    }
}
