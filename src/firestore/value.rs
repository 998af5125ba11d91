//! Typed document values and their Firestore wire encoding

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::Error;

/// Field map of a document
pub type Fields = BTreeMap<String, FieldValue>;

/// A document field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Array(Vec<FieldValue>),
    Map(Fields),
    /// Write-only sentinel: the platform stores the commit time
    ServerTimestamp,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::String(_) => "string",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
            FieldValue::ServerTimestamp => "server timestamp",
        }
    }

    /// Order two values of comparable kinds
    ///
    /// Strings compare by their UTF-8 bytes, integers and doubles compare
    /// numerically. Values of unrelated kinds are not comparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Double(a), FieldValue::Double(b)) => a.partial_cmp(b),
            (FieldValue::Integer(a), FieldValue::Double(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Double(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Firestore `Value` message as it travels over REST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum WireValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(WireArray),
    MapValue(WireMap),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct WireArray {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<WireValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct WireMap {
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
}

/// Encode a value for a write or a query filter
///
/// [`FieldValue::ServerTimestamp`] has no value encoding; callers turn it into a
/// field transform before reaching this point.
pub(crate) fn encode(value: &FieldValue) -> Result<WireValue, Error> {
    Ok(match value {
        FieldValue::Null => WireValue::NullValue(()),
        FieldValue::Boolean(b) => WireValue::BooleanValue(*b),
        FieldValue::Integer(i) => WireValue::IntegerValue(i.to_string()),
        FieldValue::Double(d) => WireValue::DoubleValue(*d),
        FieldValue::Timestamp(t) => {
            WireValue::TimestampValue(t.to_rfc3339_opts(SecondsFormat::Micros, true))
        }
        FieldValue::String(s) => WireValue::StringValue(s.clone()),
        FieldValue::Array(values) => WireValue::ArrayValue(WireArray {
            values: values.iter().map(encode).collect::<Result<_, _>>()?,
        }),
        FieldValue::Map(fields) => WireValue::MapValue(WireMap {
            fields: encode_fields(fields)?,
        }),
        FieldValue::ServerTimestamp => {
            return Err(Error::database(
                "server timestamps are only allowed as top-level fields",
            ))
        }
    })
}

pub(crate) fn encode_fields(fields: &Fields) -> Result<BTreeMap<String, WireValue>, Error> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), encode(v)?)))
        .collect()
}

pub(crate) fn decode(value: WireValue) -> Result<FieldValue, Error> {
    Ok(match value {
        WireValue::NullValue(()) => FieldValue::Null,
        WireValue::BooleanValue(b) => FieldValue::Boolean(b),
        WireValue::IntegerValue(s) => FieldValue::Integer(
            s.parse()
                .map_err(|_| Error::database(format!("invalid integer value: {}", s)))?,
        ),
        WireValue::DoubleValue(d) => FieldValue::Double(d),
        WireValue::TimestampValue(s) => FieldValue::Timestamp(
            DateTime::parse_from_rfc3339(&s)
                .map_err(|_| Error::database(format!("invalid timestamp value: {}", s)))?
                .with_timezone(&Utc),
        ),
        WireValue::StringValue(s) => FieldValue::String(s),
        WireValue::ArrayValue(array) => FieldValue::Array(
            array
                .values
                .into_iter()
                .map(decode)
                .collect::<Result<_, _>>()?,
        ),
        WireValue::MapValue(map) => FieldValue::Map(decode_fields(map.fields)?),
    })
}

pub(crate) fn decode_fields(fields: BTreeMap<String, WireValue>) -> Result<Fields, Error> {
    fields
        .into_iter()
        .map(|(k, v)| Ok((k, decode(v)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn decodes_nested_document_fields() {
        let raw = json!({
            "name": {"stringValue": "ONIX"},
            "valor": {"integerValue": "45000"},
            "created": {"timestampValue": "2024-03-01T12:00:00.000000Z"},
            "owner": {"nullValue": null},
            "images": {"arrayValue": {"values": [
                {"mapValue": {"fields": {"url": {"stringValue": "https://x"}}}}
            ]}}
        });

        let wire: BTreeMap<String, WireValue> = serde_json::from_value(raw).unwrap();
        let fields = decode_fields(wire).unwrap();

        assert_eq!(fields["name"], FieldValue::String("ONIX".into()));
        assert_eq!(fields["valor"], FieldValue::Integer(45000));
        assert_eq!(
            fields["created"],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
        assert!(fields["owner"].is_null());
        let images = fields["images"].as_array().unwrap();
        assert_eq!(images[0].as_map().unwrap()["url"].as_str(), Some("https://x"));
    }

    #[test]
    fn empty_array_and_map_decode_without_members() {
        let raw = json!({
            "images": {"arrayValue": {}},
            "extra": {"mapValue": {}}
        });
        let wire: BTreeMap<String, WireValue> = serde_json::from_value(raw).unwrap();
        let fields = decode_fields(wire).unwrap();

        assert_eq!(fields["images"], FieldValue::Array(vec![]));
        assert_eq!(fields["extra"], FieldValue::Map(Fields::new()));
    }

    #[test]
    fn unknown_value_kind_is_rejected() {
        let raw = json!({"where": {"geoPointValue": {"latitude": 1.0, "longitude": 2.0}}});
        assert!(serde_json::from_value::<BTreeMap<String, WireValue>>(raw).is_err());
    }

    #[test]
    fn encodes_integers_as_strings() {
        let wire = encode(&FieldValue::Integer(7)).unwrap();
        assert_eq!(serde_json::to_value(wire).unwrap(), json!({"integerValue": "7"}));

        let null = encode(&FieldValue::Null).unwrap();
        assert_eq!(serde_json::to_value(null).unwrap(), json!({"nullValue": null}));
    }

    #[test]
    fn nested_server_timestamp_is_rejected() {
        let value = FieldValue::Array(vec![FieldValue::ServerTimestamp]);
        assert!(encode(&value).is_err());
    }

    #[test]
    fn strings_compare_bytewise() {
        let a = FieldValue::from("GOL");
        let b = FieldValue::from("GOL\u{f8ff}");
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(FieldValue::from("GOLF").compare(&b), Some(Ordering::Less));
        assert_eq!(FieldValue::Integer(1).compare(&FieldValue::from("1")), None);
    }
}
