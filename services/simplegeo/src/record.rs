//! Storage records, places and their GeoJSON encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use geosign_core::{time::now, Error, Result};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A property value stored on a record or place.
///
/// Records carry an open set of key/value properties; the value side is
/// restricted to this tagged scalar type so lookups stay explicit and typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// An absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number; integers are widened to f64.
    Number(f64),
    /// A string.
    String(String),
}

impl PropertyValue {
    /// The string inside, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number inside, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean inside, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check for the null variant.
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// A storage record: an arbitrary object pinned to a location inside a
/// named layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The layer the record lives in.
    pub layer: String,
    /// The unique identifier of the record within its layer.
    pub id: String,
    /// The record location. Optional when the record is only used to
    /// address an existing entry (get/delete/history).
    pub point: Option<GeoPoint>,
    /// Creation time, seconds since the Unix epoch.
    pub created: i64,
    properties: BTreeMap<String, PropertyValue>,
}

impl Record {
    /// Create a record addressing `id` inside `layer`.
    pub fn new(layer: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            id: id.into(),
            point: None,
            created: now().timestamp(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the record location, required when inserting or updating.
    pub fn with_point(mut self, point: GeoPoint) -> Self {
        self.point = Some(point);
        self
    }

    /// Set a property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Look up a string property.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    /// Look up a numeric property.
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(PropertyValue::as_f64)
    }

    /// Look up a boolean property.
    pub fn property_bool(&self, key: &str) -> Option<bool> {
        self.property(key).and_then(PropertyValue::as_bool)
    }

    /// All properties, ordered by key.
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Render the record as a GeoJSON Feature, the wire format of the
    /// storage endpoints.
    ///
    /// Fails with `RequestInvalid` when the record has no location, since a
    /// Feature without geometry cannot be stored.
    pub fn to_feature(&self) -> Result<serde_json::Value> {
        let point = self.point.ok_or_else(|| {
            Error::request_invalid("record has no location; set one before storing it")
        })?;

        Ok(json!({
            "type": "Feature",
            "id": self.id,
            "created": self.created,
            "geometry": {
                "type": "Point",
                "coordinates": [point.lng, point.lat],
            },
            "properties": self.properties,
        }))
    }

    /// Rebuild a record from a GeoJSON Feature returned by the service.
    ///
    /// Only scalar property values are representable; a nested object or
    /// array in `properties` is an error.
    pub fn from_feature(layer: impl Into<String>, feature: &serde_json::Value) -> Result<Self> {
        let id = feature
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::unexpected("feature has no string id"))?;

        let point = match feature.pointer("/geometry/coordinates") {
            Some(coords) => {
                let lng = coords
                    .get(0)
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| Error::unexpected("feature coordinates have no longitude"))?;
                let lat = coords
                    .get(1)
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| Error::unexpected("feature coordinates have no latitude"))?;
                Some(GeoPoint::new(lat, lng))
            }
            None => None,
        };

        let created = feature
            .get("created")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(|| now().timestamp());

        let mut properties = BTreeMap::new();
        if let Some(props) = feature.get("properties").and_then(|v| v.as_object()) {
            for (key, value) in props {
                let value: PropertyValue = serde_json::from_value(value.clone()).map_err(|e| {
                    Error::unexpected(format!("property {key:?} is not a scalar value"))
                        .with_source(e)
                })?;
                properties.insert(key.clone(), value);
            }
        }

        Ok(Self {
            layer: layer.into(),
            id: id.to_string(),
            point,
            created,
            properties,
        })
    }
}

/// A place: a feature of the shared places database, addressed by a
/// service-assigned handle once it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// The service-assigned handle (`SG_` followed by 22 alphanumerics).
    /// `None` for a place that has not been contributed yet.
    pub handle: Option<String>,
    /// The place location.
    pub point: GeoPoint,
    properties: BTreeMap<String, PropertyValue>,
}

impl Place {
    /// Create a new place at the given location.
    pub fn new(point: GeoPoint) -> Self {
        Self {
            handle: None,
            point,
            properties: BTreeMap::new(),
        }
    }

    /// Attach the handle of an existing place.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Set a property, e.g. `name` or `private`.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Render the place as a GeoJSON Feature.
    pub fn to_feature(&self) -> serde_json::Value {
        let mut feature = json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.point.lng, self.point.lat],
            },
            "properties": self.properties,
        });
        if let Some(handle) = &self.handle {
            feature["id"] = json!(handle);
        }

        feature
    }

    /// Extract a feature handle (`SG_` plus 22 alphanumerics) from
    /// arbitrary text, e.g. a prefixed identifier or a response fragment.
    pub fn extract_handle(text: &str) -> Option<&str> {
        for (idx, _) in text.match_indices("SG_") {
            let tail = &text[idx + 3..];
            if tail.len() >= 22 && tail.bytes().take(22).all(|b| b.is_ascii_alphanumeric()) {
                return Some(&text[idx..idx + 25]);
            }
        }

        None
    }
}
