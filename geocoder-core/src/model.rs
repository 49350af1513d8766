use serde::{Deserialize, Serialize};

/// A point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Bounding box of a resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// A location resolved by a provider.
///
/// Dumpers and formatters only ever see `&Address`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Display name as returned by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub provided_by: String,
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Address {
    pub fn at(coordinates: Coordinates, provided_by: impl Into<String>) -> Self {
        Self {
            coordinates,
            provided_by: provided_by.into(),
            ..Default::default()
        }
    }
}

/// Ordered result of a geocode or reverse-geocode request.
///
/// Empty means no provider produced anything; that is a normal outcome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressCollection(Vec<Address>);

impl AddressCollection {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self(addresses)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&Address> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.0.iter()
    }
}

impl IntoIterator for AddressCollection {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AddressCollection {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What to resolve: free text forward, or a coordinate pair in reverse.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text(String),
    Coordinates(Coordinates),
}

impl Query {
    /// Stable request signature, used as half of a cache key.
    pub fn signature(&self) -> String {
        match self {
            Query::Text(text) => format!("geocode:{}", text.trim()),
            Query::Coordinates(c) => format!("reverse:{c}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeRequest {
    pub query: Query,
    /// Provider ids, tried in this order.
    pub providers: Vec<String>,
}

impl GeocodeRequest {
    pub fn forward(text: impl Into<String>, providers: Vec<String>) -> Self {
        Self { query: Query::Text(text.into()), providers }
    }

    pub fn reverse(coordinates: Coordinates, providers: Vec<String>) -> Self {
        Self { query: Query::Coordinates(coordinates), providers }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self.query, Query::Coordinates(_))
    }
}
