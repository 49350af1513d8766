//! Normalises raw field values into something a provider can take.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::Coordinates,
};

/// Which way a value is going through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Geocode,
    Reverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Geocode => "geocode",
            Direction::Reverse => "reverse geocode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Geofield,
    Address,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Geofield => "geofield",
            FieldType::Address => "address",
        }
    }
}

/// Stored geofield value: WKT geometry plus its centroid columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofieldItem {
    pub value: String,
    pub lat: f64,
    pub lon: f64,
}

/// Structured postal address as stored by an address field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostalAddress {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

impl PostalAddress {
    fn components(&self) -> impl Iterator<Item = &str> {
        [
            &self.address_line1,
            &self.address_line2,
            &self.locality,
            &self.administrative_area,
            &self.postal_code,
            &self.country_code,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
    }
}

/// One raw value of a content field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Geofield(GeofieldItem),
    Address(PostalAddress),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Geofield(_) => FieldType::Geofield,
            FieldValue::Address(_) => FieldType::Address,
        }
    }

    /// Empty values are skipped by formatters rather than sent to providers.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Geofield(item) => item.value.trim().is_empty(),
            FieldValue::Address(address) => address.components().next().is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedValue {
    Text(String),
    Coordinates(Coordinates),
}

pub fn prepare(value: &FieldValue, direction: Direction) -> Result<PreparedValue> {
    match (value, direction) {
        (FieldValue::Text(text), Direction::Geocode) => {
            Ok(PreparedValue::Text(text.trim().to_string()))
        }
        (FieldValue::Text(text), Direction::Reverse) => {
            parse_lat_lon(text).map(PreparedValue::Coordinates)
        }
        (FieldValue::Geofield(item), Direction::Reverse) => {
            Ok(PreparedValue::Coordinates(Coordinates::new(item.lat, item.lon)))
        }
        (FieldValue::Address(address), Direction::Geocode) => {
            Ok(PreparedValue::Text(address.components().collect::<Vec<_>>().join(", ")))
        }
        (value, direction) => Err(Error::UnsupportedField {
            field_type: value.field_type().as_str(),
            direction: direction.as_str(),
        }),
    }
}

/// Parse a "lat,lon" string.
pub fn parse_lat_lon(input: &str) -> Result<Coordinates> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(Error::malformed(input, "expected \"lat,lon\""));
    }

    let latitude = parse_degrees(input, parts[0], "latitude")?;
    let longitude = parse_degrees(input, parts[1], "longitude")?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::malformed(input, format!("latitude {latitude} out of range")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::malformed(input, format!("longitude {longitude} out of range")));
    }

    Ok(Coordinates::new(latitude, longitude))
}

fn parse_degrees(input: &str, part: &str, name: &str) -> Result<f64> {
    part.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::malformed(input, format!("{name} '{part}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reverse_splits_and_trims() {
        let prepared =
            prepare(&FieldValue::Text("40.7, -74.0".into()), Direction::Reverse).unwrap();
        assert_eq!(prepared, PreparedValue::Coordinates(Coordinates::new(40.7, -74.0)));

        let prepared = prepare(&FieldValue::Text("40.7,-74.0".into()), Direction::Reverse).unwrap();
        assert_eq!(prepared, PreparedValue::Coordinates(Coordinates::new(40.7, -74.0)));
    }

    #[test]
    fn text_reverse_rejects_single_component() {
        let err = prepare(&FieldValue::Text("bad-input".into()), Direction::Reverse).unwrap_err();
        assert!(matches!(err, Error::MalformedCoordinate { .. }));
    }

    #[test]
    fn text_reverse_rejects_garbage_and_out_of_range() {
        for input in ["north,east", "40.7,", "91,0", "0,181", "NaN,0"] {
            let err = prepare(&FieldValue::Text(input.into()), Direction::Reverse).unwrap_err();
            assert!(
                matches!(err, Error::MalformedCoordinate { .. }),
                "expected malformed coordinate for {input:?}, got {err}"
            );
        }
    }

    #[test]
    fn text_geocode_is_trimmed() {
        let prepared =
            prepare(&FieldValue::Text("  Gotham City \n".into()), Direction::Geocode).unwrap();
        assert_eq!(prepared, PreparedValue::Text("Gotham City".into()));
    }

    #[test]
    fn geofield_reverse_reads_centroid() {
        let item = GeofieldItem { value: "POINT (40 20)".into(), lat: 20.0, lon: 40.0 };
        let prepared = prepare(&FieldValue::Geofield(item), Direction::Reverse).unwrap();
        assert_eq!(prepared, PreparedValue::Coordinates(Coordinates::new(20.0, 40.0)));
    }

    #[test]
    fn address_geocode_joins_non_empty_components() {
        let address = PostalAddress {
            address_line1: Some("1007 Mountain Drive".into()),
            address_line2: Some("  ".into()),
            locality: Some("Gotham City".into()),
            postal_code: Some("10001".into()),
            country_code: Some("US".into()),
            ..Default::default()
        };

        let prepared = prepare(&FieldValue::Address(address), Direction::Geocode).unwrap();
        assert_eq!(
            prepared,
            PreparedValue::Text("1007 Mountain Drive, Gotham City, 10001, US".into())
        );
    }

    #[test]
    fn unsupported_combinations_error() {
        let item = GeofieldItem { value: "POINT (0 0)".into(), lat: 0.0, lon: 0.0 };
        let err = prepare(&FieldValue::Geofield(item), Direction::Geocode).unwrap_err();
        assert!(matches!(err, Error::UnsupportedField { field_type: "geofield", .. }));

        let err = prepare(&FieldValue::Address(PostalAddress::default()), Direction::Reverse)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedField { field_type: "address", .. }));
    }

    #[test]
    fn emptiness() {
        assert!(FieldValue::Text("   ".into()).is_empty());
        assert!(FieldValue::Address(PostalAddress::default()).is_empty());
        assert!(!FieldValue::Text("x".into()).is_empty());
    }
}
