//! Conversions between the GeoJSON intermediate form and other encodings.

use geo_types::{Coord, Geometry};
use geozero::{ToGeo, ToWkt, geojson::GeoJson};
use serde_json::{Value, json};

use crate::{
    Coordinates,
    error::{Error, Result},
};

/// GeoJSON point geometry; positions are `[longitude, latitude]`.
pub fn point_geojson(coordinates: Coordinates) -> Value {
    json!({
        "type": "Point",
        "coordinates": [coordinates.longitude, coordinates.latitude],
    })
}

pub fn parse_geojson(raw: &str) -> Result<Geometry<f64>> {
    GeoJson(raw).to_geo().map_err(|e| Error::Geometry { reason: e.to_string() })
}

pub fn to_wkt(geometry: &Geometry<f64>) -> Result<String> {
    geometry.to_wkt().map_err(|e| Error::Geometry { reason: e.to_string() })
}

pub fn to_geohash(geometry: &Geometry<f64>, precision: usize) -> Result<String> {
    let Geometry::Point(point) = geometry else {
        return Err(Error::Geometry {
            reason: "geohash needs a point geometry".to_string(),
        });
    };

    geohash::encode(Coord { x: point.x(), y: point.y() }, precision)
        .map_err(|e| Error::Geometry { reason: e.to_string() })
}
