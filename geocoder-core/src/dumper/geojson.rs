use serde_json::{Map, Value, json};

use crate::{Address, error::Result, geometry::point_geojson};

use super::{Dumper, DumperId};

/// GeoJSON `Feature` with a point geometry and the address components as
/// properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonDumper;

impl GeoJsonDumper {
    pub fn to_value(&self, address: &Address) -> Value {
        let mut properties = Map::new();
        let components = [
            ("streetNumber", &address.street_number),
            ("streetName", &address.street_name),
            ("subLocality", &address.sub_locality),
            ("locality", &address.locality),
            ("postalCode", &address.postal_code),
            ("adminArea", &address.admin_area),
            ("country", &address.country),
            ("countryCode", &address.country_code),
            ("formattedAddress", &address.formatted),
        ];
        for (name, value) in components {
            if let Some(value) = value {
                properties.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        properties.insert("providedBy".to_string(), Value::String(address.provided_by.clone()));

        let mut feature = json!({
            "type": "Feature",
            "geometry": point_geojson(address.coordinates),
            "properties": properties,
        });

        if let Some(b) = &address.bounds {
            feature["bounds"] = json!({
                "south": b.south,
                "west": b.west,
                "north": b.north,
                "east": b.east,
            });
        }

        feature
    }
}

impl Dumper for GeoJsonDumper {
    fn id(&self) -> DumperId {
        DumperId::GeoJson
    }

    fn dump(&self, address: &Address) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(address))?)
    }
}
