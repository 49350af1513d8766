use crate::{
    Address,
    error::Result,
    geometry::{parse_geojson, point_geojson, to_geohash},
};

use super::{Dumper, DumperId};

const DEFAULT_PRECISION: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct GeohashDumper {
    precision: usize,
}

impl GeohashDumper {
    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }
}

impl Default for GeohashDumper {
    fn default() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }
}

impl Dumper for GeohashDumper {
    fn id(&self) -> DumperId {
        DumperId::Geohash
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let geometry = parse_geojson(&point_geojson(address.coordinates).to_string())?;
        to_geohash(&geometry, self.precision)
    }
}
