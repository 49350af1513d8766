use crate::{
    Address,
    error::Result,
    geometry::{parse_geojson, point_geojson, to_wkt},
};

use super::{Dumper, DumperId};

#[derive(Debug, Clone, Copy, Default)]
pub struct WktDumper;

impl Dumper for WktDumper {
    fn id(&self) -> DumperId {
        DumperId::Wkt
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let geometry = parse_geojson(&point_geojson(address.coordinates).to_string())?;
        to_wkt(&geometry)
    }
}
