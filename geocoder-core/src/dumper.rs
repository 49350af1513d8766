use std::{convert::TryFrom, fmt::Debug};

use crate::{
    Address,
    dumper::{
        address_text::AddressTextDumper, geohash::GeohashDumper, geojson::GeoJsonDumper,
        gpx::GpxDumper, kml::KmlDumper, wkt::WktDumper,
    },
    error::{Error, Result},
};

pub mod address_text;
pub mod geohash;
pub mod geojson;
pub mod gpx;
pub mod kml;
pub mod wkt;
mod xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumperId {
    GeoJson,
    Gpx,
    Kml,
    Wkt,
    Geohash,
    AddressText,
}

impl DumperId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumperId::GeoJson => "geojson",
            DumperId::Gpx => "gpx",
            DumperId::Kml => "kml",
            DumperId::Wkt => "wkt",
            DumperId::Geohash => "geohash",
            DumperId::AddressText => "address_text",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DumperId::GeoJson => "GeoJSON",
            DumperId::Gpx => "GPS Exchange Format (GPX)",
            DumperId::Kml => "Keyhole Markup Language (KML)",
            DumperId::Wkt => "Well-known text (WKT)",
            DumperId::Geohash => "Geohash",
            DumperId::AddressText => "Address text",
        }
    }

    pub const fn all() -> &'static [DumperId] {
        &[
            DumperId::GeoJson,
            DumperId::Gpx,
            DumperId::Kml,
            DumperId::Wkt,
            DumperId::Geohash,
            DumperId::AddressText,
        ]
    }
}

impl std::fmt::Display for DumperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DumperId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let lower = value.to_lowercase();

        DumperId::all().iter().copied().find(|id| id.as_str() == lower).ok_or_else(|| {
            Error::UnknownDumper {
                name: value.to_string(),
                supported: DumperId::all()
                    .iter()
                    .map(DumperId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
    }
}

/// Formats a resolved address into an output encoding.
pub trait Dumper: Send + Sync + Debug {
    fn id(&self) -> DumperId;

    fn dump(&self, address: &Address) -> Result<String>;
}

pub fn dumper_for(id: DumperId) -> Box<dyn Dumper> {
    match id {
        DumperId::GeoJson => Box::new(GeoJsonDumper),
        DumperId::Gpx => Box::new(GpxDumper),
        DumperId::Kml => Box::new(KmlDumper),
        DumperId::Wkt => Box::new(WktDumper),
        DumperId::Geohash => Box::new(GeohashDumper::default()),
        DumperId::AddressText => Box::new(AddressTextDumper),
    }
}
