use crate::{Address, error::Result};

use super::{Dumper, DumperId, address_text::display_label, xml::XmlDocument};

/// GPX 1.0 document holding one waypoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpxDumper;

impl Dumper for GpxDumper {
    fn id(&self) -> DumperId {
        DumperId::Gpx
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let creator = concat!("geocoder ", env!("CARGO_PKG_VERSION"));
        let mut doc = XmlDocument::new("GPX", Some("no"))?;

        doc.start(
            "gpx",
            &[
                ("version", "1.0"),
                ("creator", creator),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
                ("xmlns", "http://www.topografix.com/GPX/1/0"),
                (
                    "xsi:schemaLocation",
                    "http://www.topografix.com/GPX/1/0 http://www.topografix.com/GPX/1/0/gpx.xsd",
                ),
            ],
        )?;

        if let Some(b) = &address.bounds {
            let [minlat, minlon, maxlat, maxlon] = [b.south, b.west, b.north, b.east].map(degrees);
            doc.empty(
                "bounds",
                &[
                    ("minlat", &minlat),
                    ("minlon", &minlon),
                    ("maxlat", &maxlat),
                    ("maxlon", &maxlon),
                ],
            )?;
        }

        let lat = degrees(address.coordinates.latitude);
        let lon = degrees(address.coordinates.longitude);
        doc.start("wpt", &[("lat", &lat), ("lon", &lon)])?;
        doc.cdata_element("name", &display_label(address))?;
        doc.cdata_element("type", "Address")?;
        doc.end("wpt")?;

        doc.end("gpx")?;
        doc.finish()
    }
}

fn degrees(value: f64) -> String {
    format!("{value:.7}")
}
