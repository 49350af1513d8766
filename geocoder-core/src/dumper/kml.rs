use crate::{Address, error::Result};

use super::{Dumper, DumperId, address_text::display_label, xml::XmlDocument};

/// KML document with a single placemark.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlDumper;

impl Dumper for KmlDumper {
    fn id(&self) -> DumperId {
        DumperId::Kml
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let label = display_label(address);
        let c = address.coordinates;
        let position = format!("{:.7},{:.7},0", c.longitude, c.latitude);

        let mut doc = XmlDocument::new("KML", None)?;
        doc.start("kml", &[("xmlns", "http://www.opengis.net/kml/2.2")])?;
        doc.start("Document", &[])?;
        doc.start("Placemark", &[])?;
        doc.cdata_element("name", &label)?;
        doc.cdata_element("description", &label)?;
        doc.start("Point", &[])?;
        doc.text_element("coordinates", &position)?;
        doc.end("Point")?;
        doc.end("Placemark")?;
        doc.end("Document")?;
        doc.end("kml")?;
        doc.finish()
    }
}
