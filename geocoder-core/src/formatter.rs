//! Glue between a content field's values and the geocode pipeline.

use crate::{
    Address,
    dumper::{Dumper, DumperId, dumper_for},
    error::Result,
    geocoder::Geocoder,
    prepare::{Direction, FieldValue, GeofieldItem, prepare},
};

#[derive(Debug, Clone)]
pub struct FormatterSettings {
    pub providers: Vec<String>,
    pub dumper: DumperId,
    pub direction: Direction,
}

/// Output for one field value; `delta` is its position in the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedItem {
    pub delta: usize,
    pub output: String,
}

pub struct FieldFormatter<'a> {
    geocoder: &'a Geocoder,
    settings: FormatterSettings,
    dumper: Box<dyn Dumper>,
}

impl<'a> FieldFormatter<'a> {
    pub fn new(geocoder: &'a Geocoder, settings: FormatterSettings) -> Self {
        let dumper = dumper_for(settings.dumper);
        Self { geocoder, settings, dumper }
    }

    /// Formatted output per value. Values with no result produce no item.
    pub async fn view_elements(&self, items: &[FieldValue]) -> Result<Vec<FormattedItem>> {
        let mut elements = Vec::new();

        for (delta, address) in self.resolve(items).await? {
            elements.push(FormattedItem { delta, output: self.dumper.dump(&address)? });
        }

        Ok(elements)
    }

    /// Geofield values for the first address of each resolvable value, as
    /// stored when a source field is geocoded on save.
    pub async fn geofield_items(&self, items: &[FieldValue]) -> Result<Vec<GeofieldItem>> {
        let wkt = dumper_for(DumperId::Wkt);

        self.resolve(items)
            .await?
            .into_iter()
            .map(|(_, address)| {
                Ok(GeofieldItem {
                    value: wkt.dump(&address)?,
                    lat: address.coordinates.latitude,
                    lon: address.coordinates.longitude,
                })
            })
            .collect()
    }

    async fn resolve(&self, items: &[FieldValue]) -> Result<Vec<(usize, Address)>> {
        let mut resolved = Vec::new();

        for (delta, item) in items.iter().enumerate() {
            if item.is_empty() {
                continue;
            }

            let prepared = prepare(item, self.settings.direction)?;
            let collection =
                self.geocoder.geocode_prepared(&prepared, &self.settings.providers).await?;

            if let Some(address) = collection.into_iter().next() {
                resolved.push((delta, address));
            }
        }

        Ok(resolved)
    }
}
