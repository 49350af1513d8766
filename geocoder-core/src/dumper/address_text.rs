use crate::{Address, error::Result};

use super::{Dumper, DumperId};

/// One-line human readable address.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressTextDumper;

impl Dumper for AddressTextDumper {
    fn id(&self) -> DumperId {
        DumperId::AddressText
    }

    fn dump(&self, address: &Address) -> Result<String> {
        Ok(display_label(address))
    }
}

/// "street, postcode locality, admin area, country", falling back to the
/// provider's own display name and then to the coordinates.
pub fn display_label(address: &Address) -> String {
    let street = join_words([&address.street_number, &address.street_name]);
    let locality = join_words([&address.postal_code, &address.locality]);

    let parts: Vec<String> = [
        Some(street),
        Some(locality),
        address.admin_area.clone(),
        address.country.clone(),
    ]
    .into_iter()
    .flatten()
    .map(|p| p.trim().to_string())
    .filter(|p| !p.is_empty())
    .collect();

    if !parts.is_empty() {
        return parts.join(", ");
    }

    match &address.formatted {
        Some(formatted) if !formatted.trim().is_empty() => formatted.trim().to_string(),
        _ => address.coordinates.to_string(),
    }
}

fn join_words<const N: usize>(words: [&Option<String>; N]) -> String {
    words.iter().filter_map(|w| w.as_deref()).collect::<Vec<_>>().join(" ")
}
