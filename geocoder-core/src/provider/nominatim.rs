use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Address, Bounds, Coordinates};

use super::{GeocodeProvider, ProviderError, ProviderId};

const OPENSTREETMAP_URL: &str = "https://nominatim.openstreetmap.org";
const MAPSCO_URL: &str = "https://geocode.maps.co";
const USER_AGENT: &str = concat!("geocoder/", env!("CARGO_PKG_VERSION"));
const MAX_RESULTS: usize = 5;

/// Nominatim-compatible search API. Serves both OpenStreetMap's public
/// instance and geocode.maps.co, which speaks the same wire format.
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    id: ProviderId,
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl NominatimProvider {
    pub fn openstreetmap(base_url: Option<&str>) -> Self {
        Self::new(ProviderId::OpenStreetMap, base_url.unwrap_or(OPENSTREETMAP_URL), None)
    }

    pub fn mapsco(api_key: String, base_url: Option<&str>) -> Self {
        Self::new(ProviderId::MapsCo, base_url.unwrap_or(MAPSCO_URL), Some(api_key))
    }

    fn new(id: ProviderId, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            id,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: Client::new(),
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        query.extend(params.iter().cloned());
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }

        tracing::debug!(provider = %self.id, %url, "sending request");

        let res = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&query)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Unavailable {
                provider: self.id.to_string(),
                reason: format!("status {}: {}", status, truncate_body(&body)),
            });
        }

        Ok(body)
    }

    fn to_address(&self, place: NmPlace) -> Result<Address, ProviderError> {
        let latitude = parse_degrees(self.id, &place.lat)?;
        let longitude = parse_degrees(self.id, &place.lon)?;

        let bounds = place.boundingbox.as_deref().and_then(parse_bounds);
        let details = place.address.unwrap_or_default();

        let locality = details.city.or(details.town).or(details.village);

        Ok(Address {
            coordinates: Coordinates::new(latitude, longitude),
            street_number: details.house_number,
            street_name: details.road,
            sub_locality: details.suburb,
            locality,
            postal_code: details.postcode,
            admin_area: details.state,
            country: details.country,
            country_code: details.country_code.map(|c| c.to_uppercase()),
            formatted: place.display_name,
            bounds,
            provided_by: self.id.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct NmAddress {
    house_number: Option<String>,
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    /// `[south, north, west, east]` as strings.
    boundingbox: Option<Vec<String>>,
    address: Option<NmAddress>,
}

/// `/reverse` answers either a place or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NmReverse {
    Found(NmPlace),
    NotFound { error: String },
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn label(&self) -> &str {
        self.id.label()
    }

    async fn geocode(&self, text: &str) -> Result<Vec<Address>, ProviderError> {
        let body = self
            .fetch("search", &[("q", text.to_string()), ("limit", MAX_RESULTS.to_string())])
            .await?;

        let places: Vec<NmPlace> = serde_json::from_str(&body)?;

        places.into_iter().take(MAX_RESULTS).map(|p| self.to_address(p)).collect()
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<Address>, ProviderError> {
        let body = self
            .fetch(
                "reverse",
                &[
                    ("lat", coordinates.latitude.to_string()),
                    ("lon", coordinates.longitude.to_string()),
                ],
            )
            .await?;

        match serde_json::from_str::<NmReverse>(&body)? {
            NmReverse::Found(place) => Ok(vec![self.to_address(place)?]),
            NmReverse::NotFound { error } => {
                tracing::debug!(provider = %self.id, %error, "no reverse result");
                Ok(Vec::new())
            }
        }
    }
}

fn parse_degrees(id: ProviderId, value: &str) -> Result<f64, ProviderError> {
    value.parse::<f64>().map_err(|e| ProviderError::Unavailable {
        provider: id.to_string(),
        reason: format!("invalid coordinate '{value}': {e}"),
    })
}

fn parse_bounds(raw: &[String]) -> Option<Bounds> {
    let values: Vec<f64> = raw.iter().filter_map(|v| v.parse().ok()).collect();
    match values[..] {
        [south, north, west, east] => Some(Bounds { south, west, north, east }),
        _ => None,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
