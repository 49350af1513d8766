//! Deterministic provider backed by a fixed table, for tests and demos.

use async_trait::async_trait;

use crate::{Address, Coordinates};

use super::{GeocodeProvider, ProviderError, ProviderId};

#[derive(Debug, Clone)]
pub struct TestProvider {
    places: Vec<Address>,
}

impl TestProvider {
    pub fn new() -> Self {
        let gotham = Address {
            locality: Some("Gotham City".to_string()),
            admin_area: Some("New Jersey".to_string()),
            country: Some("United States".to_string()),
            country_code: Some("US".to_string()),
            formatted: Some("Gotham City, United States".to_string()),
            ..Address::at(Coordinates::new(20.0, 40.0), ProviderId::Test.as_str())
        };

        Self { places: vec![gotham] }
    }
}

impl Default for TestProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeProvider for TestProvider {
    fn id(&self) -> &str {
        ProviderId::Test.as_str()
    }

    fn label(&self) -> &str {
        ProviderId::Test.label()
    }

    async fn geocode(&self, text: &str) -> Result<Vec<Address>, ProviderError> {
        let needle = text.trim();
        Ok(self
            .places
            .iter()
            .filter(|a| a.locality.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(needle)))
            .cloned()
            .collect())
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<Address>, ProviderError> {
        Ok(self.places.iter().filter(|a| a.coordinates == coordinates).cloned().collect())
    }
}
