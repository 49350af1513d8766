use crate::{
    Address, Config, Coordinates,
    error::{Error, Result},
    provider::{nominatim::NominatimProvider, testing::TestProvider},
};
use async_trait::async_trait;
use std::{collections::HashMap, convert::TryFrom, fmt::Debug};

pub mod nominatim;
pub mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Test,
    OpenStreetMap,
    MapsCo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Test => "test_provider",
            ProviderId::OpenStreetMap => "openstreetmap",
            ProviderId::MapsCo => "mapsco",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::Test => "Test provider",
            ProviderId::OpenStreetMap => "OpenStreetMap (Nominatim)",
            ProviderId::MapsCo => "geocode.maps.co",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::MapsCo)
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Test, ProviderId::OpenStreetMap, ProviderId::MapsCo]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let lower = value.to_lowercase();

        ProviderId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == lower)
            .ok_or_else(|| Error::UnknownProvider { name: value.to_string() })
    }
}

/// Provider-level failure. The geocoder recovers from all of these by moving
/// on to the next provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider '{provider}' unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("provider '{provider}' does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A geocoding backend capable of forward and/or reverse lookups.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    async fn geocode(&self, text: &str) -> std::result::Result<Vec<Address>, ProviderError>;

    async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> std::result::Result<Vec<Address>, ProviderError>;
}

/// Providers keyed by their string id.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn GeocodeProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own id, replacing any previous one.
    pub fn register(&mut self, provider: Box<dyn GeocodeProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn get(&self, id: &str) -> Option<&dyn GeocodeProvider> {
        self.providers.get(id).map(|p| p.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Every built-in provider. Ones missing what they need in `config`
    /// are registered as [`UnavailableProvider`], so lookups skip them.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for id in ProviderId::all() {
            match provider_from_config(*id, config) {
                Ok(provider) => registry.register(provider),
                Err(err) => {
                    tracing::debug!(provider = %id, error = %err, "provider not usable");
                    registry.register(Box::new(UnavailableProvider::new(*id, err.to_string())));
                }
            }
        }

        registry
    }
}

/// Stand-in for a built-in provider that cannot be constructed, e.g. one
/// missing its API key. Every lookup fails with [`ProviderError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    id: ProviderId,
    reason: String,
}

impl UnavailableProvider {
    pub fn new(id: ProviderId, reason: String) -> Self {
        Self { id, reason }
    }

    fn unavailable(&self) -> ProviderError {
        ProviderError::Unavailable {
            provider: self.id.to_string(),
            reason: self.reason.clone(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for UnavailableProvider {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn label(&self) -> &str {
        self.id.label()
    }

    async fn geocode(&self, _text: &str) -> std::result::Result<Vec<Address>, ProviderError> {
        Err(self.unavailable())
    }

    async fn reverse(
        &self,
        _coordinates: Coordinates,
    ) -> std::result::Result<Vec<Address>, ProviderError> {
        Err(self.unavailable())
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(id: ProviderId, config: &Config) -> Result<Box<dyn GeocodeProvider>> {
    let boxed: Box<dyn GeocodeProvider> = match id {
        ProviderId::Test => Box::new(TestProvider::new()),
        ProviderId::OpenStreetMap => {
            Box::new(NominatimProvider::openstreetmap(config.provider_base_url(id)))
        }
        ProviderId::MapsCo => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                Error::configuration(format!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `geocoder configure {id}` and enter your API key."
                ))
            })?;
            Box::new(NominatimProvider::mapsco(api_key.to_owned(), config.provider_base_url(id)))
        }
    };

    Ok(boxed)
}
