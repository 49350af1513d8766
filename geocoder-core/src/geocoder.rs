use std::sync::Arc;

use crate::{
    AddressCollection, Config, GeocodeRequest, Query,
    cache::{CacheEntry, CacheKey, CacheStore},
    error::{Error, Result},
    prepare::PreparedValue,
    provider::ProviderRegistry,
};

/// Tries providers in order and returns the first non-empty answer.
#[derive(Debug)]
pub struct Geocoder {
    registry: ProviderRegistry,
    cache: Option<Arc<dyn CacheStore>>,
}

impl Geocoder {
    /// A geocoder without caching.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry, cache: None }
    }

    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    /// Registry built from `config`; `store` is only attached when `config.cache` is on.
    pub fn from_config(config: &Config, store: Option<Arc<dyn CacheStore>>) -> Self {
        let geocoder = Self::new(ProviderRegistry::from_config(config));
        match store {
            Some(store) if config.cache => geocoder.with_cache(store),
            _ => geocoder,
        }
    }

    pub fn caching(&self) -> bool {
        self.cache.is_some()
    }

    pub async fn geocode(&self, request: &GeocodeRequest) -> Result<AddressCollection> {
        if request.providers.is_empty() {
            return Err(Error::configuration("no providers given for the request"));
        }

        let providers = request
            .providers
            .iter()
            .map(|id| {
                self.registry.get(id).ok_or_else(|| Error::UnknownProvider { name: id.clone() })
            })
            .collect::<Result<Vec<_>>>()?;

        let signature = request.query.signature();

        for provider in providers {
            let key = CacheKey::new(signature.as_str(), provider.id());

            if let Some(cached) = self.cache_read(&key) {
                tracing::debug!(provider = provider.id(), %signature, "cache hit");
                return Ok(cached);
            }

            let outcome = match &request.query {
                Query::Text(text) => provider.geocode(text).await,
                Query::Coordinates(coordinates) => provider.reverse(*coordinates).await,
            };

            match outcome {
                Ok(addresses) if !addresses.is_empty() => {
                    tracing::debug!(
                        provider = provider.id(),
                        %signature,
                        count = addresses.len(),
                        "provider answered"
                    );
                    let result = AddressCollection::new(addresses);
                    self.cache_write(&key, &result);
                    return Ok(result);
                }
                Ok(_) => {
                    tracing::debug!(
                        provider = provider.id(),
                        %signature,
                        "no result, trying next"
                    );
                }
                Err(err) => {
                    tracing::debug!(
                        provider = provider.id(),
                        %signature,
                        error = %err,
                        "provider failed, trying next"
                    );
                }
            }
        }

        Ok(AddressCollection::empty())
    }

    /// Geocode or reverse-geocode an already prepared field value.
    pub async fn geocode_prepared(
        &self,
        value: &PreparedValue,
        providers: &[String],
    ) -> Result<AddressCollection> {
        let request = match value {
            PreparedValue::Text(text) => GeocodeRequest::forward(text.clone(), providers.to_vec()),
            PreparedValue::Coordinates(c) => GeocodeRequest::reverse(*c, providers.to_vec()),
        };
        self.geocode(&request).await
    }

    /// Empty the attached store, if any.
    pub fn clear_cache(&self) -> anyhow::Result<()> {
        match &self.cache {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    fn cache_read(&self, key: &CacheKey) -> Option<AddressCollection> {
        let store = self.cache.as_ref()?;

        let raw = match store.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::debug!(error = %err, "cache read failed, treating as miss");
                return None;
            }
        };

        match CacheEntry::from_json(&raw) {
            Ok(entry) => Some(entry.result),
            Err(err) => {
                tracing::debug!(error = %err, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    fn cache_write(&self, key: &CacheKey, result: &AddressCollection) {
        let Some(store) = &self.cache else {
            return;
        };

        let stored = CacheEntry::new(result.clone())
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| store.set(key, json));

        if let Err(err) = stored {
            tracing::debug!(error = %err, "cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Address, Coordinates,
        cache::MemoryCache,
        provider::{GeocodeProvider, ProviderError, testing::TestProvider},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy)]
    enum Behaviour {
        Empty,
        Fail,
        Answer(f64, f64),
    }

    #[derive(Debug)]
    struct CountingProvider {
        id: &'static str,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl CountingProvider {
        fn boxed(id: &'static str, behaviour: Behaviour) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Box::new(Self { id, behaviour, calls: calls.clone() }), calls)
        }

        fn respond(&self) -> std::result::Result<Vec<Address>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Empty => Ok(Vec::new()),
                Behaviour::Fail => Err(ProviderError::Unavailable {
                    provider: self.id.to_string(),
                    reason: "down".to_string(),
                }),
                Behaviour::Answer(lat, lon) => {
                    Ok(vec![Address::at(Coordinates::new(lat, lon), self.id)])
                }
            }
        }
    }

    #[async_trait]
    impl GeocodeProvider for CountingProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn label(&self) -> &str {
            self.id
        }

        async fn geocode(&self, _text: &str) -> std::result::Result<Vec<Address>, ProviderError> {
            self.respond()
        }

        async fn reverse(
            &self,
            _coordinates: Coordinates,
        ) -> std::result::Result<Vec<Address>, ProviderError> {
            self.respond()
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn stops_at_first_non_empty_provider() {
        let mut registry = ProviderRegistry::new();
        let (first, first_calls) = CountingProvider::boxed("first", Behaviour::Empty);
        let (second, second_calls) = CountingProvider::boxed("second", Behaviour::Answer(1.0, 2.0));
        let (third, third_calls) = CountingProvider::boxed("third", Behaviour::Answer(3.0, 4.0));
        registry.register(first);
        registry.register(second);
        registry.register(third);

        let geocoder = Geocoder::new(registry);
        let request = GeocodeRequest::forward("anywhere", ids(&["first", "second", "third"]));
        let result = geocoder.geocode(&request).await.unwrap();

        assert_eq!(result.first().unwrap().provided_by, "second");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_moves_on() {
        let mut registry = ProviderRegistry::new();
        let (broken, broken_calls) = CountingProvider::boxed("broken", Behaviour::Fail);
        let (backup, _) = CountingProvider::boxed("backup", Behaviour::Answer(5.0, 6.0));
        registry.register(broken);
        registry.register(backup);

        let geocoder = Geocoder::new(registry);
        let request =
            GeocodeRequest::reverse(Coordinates::new(5.0, 6.0), ids(&["broken", "backup"]));
        let result = geocoder.geocode(&request).await.unwrap();

        assert_eq!(broken_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.first().unwrap().provided_by, "backup");
    }

    #[tokio::test]
    async fn exhausted_providers_give_empty_result() {
        let mut registry = ProviderRegistry::new();
        let (a, _) = CountingProvider::boxed("a", Behaviour::Empty);
        let (b, _) = CountingProvider::boxed("b", Behaviour::Fail);
        registry.register(a);
        registry.register(b);

        let geocoder = Geocoder::new(registry);
        let request = GeocodeRequest::forward("x", ids(&["a", "b"]));
        let result = geocoder.geocode(&request).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_provider_list_is_configuration_error() {
        let geocoder = Geocoder::new(ProviderRegistry::new());
        let err = geocoder.geocode(&GeocodeRequest::forward("x", Vec::new())).await.unwrap_err();

        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected_before_any_call() {
        let mut registry = ProviderRegistry::new();
        let (known, known_calls) = CountingProvider::boxed("known", Behaviour::Answer(1.0, 1.0));
        registry.register(known);

        let geocoder = Geocoder::new(registry);
        let err = geocoder
            .geocode(&GeocodeRequest::forward("x", ids(&["known", "missing"])))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownProvider { ref name } if name == "missing"));
        assert_eq!(known_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cached_result_skips_provider() {
        let mut registry = ProviderRegistry::new();
        let (provider, calls) = CountingProvider::boxed("counted", Behaviour::Answer(1.0, 2.0));
        registry.register(provider);

        let cache = Arc::new(MemoryCache::new());
        let geocoder = Geocoder::new(registry).with_cache(cache.clone());
        let request = GeocodeRequest::forward("Gotham City", ids(&["counted"]));

        let first = geocoder.geocode(&request).await.unwrap();
        let second = geocoder.geocode(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().unwrap(), 1);
        assert!(
            cache.get(&CacheKey::new("geocode:Gotham City", "counted")).unwrap().is_some()
        );

        geocoder.clear_cache().unwrap();
        geocoder.geocode(&request).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn without_cache_provider_is_called_every_time() {
        let mut registry = ProviderRegistry::new();
        let (provider, calls) = CountingProvider::boxed("counted", Behaviour::Answer(1.0, 2.0));
        registry.register(provider);

        let geocoder = Geocoder::new(registry);
        let request = GeocodeRequest::forward("Gotham City", ids(&["counted"]));
        geocoder.geocode(&request).await.unwrap();
        geocoder.geocode(&request).await.unwrap();

        assert!(!geocoder.caching());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_results_are_not_cached() {
        let mut registry = ProviderRegistry::new();
        let (provider, calls) = CountingProvider::boxed("empty", Behaviour::Empty);
        registry.register(provider);

        let cache = Arc::new(MemoryCache::new());
        let geocoder = Geocoder::new(registry).with_cache(cache.clone());
        let request = GeocodeRequest::forward("x", ids(&["empty"]));
        geocoder.geocode(&request).await.unwrap();
        geocoder.geocode(&request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().unwrap());
    }

    #[tokio::test]
    async fn corrupt_cache_entry_falls_back_to_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(TestProvider::new()));

        let cache = Arc::new(MemoryCache::new());
        cache
            .set(&CacheKey::new("geocode:Gotham City", "test_provider"), "{broken".into())
            .unwrap();

        let geocoder = Geocoder::new(registry).with_cache(cache);
        let result = geocoder
            .geocode(&GeocodeRequest::forward("Gotham City", ids(&["test_provider"])))
            .await
            .unwrap();

        assert_eq!(result.first().unwrap().coordinates, Coordinates::new(20.0, 40.0));
    }

    #[test]
    fn config_toggle_controls_cache() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

        let enabled = Geocoder::from_config(&Config::default(), Some(store.clone()));
        assert!(enabled.caching());

        let config = Config { cache: false, ..Default::default() };
        let disabled = Geocoder::from_config(&config, Some(store));
        assert!(!disabled.caching());

        let without_store = Geocoder::from_config(&Config::default(), None);
        assert!(!without_store.caching());
    }

    #[tokio::test]
    async fn keyless_builtin_provider_is_skipped() {
        let config = Config {
            providers_order: ids(&["mapsco", "test_provider"]),
            ..Default::default()
        };
        let geocoder = Geocoder::from_config(&config, None);

        let request = GeocodeRequest::forward("Gotham City", config.enabled_providers());
        let result = geocoder.geocode(&request).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().provided_by, "test_provider");
    }

    #[tokio::test]
    async fn truly_unknown_provider_is_still_rejected() {
        let geocoder = Geocoder::from_config(&Config::default(), None);
        let err = geocoder
            .geocode(&GeocodeRequest::forward("x", ids(&["nosuchprovider", "test_provider"])))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownProvider { .. }));
    }

    #[tokio::test]
    async fn prepared_coordinates_reverse_geocode() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(TestProvider::new()));

        let geocoder = Geocoder::new(registry);
        let value = PreparedValue::Coordinates(Coordinates::new(20.0, 40.0));
        let result = geocoder.geocode_prepared(&value, &ids(&["test_provider"])).await.unwrap();

        assert_eq!(result.first().unwrap().locality.as_deref(), Some("Gotham City"));
    }
}
