//! Key-value stores for geocode results.
//!
//! Entries never expire on their own; they live until [`CacheStore::clear`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Debug, sync::Mutex};

use crate::{
    AddressCollection,
    error::Result,
};

pub mod disk;

pub use disk::DiskCache;

/// `(request-signature, provider-id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub signature: String,
    pub provider: String,
}

impl CacheKey {
    pub fn new(signature: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            provider: provider.into(),
        }
    }

    /// Flat form used where keys must be strings.
    pub fn to_storage_key(&self) -> String {
        format!("{}|{}", self.provider, self.signature)
    }

    pub fn from_storage_key(raw: &str) -> Option<Self> {
        raw.split_once('|').map(|(provider, signature)| Self::new(signature, provider))
    }
}

/// A stored result plus the moment it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stored_at: DateTime<Utc>,
    pub result: AddressCollection,
}

impl CacheEntry {
    pub fn new(result: AddressCollection) -> Self {
        Self { stored_at: Utc::now(), result }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Shared key-value collaborator holding serialized [`CacheEntry`] values.
///
/// Methods take `&self`; stores use interior mutability.
pub trait CacheStore: Send + Sync + Debug {
    fn get(&self, key: &CacheKey) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &CacheKey, value: String) -> anyhow::Result<()>;

    fn clear(&self) -> anyhow::Result<()>;

    fn len(&self) -> anyhow::Result<usize>;

    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<CacheKey, String>>> {
        self.entries.lock().map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &CacheKey, value: String) -> anyhow::Result<()> {
        self.lock()?.insert(key.clone(), value);
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn len(&self) -> anyhow::Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Coordinates};

    #[test]
    fn storage_key_roundtrip() {
        let key = CacheKey::new("geocode:a|b", "test_provider");
        let raw = key.to_storage_key();

        assert_eq!(raw, "test_provider|geocode:a|b");
        assert_eq!(CacheKey::from_storage_key(&raw), Some(key));
    }

    #[test]
    fn memory_cache_set_get_clear() {
        let cache = MemoryCache::new();
        let key = CacheKey::new("geocode:Gotham City", "test_provider");

        assert_eq!(cache.get(&key).unwrap(), None);

        cache.set(&key, "payload".into()).unwrap();
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some("payload"));
        assert_eq!(cache.len().unwrap(), 1);

        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn entry_json_keeps_result() {
        let result = AddressCollection::new(vec![Address::at(Coordinates::new(20.0, 40.0), "p")]);
        let entry = CacheEntry::new(result.clone());

        let back = CacheEntry::from_json(&entry.to_json().unwrap()).unwrap();
        assert_eq!(back.result, result);
        assert_eq!(back.stored_at, entry.stored_at);
    }
}
