use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{dumper::DumperId, provider::ProviderId};

/// Per-provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override for the provider endpoint, e.g. a self-hosted Nominatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store successful lookups and answer repeated requests from the store.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Provider ids in the order they are tried.
    #[serde(default)]
    pub providers_order: Vec<String>,

    /// Output format used when none is given explicitly, e.g. "geojson".
    #[serde(default)]
    pub default_dumper: Option<String>,

    /// Example TOML:
    /// [providers.mapsco]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_cache() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: default_cache(),
            providers_order: Vec::new(),
            default_dumper: None,
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Provider ids to try, in order. Falls back to OpenStreetMap alone.
    pub fn enabled_providers(&self) -> Vec<String> {
        if self.providers_order.is_empty() {
            vec![ProviderId::OpenStreetMap.as_str().to_string()]
        } else {
            self.providers_order.clone()
        }
    }

    pub fn default_dumper_id(&self) -> crate::Result<DumperId> {
        match &self.default_dumper {
            Some(s) => DumperId::try_from(s.as_str()),
            None => Ok(DumperId::GeoJson),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Move `id` to the front of the provider order, adding it if missing.
    pub fn prefer_provider(&mut self, id: ProviderId) {
        self.providers_order.retain(|p| p != id.as_str());
        self.providers_order.insert(0, id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "geocoder", "geocoder-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the on-disk geocode cache.
    pub fn cache_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().join("geocode-cache.json"))
    }

    /// Set/replace a provider API key, enabling the provider if nothing is enabled yet.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key =
            Some(api_key);

        if self.providers_order.is_empty() {
            self.providers_order.push(provider_id.to_string());
        }
    }

    pub fn set_provider_base_url(&mut self, provider_id: ProviderId, base_url: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().base_url =
            Some(base_url);
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.api_key.as_deref())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_cache_and_openstreetmap() {
        let cfg = Config::default();

        assert!(cfg.cache);
        assert_eq!(cfg.enabled_providers(), vec!["openstreetmap".to_string()]);
        assert_eq!(cfg.default_dumper_id().unwrap(), DumperId::GeoJson);
    }

    #[test]
    fn set_api_key_enables_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::MapsCo, "MAPS_KEY".into());

        assert_eq!(cfg.enabled_providers(), vec!["mapsco".to_string()]);
        assert_eq!(cfg.provider_api_key(ProviderId::MapsCo), Some("MAPS_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::MapsCo));
    }

    #[test]
    fn upsert_does_not_reorder_existing_providers() {
        let mut cfg = Config::default();
        cfg.providers_order = vec!["openstreetmap".into()];

        cfg.upsert_provider_api_key(ProviderId::MapsCo, "MAPS_KEY".into());

        assert_eq!(cfg.enabled_providers(), vec!["openstreetmap".to_string()]);
    }

    #[test]
    fn prefer_provider_moves_to_front() {
        let mut cfg = Config::default();
        cfg.providers_order = vec!["openstreetmap".into(), "mapsco".into()];

        cfg.prefer_provider(ProviderId::MapsCo);

        assert_eq!(cfg.providers_order, vec!["mapsco".to_string(), "openstreetmap".to_string()]);
    }

    #[test]
    fn mapsco_requires_key_but_openstreetmap_does_not() {
        let cfg = Config::default();

        assert!(cfg.is_provider_configured(ProviderId::OpenStreetMap));
        assert!(!cfg.is_provider_configured(ProviderId::MapsCo));
    }

    #[test]
    fn unknown_default_dumper_errors() {
        let cfg = Config { default_dumper: Some("svg".into()), ..Default::default() };
        assert!(cfg.default_dumper_id().is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.cache = false;
        cfg.default_dumper = Some("wkt".into());
        cfg.upsert_provider_api_key(ProviderId::MapsCo, "KEY".into());
        cfg.set_provider_base_url(ProviderId::OpenStreetMap, "http://localhost:8080".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.cache);
        assert_eq!(loaded.default_dumper_id().unwrap(), DumperId::Wkt);
        assert_eq!(loaded.provider_api_key(ProviderId::MapsCo), Some("KEY"));
        assert_eq!(
            loaded.provider_base_url(ProviderId::OpenStreetMap),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.providers_order.is_empty());
    }
}
