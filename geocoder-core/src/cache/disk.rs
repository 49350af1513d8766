use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::{CacheEntry, CacheKey, CacheStore};

/// Cache persisted as a single JSON object on disk.
///
/// The file is read on first access and rewritten on every change.
#[derive(Debug)]
pub struct DiskCache {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl DiskCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys with the time each entry was stored, oldest first.
    /// Entries that fail to parse are left out.
    pub fn entries(&self) -> Result<Vec<(CacheKey, DateTime<Utc>)>> {
        let mut listed: Vec<(CacheKey, DateTime<Utc>)> = self.with_entries(|entries| {
            entries
                .iter()
                .filter_map(|(raw_key, value)| {
                    let key = CacheKey::from_storage_key(raw_key)?;
                    let entry = CacheEntry::from_json(value).ok()?;
                    Some((key, entry.stored_at))
                })
                .collect()
        })?;
        listed.sort_by_key(|(_, stored_at)| *stored_at);
        Ok(listed)
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("disk cache lock poisoned"))?;

        if guard.is_none() {
            *guard = Some(self.read_file()?);
        }

        let entries = guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("disk cache entries not loaded"))?;
        Ok(f(entries))
    }

    fn read_file(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", self.path.display()))
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize cache")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))
    }
}

impl CacheStore for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        self.with_entries(|entries| entries.get(&key.to_storage_key()).cloned())
    }

    fn set(&self, key: &CacheKey, value: String) -> Result<()> {
        let snapshot = self.with_entries(|entries| {
            entries.insert(key.to_storage_key(), value);
            entries.clone()
        })?;
        self.write_file(&snapshot)
    }

    /// Drops every entry without reading the file, so a corrupt cache can
    /// always be cleared.
    fn clear(&self) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("disk cache lock poisoned"))?;
        *guard = Some(BTreeMap::new());

        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove cache file: {}", self.path.display())
            })?;
        }

        Ok(())
    }

    fn len(&self) -> Result<usize> {
        self.with_entries(|entries| entries.len())
    }
}
