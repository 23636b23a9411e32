use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{Context, Result};
use crate::services::RequestAccounting;

/// Durable string slots. Reads never fail: unavailable storage reads as "not present".
pub trait KeyValueStore: Send + Sync {
    fn read(&self, name: &str) -> Option<String>;
    fn write(&self, name: &str, value: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Slots kept in a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Option<BTreeMap<String, String>> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable key store {}: {}",
                    self.path.display(),
                    err
                );
                None
            }
        }
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create key store directory {:?}", parent)
            })?;
        }

        let json = serde_json::to_string_pretty(map).context("Failed to serialize key store")?;
        let mut file = fs::File::create(&self.path)
            .with_context(|| format!("Failed to create key store file {:?}", self.path))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write key store file {:?}", self.path))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, name: &str) -> Option<String> {
        self.load()?.remove(name)
    }

    fn write(&self, name: &str, value: &str) -> Result<()> {
        let mut map = self.load().unwrap_or_default();
        map.insert(name.to_string(), value.to_string());
        self.persist(&map)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let Some(mut map) = self.load() else {
            return Ok(());
        };
        if map.remove(name).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, name: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(name)
            .cloned()
    }

    fn write(&self, name: &str, value: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .remove(name);
        Ok(())
    }
}

/// Active upstream credential: the stored user key, or the built-in default.
pub struct KeyStore {
    slot: String,
    default_key: String,
    store: Arc<dyn KeyValueStore>,
    accounting: Arc<RequestAccounting>,
    active: RwLock<String>,
}

impl KeyStore {
    pub fn new(
        slot: impl Into<String>,
        default_key: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        accounting: Arc<RequestAccounting>,
    ) -> Self {
        let slot = slot.into();
        let default_key = default_key.into();
        let active = store
            .read(&slot)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_key.clone());

        Self {
            slot,
            default_key,
            store,
            accounting,
            active: RwLock::new(active),
        }
    }

    pub fn get(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Replace the credential; an empty value reverts to the default. Returns the active key.
    pub fn set(&self, value: &str) -> String {
        let value = value.trim();
        let next = if value.is_empty() {
            if let Err(err) = self.store.remove(&self.slot) {
                log::warn!("Failed to remove stored API key: {}", err);
            }
            self.default_key.clone()
        } else {
            if let Err(err) = self.store.write(&self.slot, value) {
                log::warn!("Failed to persist API key: {}", err);
            }
            value.to_string()
        };

        *self
            .active
            .write()
            .unwrap_or_else(|poison| poison.into_inner()) = next.clone();
        self.accounting.reset();
        next
    }

    pub fn clear(&self) -> String {
        self.set("")
    }

    pub fn is_default(&self) -> bool {
        self.get() == self.default_key
    }
}
