// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Persisted user settings: one async key-value contract, two backends.
//
// The durable backend keeps a JSON document on disk; the in-memory
// backend prefixes keys and lives for the process only. Which one is
// used is decided once at startup from runtime capability (is there a
// writable settings path?), never per call.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

/// Storage keys shared with the capture surfaces.
pub mod keys {
    pub const CUSTOM_SERVER_URL: &str = "custom-server-url";
    pub const ELEMENT_SOURCE: &str = "selected-element";
    pub const FRAMEWORK_SELECTED: &str = "selected-framework";
    pub const IDEAS: &str = "ideas";
    pub const LANGUAGE_SELECTED: &str = "selected-language";
    pub const OPENAI_API_KEY: &str = "openai-api-key";
    pub const OPENAI_MODEL: &str = "openai-model";
    pub const POM: &str = "pom";
    pub const SITE_URL: &str = "site-url";
}

/// Key prefix for the in-memory backend, mirroring the non-extension
/// fallback namespace.
const MEMORY_PREFIX: &str = "testcraft_";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Trait: SettingsStore
// ---------------------------------------------------------------------------

/// Async key-value settings contract.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, SettingsError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), SettingsError>;
    async fn remove(&self, key: &str) -> Result<(), SettingsError>;

    /// Convenience: fetch a string value, treating null as absent.
    async fn get_string(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_str().map(str::to_owned)))
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Durable store: a single JSON object on disk, read-modify-written per
/// mutation. Mutation volume is tiny (settings forms), so no caching.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<HashMap<String, Value>, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, map: &HashMap<String, Value>) -> Result<(), SettingsError> {
        let contents = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);
        self.store(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.store(&map).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local fallback store with a namespacing prefix.
#[derive(Default)]
pub struct MemorySettingsStore {
    map: Mutex<HashMap<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn prefixed(key: &str) -> String {
        format!("{MEMORY_PREFIX}{key}")
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self
            .map
            .lock()
            .expect("settings map poisoned")
            .get(&Self::prefixed(key))
            .cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.map
            .lock()
            .expect("settings map poisoned")
            .insert(Self::prefixed(key), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.map
            .lock()
            .expect("settings map poisoned")
            .remove(&Self::prefixed(key));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Capability detection
// ---------------------------------------------------------------------------

/// Default settings file location: `$TESTCRAFT_SETTINGS`, else
/// `$HOME/.config/testcraft/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TESTCRAFT_SETTINGS") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/testcraft/settings.json"))
}

/// Pick a store at startup: file-backed when a settings path exists and
/// its directory can be created, in-memory otherwise.
pub fn open_default() -> Arc<dyn SettingsStore> {
    if let Some(path) = default_settings_path() {
        let dir_ok = path
            .parent()
            .map(|dir| std::fs::create_dir_all(dir).is_ok())
            .unwrap_or(false);
        if dir_ok {
            tracing::debug!(path = %path.display(), "using file settings store");
            return Arc::new(FileSettingsStore::new(path));
        }
    }
    tracing::debug!("no writable settings path, using in-memory store");
    Arc::new(MemorySettingsStore::new())
}
