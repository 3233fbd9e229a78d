// TOML settings adapter - Persisted boolean preferences in a `[settings]` table

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::ports::*;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: BTreeMap<String, bool>,
}

/// Boolean key-value settings, written back to a TOML file on every change
#[derive(Debug, Default)]
pub struct TomlSettingsStore {
    values: RwLock<BTreeMap<String, bool>>,
    file_path: Option<PathBuf>,
}

impl TomlSettingsStore {
    /// Store that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load settings from `path`. A missing file starts out empty and is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                DomainError::Settings(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let parsed: SettingsFile = toml::from_str(&content).map_err(|e| {
                DomainError::Settings(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            parsed.settings
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = values.len(), "Loaded settings");
        Ok(Self {
            values: RwLock::new(values),
            file_path: Some(path),
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn persist(&self, values: &BTreeMap<String, bool>) -> Result<(), DomainError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::Settings(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = toml::to_string(&SettingsFile {
            settings: values.clone(),
        })
        .map_err(|e| DomainError::Settings(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DomainError::Settings(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

impl SettingsPort for TomlSettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), DomainError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        self.persist(&values)?;
        info!("Set setting {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_defaults() {
        let store = TomlSettingsStore::in_memory();
        assert_eq!(store.get_bool(PREFER_INSTALLED_KEY), None);
        assert!(!store.prefer_installed_tools());

        store.set_bool(PREFER_INSTALLED_KEY, true).unwrap();
        assert!(store.prefer_installed_tools());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let store = TomlSettingsStore::open(&path).unwrap();
        store.set_bool(PREFER_INSTALLED_KEY, true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[settings]"));
        assert!(content.contains("use_installed_ffmpeg = true"));

        let reopened = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(reopened.get_bool(PREFER_INSTALLED_KEY), Some(true));
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[settings\nbroken").unwrap();

        assert!(matches!(
            TomlSettingsStore::open(&path),
            Err(DomainError::Settings(_))
        ));
    }
}
