use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use client_logging::{client_info, client_warn};
use readpull_core::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const PREFS_FILENAME: &str = ".readpull_prefs.ron";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preferences directory missing or not writable: {0}")]
    Dir(String),
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoredPreferences {
    credential: Option<String>,
    base_url: Option<String>,
}

/// Settings handed to the session at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub credential: Option<String>,
    pub base_url: String,
}

/// RON-backed settings store: one file, read tolerantly, written atomically.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    dir: PathBuf,
}

impl PreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A missing or unreadable file yields the defaults; settings are never
    /// a reason to refuse startup.
    pub fn load(&self) -> Preferences {
        let stored = self.read_stored();
        Preferences {
            credential: stored.credential,
            base_url: stored
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn save_credential(&self, key: &str) -> Result<(), PreferencesError> {
        let mut stored = self.read_stored();
        stored.credential = Some(key.to_string());
        self.write_stored(&stored)
    }

    pub fn save_base_url(&self, url: &str) -> Result<(), PreferencesError> {
        let mut stored = self.read_stored();
        stored.base_url = Some(url.to_string());
        self.write_stored(&stored)
    }

    fn path(&self) -> PathBuf {
        self.dir.join(PREFS_FILENAME)
    }

    fn read_stored(&self) -> StoredPreferences {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return StoredPreferences::default();
            }
            Err(err) => {
                client_warn!("Failed to read preferences from {:?}: {}", path, err);
                return StoredPreferences::default();
            }
        };

        match ron::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => {
                client_warn!("Failed to parse preferences from {:?}: {}", path, err);
                StoredPreferences::default()
            }
        }
    }

    fn write_stored(&self, stored: &StoredPreferences) -> Result<(), PreferencesError> {
        ensure_dir(&self.dir)?;

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(stored, pretty)
            .map_err(|err| PreferencesError::Serialize(err.to_string()))?;

        let target = self.path();
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target)
            .map_err(|err| PreferencesError::Io(err.error))?;
        client_info!("Preferences written to {:?}", target);
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PreferencesError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|err| PreferencesError::Dir(err.to_string()))?;
        if !meta.is_dir() {
            return Err(PreferencesError::Dir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|err| PreferencesError::Dir(err.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path());

        let prefs = store.load();
        assert_eq!(prefs.credential, None);
        assert_eq!(prefs.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn saved_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path());

        store.save_credential("key-1").unwrap();
        store.save_base_url("http://other.test").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.credential.as_deref(), Some("key-1"));
        assert_eq!(prefs.base_url, "http://other.test");
    }

    #[test]
    fn saving_one_value_keeps_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path());

        store.save_credential("key-1").unwrap();
        store.save_base_url("http://other.test").unwrap();
        store.save_credential("key-2").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.credential.as_deref(), Some("key-2"));
        assert_eq!(prefs.base_url, "http://other.test");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path());
        fs::write(dir.path().join(PREFS_FILENAME), "not ron at all {{{").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.credential, None);
        assert_eq!(prefs.base_url, DEFAULT_BASE_URL);
    }
}
