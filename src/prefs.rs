//! Persisted local UI preferences
//!
//! Dark mode, the alarms-enabled switch and the admin credential live in a
//! small JSON key-value file under the data directory. They are read once at
//! startup and written back on every change. None of this participates in
//! the synchronization core; the credential is merely attached to privileged
//! remote calls.

use crate::error::{AppError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub alarms_enabled: bool,
    #[serde(default)]
    pub admin_token: Option<String>,
}

/// File-backed preference store
pub struct PrefStore {
    path: PathBuf,
    prefs: RwLock<Prefs>,
}

impl PrefStore {
    /// Open the store, rehydrating any previously saved preferences.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(PREFS_FILE);
        let prefs = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| AppError::Config(format!("Failed to read prefs: {}", e)))?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            Prefs::default()
        };

        Ok(Self {
            path,
            prefs: RwLock::new(prefs),
        })
    }

    pub fn get(&self) -> Prefs {
        self.prefs.read().clone()
    }

    pub fn admin_token(&self) -> Option<String> {
        self.prefs.read().admin_token.clone()
    }

    pub fn set_admin_token(&self, token: Option<String>) -> Result<()> {
        self.prefs.write().admin_token = token;
        self.persist()
    }

    /// Drop the stored credential, e.g. after the server rejects it.
    pub fn clear_admin_token(&self) -> Result<()> {
        self.set_admin_token(None)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.prefs.write().dark_mode = enabled;
        self.persist()
    }

    pub fn alarms_enabled(&self) -> bool {
        self.prefs.read().alarms_enabled
    }

    pub fn set_alarms_enabled(&self, enabled: bool) -> Result<()> {
        self.prefs.write().alarms_enabled = enabled;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create data dir: {}", e)))?;
        }
        let raw = serde_json::to_string_pretty(&*self.prefs.read())?;
        fs::write(&self.path, raw)
            .map_err(|e| AppError::Config(format!("Failed to write prefs: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrips_through_the_file() {
        let dir = tempdir().unwrap();
        let store = PrefStore::open(dir.path()).unwrap();
        store.set_dark_mode(true).unwrap();
        store.set_admin_token(Some("secret".into())).unwrap();
        store.set_alarms_enabled(true).unwrap();

        let reopened = PrefStore::open(dir.path()).unwrap();
        let prefs = reopened.get();
        assert!(prefs.dark_mode);
        assert!(prefs.alarms_enabled);
        assert_eq!(prefs.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn clearing_the_token_persists() {
        let dir = tempdir().unwrap();
        let store = PrefStore::open(dir.path()).unwrap();
        store.set_admin_token(Some("secret".into())).unwrap();
        store.clear_admin_token().unwrap();

        let reopened = PrefStore::open(dir.path()).unwrap();
        assert!(reopened.admin_token().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = PrefStore::open(dir.path()).unwrap();
        let prefs = store.get();
        assert!(!prefs.dark_mode);
        assert!(!prefs.alarms_enabled);
        assert!(prefs.admin_token.is_none());
    }
}
