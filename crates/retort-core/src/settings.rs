//! Flat key-value settings store (`settings.json`).
//!
//! Older releases also kept the team id and user email here; the credential
//! store falls back to these keys when the credential file lacks them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::paths::ensure_dir;

/// File name of the settings store inside the configuration directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Well-known settings keys.
pub mod keys {
    /// Stored deployment target ("local" or "cloud").
    pub const TARGET: &str = "target";
    /// Server URL override for the local target.
    pub const SERVER_LOCAL: &str = "server.local";
    /// Server URL override for the cloud target.
    pub const SERVER_CLOUD: &str = "server.cloud";
    /// Legacy location of the team id.
    pub const TEAM_ID: &str = "team_id";
    /// Legacy location of the user email.
    pub const USER_EMAIL: &str = "user_email";
}

/// In-memory view of the settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Path of the settings file under `dir`.
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    /// Loads settings from `dir`.
    ///
    /// A missing or unreadable file yields empty settings; settings are
    /// advisory and must never block a command.
    pub fn load(dir: &Path) -> Settings {
        let path = Self::path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Settings::default(),
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(values) => Settings { values },
            Err(e) => {
                tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    /// Writes settings to `dir`, creating the directory if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        ensure_dir(dir)?;
        let path = Self::path(dir);
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&path, content)?;

        // Owner read/write only; legacy installs keep the team id and
        // email in this file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tmp = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.set(keys::TARGET, "cloud");
        settings.set(keys::SERVER_LOCAL, "http://127.0.0.1:9000");
        settings.save(tmp.path()).unwrap();

        let loaded = Settings::load(tmp.path());
        assert_eq!(loaded.get(keys::TARGET), Some("cloud"));
        assert_eq!(loaded.get(keys::SERVER_LOCAL), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Settings::load(tmp.path()).is_empty());
    }

    #[test]
    fn test_malformed_file_yields_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(Settings::path(tmp.path()), "{not json").unwrap();
        assert!(Settings::load(tmp.path()).is_empty());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut settings = Settings::default();
        settings.set("b", "2");
        settings.set("a", "1");

        let keys: Vec<_> = settings.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
