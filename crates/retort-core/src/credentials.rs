//! Credential file handling.
//!
//! Credentials live in a JSON file under the configuration directory, one
//! file per [`Target`] so local and cloud logins stay independent. The file
//! is written with owner-only permissions. Loading is deliberately lenient:
//! a missing or unreadable file means "not logged in", never an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::paths::ensure_dir;
use crate::settings::{self, Settings};
use crate::target::Target;

/// Stored credentials for one target.
///
/// All fields are optional; in [`CredentialStore::save`] a `None` field
/// means "leave the stored value untouched".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub user_email: Option<String>,
}

/// Reads and writes the credential file for one target.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
    target: Target,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            dir: dir.into(),
            target,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Path of the credential file for this store's target.
    pub fn path(&self) -> PathBuf {
        self.dir.join(self.target.credentials_filename())
    }

    /// Loads credentials, falling back to defaults on any read or parse
    /// failure.
    ///
    /// Older releases stored the token under `api_key` and kept the team id
    /// and email in the settings file; both spellings are honored here so an
    /// upgrade never logs the user out.
    pub fn load(&self) -> Credentials {
        let path = self.path();
        let mut credentials = read_credentials_file(&path);

        if credentials.team_id.is_none() || credentials.user_email.is_none() {
            let legacy = Settings::load(&self.dir);
            if credentials.team_id.is_none() {
                credentials.team_id = legacy.get(settings::keys::TEAM_ID).map(str::to_string);
            }
            if credentials.user_email.is_none() {
                credentials.user_email = legacy.get(settings::keys::USER_EMAIL).map(str::to_string);
            }
        }

        credentials
    }

    /// Merges the `Some` fields of `update` into the stored file.
    ///
    /// Fields this version does not know about are preserved as-is, so a
    /// newer CLI writing extra fields can coexist with this one. Writing a
    /// token also removes the legacy `api_key` spelling.
    pub fn save(&self, update: &Credentials) -> Result<()> {
        ensure_dir(&self.dir)?;

        let path = self.path();
        let mut document = read_document(&path);

        if let Some(ref token) = update.access_token {
            document.insert("access_token".to_string(), Value::String(token.clone()));
            document.remove("api_key");
        }
        if let Some(ref team_id) = update.team_id {
            document.insert("team_id".to_string(), Value::String(team_id.clone()));
        }
        if let Some(ref team_name) = update.team_name {
            document.insert("team_name".to_string(), Value::String(team_name.clone()));
        }
        if let Some(ref email) = update.user_email {
            document.insert("user_email".to_string(), Value::String(email.clone()));
        }

        write_document(&path, &document)
    }

    /// Removes the stored token while keeping team and email fields, so a
    /// later login stays scoped to the same team. Idempotent; a missing
    /// file is already logged out.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if !path.exists() {
            return Ok(());
        }

        let mut document = read_document(&path);
        document.remove("access_token");
        document.remove("api_key");
        write_document(&path, &document)
    }
}

/// Reads the raw JSON object from `path`, or an empty object.
fn read_document(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Map::new(),
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::warn!("Ignoring malformed credential file {}", path.display());
            Map::new()
        }
    }
}

fn read_credentials_file(path: &Path) -> Credentials {
    check_file_permissions(path);

    let document = read_document(path);
    let get = |key: &str| {
        document
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Credentials {
        // `api_key` is the pre-1.0 spelling of the token field.
        access_token: get("access_token").or_else(|| get("api_key")),
        team_id: get("team_id"),
        team_name: get("team_name"),
        user_email: get("user_email"),
    }
}

fn write_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
    let content = serde_json::to_string_pretty(&Value::Object(document.clone()))?;
    fs::write(path, content)?;

    // Owner read/write only; the file holds a bearer token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Warn if the credential file is readable by group or others (on Unix).
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            tracing::warn!(
                "{} has overly permissive permissions ({:o}). Consider running: chmod 600 {}",
                path.display(),
                mode & 0o777,
                path.display()
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}
