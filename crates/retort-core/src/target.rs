//! Deployment targets the CLI can talk to.

use std::fmt;
use std::str::FromStr;

use crate::error::RetortError;

/// Which Retort deployment a command runs against.
///
/// The target decides the default base URL and which credential file is
/// used, so local and cloud logins never clobber each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Local,
    Cloud,
}

impl Target {
    /// Base URL used when no server override is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Target::Local => "http://localhost:8080",
            Target::Cloud => "https://api.retort.dev",
        }
    }

    /// Credential file name scoped to this target.
    pub fn credentials_filename(&self) -> &'static str {
        match self {
            Target::Local => "credentials.json",
            Target::Cloud => "credentials.cloud.json",
        }
    }

    /// Settings key holding the server URL override for this target.
    pub fn server_setting_key(&self) -> &'static str {
        match self {
            Target::Local => "server.local",
            Target::Cloud => "server.cloud",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Local => "local",
            Target::Cloud => "cloud",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = RetortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Target::Local),
            "cloud" => Ok(Target::Cloud),
            other => Err(RetortError::Configuration(format!(
                "Unknown target '{}'. Expected 'local' or 'cloud'.",
                other
            ))),
        }
    }
}
