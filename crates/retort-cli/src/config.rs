//! Connection settings resolution.
//!
//! Priority order: CLI flags > environment variables > settings file >
//! built-in defaults. The environment step is handled by clap (the global
//! flags declare `env = ...`), so by the time values reach this module a
//! flag already carries the env fallback.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use url::Url;

use retort_core::settings::{Settings, keys};
use retort_core::{Target, paths};

/// Connection settings after applying priority rules.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Deployment target the command runs against.
    pub target: Target,
    /// Base URL of the API server.
    pub base_url: String,
    /// Directory holding credentials and settings.
    pub config_dir: PathBuf,
}

/// Resolves connection settings from flags and the settings file.
pub fn resolve(target_flag: Option<&str>, server_flag: Option<&str>) -> Result<ResolvedConfig> {
    let config_dir = paths::config_dir()?;
    let settings = Settings::load(&config_dir);
    let resolved = resolve_with(&settings, config_dir, target_flag, server_flag)?;
    tracing::debug!("Using {} target at {}", resolved.target, resolved.base_url);
    Ok(resolved)
}

fn resolve_with(
    settings: &Settings,
    config_dir: PathBuf,
    target_flag: Option<&str>,
    server_flag: Option<&str>,
) -> Result<ResolvedConfig> {
    let target = match target_flag.or_else(|| settings.get(keys::TARGET)) {
        Some(raw) => raw.parse::<Target>()?,
        None => Target::default(),
    };

    let base_url = match server_flag {
        Some(url) => validate_server_url(url)?,
        None => settings
            .get(target.server_setting_key())
            .map(str::to_string)
            .unwrap_or_else(|| target.default_base_url().to_string()),
    };

    Ok(ResolvedConfig {
        target,
        base_url,
        config_dir,
    })
}

/// Checks that a user-supplied server URL is usable and strips any
/// trailing slash.
pub fn validate_server_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("Invalid server URL '{}'", raw))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("Server URL must use http or https, got '{}'", raw);
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> PathBuf {
        PathBuf::from("/tmp/retort-test")
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve_with(&Settings::default(), dir(), None, None).unwrap();
        assert_eq!(resolved.target, Target::Local);
        assert_eq!(resolved.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_resolve_target_from_settings() {
        let mut settings = Settings::default();
        settings.set(keys::TARGET, "cloud");

        let resolved = resolve_with(&settings, dir(), None, None).unwrap();
        assert_eq!(resolved.target, Target::Cloud);
        assert_eq!(resolved.base_url, "https://api.retort.dev");
    }

    #[test]
    fn test_target_flag_overrides_settings() {
        let mut settings = Settings::default();
        settings.set(keys::TARGET, "cloud");

        let resolved = resolve_with(&settings, dir(), Some("local"), None).unwrap();
        assert_eq!(resolved.target, Target::Local);
    }

    #[test]
    fn test_server_resolution_order() {
        let mut settings = Settings::default();
        settings.set(keys::SERVER_LOCAL, "http://lab-box:9000");

        let from_settings = resolve_with(&settings, dir(), None, None).unwrap();
        assert_eq!(from_settings.base_url, "http://lab-box:9000");

        let from_flag =
            resolve_with(&settings, dir(), None, Some("http://flag-box:7000")).unwrap();
        assert_eq!(from_flag.base_url, "http://flag-box:7000");
    }

    #[test]
    fn test_server_setting_is_per_target() {
        let mut settings = Settings::default();
        settings.set(keys::SERVER_LOCAL, "http://lab-box:9000");

        // The local override must not leak into the cloud target.
        let resolved = resolve_with(&settings, dir(), Some("cloud"), None).unwrap();
        assert_eq!(resolved.base_url, "https://api.retort.dev");
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let result = resolve_with(&Settings::default(), dir(), Some("staging"), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("staging"));
    }

    #[test]
    fn test_server_flag_is_validated() {
        assert!(validate_server_url("http://localhost:8080").is_ok());
        assert!(validate_server_url("not a url").is_err());
        assert!(validate_server_url("ftp://host/path").is_err());
    }

    #[test]
    fn test_server_flag_trailing_slash_is_stripped() {
        assert_eq!(
            validate_server_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
    }
}
