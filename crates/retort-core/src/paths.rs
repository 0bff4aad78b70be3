//! Locations of the per-user configuration directory.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, RetortError};

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "RETORT_HOME";

/// Returns the configuration directory (`$RETORT_HOME` or `~/.retort`).
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::home_dir()
        .map(|h| h.join(".retort"))
        .ok_or_else(|| RetortError::Configuration("Could not determine home directory".to_string()))
}

/// Creates `dir` if needed. On Unix it is created owner-only (0700)
/// since it holds credential files.
pub(crate) fn ensure_dir(dir: &std::path::Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        temp_env::with_var(HOME_ENV, Some("/tmp/retort-test-home"), || {
            let dir = config_dir().unwrap();
            assert_eq!(dir, PathBuf::from("/tmp/retort-test-home"));
        });
    }

    #[test]
    fn test_empty_env_override_is_ignored() {
        temp_env::with_var(HOME_ENV, Some(""), || {
            let dir = config_dir().unwrap();
            assert!(dir.ends_with(".retort") || !dir.as_os_str().is_empty());
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("config");
        ensure_dir(&dir).unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
