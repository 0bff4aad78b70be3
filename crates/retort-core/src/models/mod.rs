//! Partial record types for documents returned by the API.
//!
//! The server owns these shapes; the client types only the fields it
//! actually reads and keeps the rest in a flattened `extra` map so nothing
//! is lost when re-serializing.

pub mod auth;
pub mod experiment;
pub mod gallery;
pub mod job;
pub mod provider;
pub mod task;

pub use auth::{LoginRequest, LoginResponse, UserInfo};
pub use experiment::Experiment;
pub use gallery::GalleryEntry;
pub use job::{Job, JobArtifact};
pub use provider::Provider;
pub use task::{CreateTaskRequest, QueueResponse, Task};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Deserializes an optional RFC 3339 timestamp, treating anything
/// unparseable as absent. Server timestamp formats have changed across
/// releases and one bad field must not reject the whole document.
pub(crate) fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, deserialize_with = "super::lenient_datetime")]
        at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn test_valid_timestamp_parses() {
        let stamped: Stamped =
            serde_json::from_str(r#"{"at": "2024-05-01T12:00:00Z"}"#).unwrap();
        assert!(stamped.at.is_some());
    }

    #[test]
    fn test_garbage_timestamp_is_none() {
        let stamped: Stamped = serde_json::from_str(r#"{"at": "yesterday"}"#).unwrap();
        assert!(stamped.at.is_none());

        let stamped: Stamped = serde_json::from_str(r#"{"at": 12345}"#).unwrap();
        assert!(stamped.at.is_none());
    }

    #[test]
    fn test_missing_timestamp_is_none() {
        let stamped: Stamped = serde_json::from_str("{}").unwrap();
        assert!(stamped.at.is_none());

        let stamped: Stamped = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(stamped.at.is_none());
    }
}
