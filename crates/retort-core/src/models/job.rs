//! Job records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A running or finished job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    /// Runtime state bag (metrics, worker info); passed through untyped.
    #[serde(default)]
    pub job_data: Option<Value>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An artifact produced by a job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobArtifact {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl JobArtifact {
    /// Name to show and to use as the default download filename.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_timestamp_does_not_reject_job() {
        let job: Job = serde_json::from_str(
            r#"{"id": "j1", "status": "RUNNING", "created_at": "not-a-date"}"#,
        )
        .unwrap();
        assert_eq!(job.status.as_deref(), Some("RUNNING"));
        assert!(job.created_at.is_none());
    }

    #[test]
    fn test_artifact_display_name_falls_back_to_id() {
        let artifact: JobArtifact = serde_json::from_str(r#"{"id": "a1"}"#).unwrap();
        assert_eq!(artifact.display_name(), "a1");

        let artifact: JobArtifact =
            serde_json::from_str(r#"{"id": "a1", "name": "model.bin"}"#).unwrap();
        assert_eq!(artifact.display_name(), "model.bin");
    }
}
