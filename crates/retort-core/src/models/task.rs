//! Task records and requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A training or evaluation task as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub plugin: Option<String>,
    /// Plugin-defined configuration bag; only well-known keys are read.
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Whether this task runs on a remote compute provider.
    pub fn is_remote(&self) -> bool {
        self.task_type.as_deref() == Some("REMOTE")
    }

    /// Provider pinned in the task config, if any.
    pub fn provider_id(&self) -> Option<&str> {
        self.config_str("provider_id")
    }

    /// Launch command stored in the task config, if any.
    pub fn command(&self) -> Option<&str> {
        self.config_str("command")
    }

    fn config_str(&self, key: &str) -> Option<&str> {
        self.config.as_ref()?.get(key)?.as_str()
    }
}

/// Request body for creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Server response to queueing or launching a task.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
