//! Experiment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An experiment grouping tasks and jobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}
