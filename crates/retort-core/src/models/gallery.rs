//! Gallery template records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A task template published in the gallery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
