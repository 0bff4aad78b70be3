//! Gallery template operations.

use serde_json::Value;

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::Result;
use crate::models::GalleryEntry;

/// Lists gallery templates.
pub async fn list(client: &ApiClient) -> Result<Vec<GalleryEntry>> {
    let route = client.resolver().resolve_or(
        "gallery",
        &["list"],
        &[],
        ResolvedEndpoint::get("/v1/gallery"),
    );
    client.request(&route).await
}

/// Imports a gallery template into the current team.
pub async fn import(client: &ApiClient, entry_id: &str) -> Result<Value> {
    let route = client.resolver().resolve_or(
        "gallery",
        &["import"],
        &[("entry_id", entry_id)],
        ResolvedEndpoint::post(format!("/v1/gallery/{}/import", urlencoding::encode(entry_id))),
    );
    client.request(&route).await
}

/// Exports a task to the gallery.
pub async fn export(client: &ApiClient, entry_id: &str) -> Result<Value> {
    let route = client.resolver().resolve_or(
        "gallery",
        &["export"],
        &[("entry_id", entry_id)],
        ResolvedEndpoint::post(format!("/v1/gallery/{}/export", urlencoding::encode(entry_id))),
    );
    client.request(&route).await
}
