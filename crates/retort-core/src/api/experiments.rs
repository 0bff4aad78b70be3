//! Experiment operations.

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::Result;
use crate::models::Experiment;

/// Lists experiments visible to the current team.
pub async fn list(client: &ApiClient) -> Result<Vec<Experiment>> {
    let route = client.resolver().resolve_or(
        "experiments",
        &["list"],
        &[],
        ResolvedEndpoint::get("/v1/experiments"),
    );
    client.request(&route).await
}
