//! Compute provider operations.

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::Result;
use crate::models::Provider;

/// Lists registered compute providers.
pub async fn list(client: &ApiClient) -> Result<Vec<Provider>> {
    let route = client.resolver().resolve_or(
        "providers",
        &["list"],
        &[],
        ResolvedEndpoint::get("/v1/providers"),
    );
    client.request(&route).await
}
