//! Authentication operations.

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse, UserInfo};

/// Logs in with email and password, returning the token the server issued.
/// Persisting the token is the caller's decision.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<LoginResponse> {
    let route = client.resolver().resolve_or(
        "auth",
        &["login"],
        &[],
        ResolvedEndpoint::post("/v1/auth/login"),
    );

    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    client.request_with_body(&route, &request).await
}

/// Returns the user the current credentials authenticate as.
pub async fn whoami(client: &ApiClient) -> Result<UserInfo> {
    let route = client.resolver().resolve_or(
        "auth",
        &["whoami"],
        &[],
        ResolvedEndpoint::get("/v1/users/me"),
    );

    client.request(&route).await
}
