//! Authenticated HTTP client for the Retort API.

use std::time::Duration;

use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::credentials::CredentialStore;
use crate::endpoints::{EndpointResolver, ResolvedEndpoint};
use crate::error::{Result, RetortError};
use crate::response;

/// Header carrying the team scope on authenticated requests.
pub const TEAM_HEADER: &str = "X-Team-Id";

const USER_AGENT: &str = concat!("retort/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client holding the base URL, the endpoint resolver, and the
/// credential store for one target.
///
/// Credentials are re-read from disk on every request, so a login performed
/// by another process is picked up immediately. The client owns all header
/// assembly; callers never pass headers, which keeps the injected
/// `Authorization` and team headers collision-free.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: String,
    resolver: EndpointResolver,
    credentials: CredentialStore,
    token_override: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` using the bundled endpoint map.
    pub fn new(base_url: impl Into<String>, credentials: CredentialStore) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| RetortError::Configuration(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner,
            base_url,
            resolver: EndpointResolver::bundled()?,
            credentials,
            token_override: None,
        })
    }

    /// Uses `token` for `Authorization` instead of the stored credential,
    /// e.g. when the user passes `--api-key`.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        self.token_override = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Performs the request and parses the JSON response.
    pub async fn request<T: DeserializeOwned>(&self, route: &ResolvedEndpoint) -> Result<T> {
        let response = self.execute(route, None).await?;
        response::parse_json(response).await
    }

    /// Performs the request with a JSON body and parses the JSON response.
    pub async fn request_with_body<T: DeserializeOwned, B: Serialize>(
        &self,
        route: &ResolvedEndpoint,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(route, Some(&body)).await?;
        response::parse_json(response).await
    }

    /// Performs the request and returns the body as plain text.
    pub async fn request_text(&self, route: &ResolvedEndpoint) -> Result<String> {
        let response = self.execute(route, None).await?;
        response::read_text(response).await
    }

    /// Performs the request and discards any response body.
    pub async fn request_empty(&self, route: &ResolvedEndpoint) -> Result<()> {
        let response = self.execute(route, None).await?;
        response::check_status(response).await
    }

    /// Performs the request and returns the response for incremental body
    /// reads. The status is checked before handing the stream back.
    pub async fn request_stream(&self, route: &ResolvedEndpoint) -> Result<reqwest::Response> {
        let response = self.execute(route, None).await?;
        response::require_success(response).await
    }

    /// Performs the request and returns the raw response without status
    /// normalization. For callers that branch on the status themselves,
    /// such as the remote-launch fallback chain.
    pub async fn request_raw(
        &self,
        route: &ResolvedEndpoint,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        self.execute(route, body).await
    }

    async fn execute(
        &self,
        route: &ResolvedEndpoint,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = join_url(&self.base_url, &route.path);
        tracing::debug!("{} {}", route.method, url);

        let mut request = self.with_auth(self.inner.request(route.method.into(), &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Attaches `Authorization` and team headers from freshly loaded
    /// credentials. Both are optional; an unauthenticated request is sent
    /// as-is and the server's 401 reports the failure.
    fn with_auth(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let credentials = self.credentials.load();

        let token = self
            .token_override
            .as_deref()
            .or(credentials.access_token.as_deref());
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(team_id) = credentials.team_id.as_deref() {
            builder = builder.header(TEAM_HEADER, team_id);
        }

        builder
    }
}

/// Joins a path to the base URL with exactly one slash between them.
/// Absolute URLs pass through untouched.
fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://x/", "/tasks/list"), "http://x/tasks/list");
        assert_eq!(join_url("http://x", "/tasks/list"), "http://x/tasks/list");
        assert_eq!(join_url("http://x/", "tasks/list"), "http://x/tasks/list");
        assert_eq!(join_url("http://x", "tasks/list"), "http://x/tasks/list");
    }

    #[test]
    fn test_join_url_keeps_absolute_urls() {
        assert_eq!(
            join_url("http://x", "https://cdn.example.com/artifact"),
            "https://cdn.example.com/artifact"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(tmp.path(), crate::Target::Local);
        let result = ApiClient::new("not a url", store);
        assert!(matches!(result, Err(RetortError::Configuration(_))));
    }
}
