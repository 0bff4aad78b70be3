//! Job operations, including the cross-experiment aggregate listing.

use futures_util::future;

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::Result;
use crate::models::{Job, JobArtifact};

use super::experiments;

/// Scope name for jobs not attached to any experiment.
pub const GLOBAL_SCOPE: &str = "global";

/// Lists jobs in one experiment scope.
pub async fn list(client: &ApiClient, experiment_id: &str) -> Result<Vec<Job>> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["list"],
        &[("experiment_id", experiment_id)],
        ResolvedEndpoint::get(format!(
            "/v1/experiments/{}/jobs",
            urlencoding::encode(experiment_id)
        )),
    );
    client.request(&route).await
}

/// Lists jobs across every experiment plus the global scope.
///
/// One list call is issued per scope concurrently; the merged result is
/// sorted by creation time, newest first, with undated jobs last. Any
/// failing scope fails the whole aggregate rather than returning a
/// partial view.
pub async fn list_all(client: &ApiClient) -> Result<Vec<Job>> {
    let experiments = experiments::list(client).await?;

    let mut scopes: Vec<String> = experiments.into_iter().map(|e| e.id).collect();
    scopes.push(GLOBAL_SCOPE.to_string());

    let fetches = scopes.iter().map(|scope| list(client, scope));
    let results = future::try_join_all(fetches).await?;

    let mut jobs: Vec<Job> = results.into_iter().flatten().collect();
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(jobs)
}

/// Fetches one job by id.
pub async fn get(client: &ApiClient, job_id: &str) -> Result<Job> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["get"],
        &[("job_id", job_id)],
        ResolvedEndpoint::get(format!("/v1/jobs/{}", urlencoding::encode(job_id))),
    );
    client.request(&route).await
}

/// Asks the server to stop a running job.
pub async fn stop(client: &ApiClient, job_id: &str) -> Result<()> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["stop"],
        &[("job_id", job_id)],
        ResolvedEndpoint::post(format!("/v1/jobs/{}/stop", urlencoding::encode(job_id))),
    );
    client.request_empty(&route).await
}

/// Deletes a job.
pub async fn delete(client: &ApiClient, job_id: &str) -> Result<()> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["delete"],
        &[("job_id", job_id)],
        ResolvedEndpoint::delete(format!("/v1/jobs/{}", urlencoding::encode(job_id))),
    );
    client.request_empty(&route).await
}

/// Fetches the buffered log text of a job.
pub async fn logs(client: &ApiClient, job_id: &str) -> Result<String> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["logs"],
        &[("job_id", job_id)],
        ResolvedEndpoint::get(format!("/v1/jobs/{}/logs", urlencoding::encode(job_id))),
    );
    client.request_text(&route).await
}

/// Opens the live log stream of a job. The caller reads the body
/// incrementally.
pub async fn stream(client: &ApiClient, job_id: &str) -> Result<reqwest::Response> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["stream"],
        &[("job_id", job_id)],
        ResolvedEndpoint::get(format!(
            "/v1/jobs/{}/logs/stream",
            urlencoding::encode(job_id)
        )),
    );
    client.request_stream(&route).await
}

/// Lists the artifacts a job produced.
pub async fn artifacts(client: &ApiClient, job_id: &str) -> Result<Vec<JobArtifact>> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["artifacts", "list"],
        &[("job_id", job_id)],
        ResolvedEndpoint::get(format!("/v1/jobs/{}/artifacts", urlencoding::encode(job_id))),
    );
    client.request(&route).await
}

/// Opens a download stream for one artifact.
pub async fn download_artifact(
    client: &ApiClient,
    job_id: &str,
    artifact_id: &str,
) -> Result<reqwest::Response> {
    let route = client.resolver().resolve_or(
        "jobs",
        &["artifacts", "download"],
        &[("job_id", job_id), ("artifact_id", artifact_id)],
        ResolvedEndpoint::get(format!(
            "/v1/jobs/{}/artifacts/{}",
            urlencoding::encode(job_id),
            urlencoding::encode(artifact_id)
        )),
    );
    client.request_stream(&route).await
}
