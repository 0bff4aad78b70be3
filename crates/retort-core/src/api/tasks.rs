//! Task operations, including the remote-launch fallback chain.

use reqwest::StatusCode;
use serde_json::json;

use crate::client::ApiClient;
use crate::endpoints::ResolvedEndpoint;
use crate::error::{Result, RetortError};
use crate::models::{CreateTaskRequest, QueueResponse, Task};
use crate::response;

use super::providers;

/// Lists all tasks.
pub async fn list(client: &ApiClient) -> Result<Vec<Task>> {
    let route =
        client
            .resolver()
            .resolve_or("tasks", &["list"], &[], ResolvedEndpoint::get("/v1/tasks"));
    client.request(&route).await
}

/// Fetches one task by id.
pub async fn get(client: &ApiClient, task_id: &str) -> Result<Task> {
    let route = client.resolver().resolve_or(
        "tasks",
        &["get"],
        &[("task_id", task_id)],
        ResolvedEndpoint::get(format!("/v1/tasks/{}", urlencoding::encode(task_id))),
    );
    client.request(&route).await
}

/// Creates a task.
pub async fn create(client: &ApiClient, request: &CreateTaskRequest) -> Result<Task> {
    let route = client.resolver().resolve_or(
        "tasks",
        &["create"],
        &[],
        ResolvedEndpoint::post("/v1/tasks"),
    );
    client.request_with_body(&route, request).await
}

/// Deletes a task.
pub async fn delete(client: &ApiClient, task_id: &str) -> Result<()> {
    let route = client.resolver().resolve_or(
        "tasks",
        &["delete"],
        &[("task_id", task_id)],
        ResolvedEndpoint::delete(format!("/v1/tasks/{}", urlencoding::encode(task_id))),
    );
    client.request_empty(&route).await
}

/// Queues a task for execution.
///
/// Local tasks go straight onto the queue, with `overrides` passed as
/// URL-encoded query parameters. Remote tasks are launched on a compute
/// provider instead: the provider comes from `provider`, then from the task
/// config, then from the first entry of the provider list.
pub async fn queue(
    client: &ApiClient,
    task_id: &str,
    provider: Option<&str>,
    overrides: &[(String, String)],
) -> Result<QueueResponse> {
    let task = get(client, task_id).await?;

    if task.is_remote() {
        queue_remote(client, &task, provider, overrides).await
    } else {
        queue_local(client, task_id, overrides).await
    }
}

async fn queue_local(
    client: &ApiClient,
    task_id: &str,
    overrides: &[(String, String)],
) -> Result<QueueResponse> {
    let mut route = client.resolver().resolve_or(
        "tasks",
        &["queue"],
        &[("task_id", task_id)],
        ResolvedEndpoint::post(format!("/v1/tasks/{}/queue", urlencoding::encode(task_id))),
    );

    if !overrides.is_empty() {
        let query: Vec<String> = overrides
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect();
        route.path = format!("{}?{}", route.path, query.join("&"));
    }

    client.request(&route).await
}

/// Launches a remote task on a provider, trying the provider-specific
/// launch route first and falling back to the generic one when the server
/// does not have it (404/405). The launch API has moved across server
/// releases and this chain keeps older and newer servers both working.
async fn queue_remote(
    client: &ApiClient,
    task: &Task,
    provider: Option<&str>,
    overrides: &[(String, String)],
) -> Result<QueueResponse> {
    let provider_id = match provider.or_else(|| task.provider_id()) {
        Some(id) => id.to_string(),
        None => first_provider(client).await?,
    };

    let command = merge_command_overrides(task.command().unwrap_or(""), overrides);
    let body = json!({
        "task_id": task.id,
        "provider_id": provider_id,
        "command": command,
    });

    let launch = client.resolver().resolve_or(
        "providers",
        &["launch"],
        &[("provider_id", &provider_id)],
        ResolvedEndpoint::post(format!(
            "/v1/providers/{}/launch",
            urlencoding::encode(&provider_id)
        )),
    );

    let response = client.request_raw(&launch, Some(&body)).await?;
    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            tracing::debug!(
                "Provider launch route answered {}, retrying via generic launch",
                response.status()
            );
            let generic = client.resolver().resolve_or(
                "tasks",
                &["launch_remote"],
                &[("task_id", &task.id)],
                ResolvedEndpoint::post(format!(
                    "/v1/tasks/{}/launch_remote",
                    urlencoding::encode(&task.id)
                )),
            );
            client.request_with_body(&generic, &body).await
        }
        _ => response::parse_json(response).await,
    }
}

async fn first_provider(client: &ApiClient) -> Result<String> {
    let available = providers::list(client).await?;
    available.first().map(|p| p.id.clone()).ok_or_else(|| {
        RetortError::Provider(
            "No compute providers are available. Register a provider before queueing remote tasks."
                .to_string(),
        )
    })
}

/// Merges override parameters into a launch command as `--key=value`
/// flags, replacing an existing flag for the same key and appending new
/// ones.
pub fn merge_command_overrides(command: &str, overrides: &[(String, String)]) -> String {
    let mut parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();

    for (key, value) in overrides {
        let prefix = format!("--{}=", key);
        let rendered = format!("--{}={}", key, value);
        match parts.iter_mut().find(|part| part.starts_with(&prefix)) {
            Some(existing) => *existing = rendered,
            None => parts.push(rendered),
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_replaces_existing_flag() {
        let merged = merge_command_overrides(
            "train --epochs=5 --lr=0.01",
            &overrides(&[("epochs", "10")]),
        );
        assert_eq!(merged, "train --epochs=10 --lr=0.01");
    }

    #[test]
    fn test_merge_appends_new_flag() {
        let merged =
            merge_command_overrides("train --epochs=5", &overrides(&[("batch_size", "64")]));
        assert_eq!(merged, "train --epochs=5 --batch_size=64");
    }

    #[test]
    fn test_merge_into_empty_command() {
        let merged = merge_command_overrides("", &overrides(&[("epochs", "3")]));
        assert_eq!(merged, "--epochs=3");
    }

    #[test]
    fn test_merge_without_overrides_is_identity() {
        assert_eq!(
            merge_command_overrides("train --epochs=5", &[]),
            "train --epochs=5"
        );
    }

    #[test]
    fn test_merge_does_not_confuse_prefix_keys() {
        // --lr must not match --lr_decay.
        let merged =
            merge_command_overrides("train --lr_decay=0.9", &overrides(&[("lr", "0.1")]));
        assert_eq!(merged, "train --lr_decay=0.9 --lr=0.1");
    }
}
