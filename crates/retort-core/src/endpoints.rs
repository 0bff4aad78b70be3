//! Declarative endpoint map and resolution.
//!
//! Server routes live in a bundled JSON document (`endpoints.json`) mapping
//! resource names to nested actions, each with a method and a path template
//! containing `{param}` placeholders. Resolution is strict and returns a
//! [`ResolveError`] when the map and the call disagree; [`EndpointResolver::resolve_or`]
//! is the recovering variant every operation uses, degrading to the caller's
//! best-known literal route so a stale map never breaks a command.
//!
//! Known-bad map entries are corrected by an override table consulted before
//! the map. Precedence: override table, then map, then literal fallback.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

const BUNDLED_MAP: &str = include_str!("endpoints.json");

/// Corrections for map entries that drifted from the live server routes.
///
/// Keyed by `resource:action` (nested actions joined with dots). These stay
/// until the bundled map is regenerated against a current server.
const BUILTIN_OVERRIDES: &[(&str, HttpMethod, &str)] = &[
    ("jobs:stream", HttpMethod::Get, "/v1/jobs/{job_id}/logs/stream"),
    ("gallery:import", HttpMethod::Post, "/v1/gallery/{entry_id}/import"),
];

/// HTTP method of an endpoint, as spelled in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A single endpoint entry in the map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointSpec {
    pub method: HttpMethod,
    pub path: String,
}

/// A node in the map: either an endpoint or a nested group of actions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EndpointNode {
    Endpoint(EndpointSpec),
    Group(BTreeMap<String, EndpointNode>),
}

/// The full resource map, parsed once per process.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointMap {
    #[serde(flatten)]
    resources: BTreeMap<String, EndpointNode>,
}

impl EndpointMap {
    /// Parses the map bundled with this build.
    pub fn bundled() -> Result<EndpointMap> {
        Ok(serde_json::from_str(BUNDLED_MAP)?)
    }
}

/// Why an endpoint could not be resolved from the map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown action '{action}' for resource '{resource}'")]
    UnknownAction { resource: String, action: String },

    #[error("'{resource}:{action}' is a group, not an endpoint")]
    NotAnEndpoint { resource: String, action: String },

    #[error("no value for '{{{param}}}' in '{template}'")]
    MissingParam { param: String, template: String },
}

/// A fully resolved route: concrete method and path, ready to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub method: HttpMethod,
    pub path: String,
}

impl ResolvedEndpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }
}

/// One route as listed by [`EndpointResolver::routes`].
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// `resource:action` key, nested actions joined with dots.
    pub key: String,
    pub method: HttpMethod,
    pub path: String,
    /// Whether the override table supplied this route.
    pub overridden: bool,
}

/// Resolves `(resource, action, params)` triples against a map and an
/// override table.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    map: EndpointMap,
    overrides: BTreeMap<String, EndpointSpec>,
}

impl EndpointResolver {
    /// Resolver over the bundled map and built-in overrides.
    pub fn bundled() -> Result<EndpointResolver> {
        let overrides = BUILTIN_OVERRIDES
            .iter()
            .map(|(key, method, path)| {
                (
                    key.to_string(),
                    EndpointSpec {
                        method: *method,
                        path: path.to_string(),
                    },
                )
            })
            .collect();
        Ok(EndpointResolver::new(EndpointMap::bundled()?, overrides))
    }

    /// Resolver over an externally supplied map and override table, keyed
    /// by `resource:action`.
    pub fn new(map: EndpointMap, overrides: BTreeMap<String, EndpointSpec>) -> Self {
        Self { map, overrides }
    }

    /// Resolves an endpoint, substituting `{param}` placeholders from
    /// `params`.
    ///
    /// Parameter values are percent-encoded into the path. A placeholder
    /// with no matching entry in `params` fails with
    /// [`ResolveError::MissingParam`] rather than leaking the literal token
    /// into the URL; extra entries in `params` are ignored.
    pub fn resolve(
        &self,
        resource: &str,
        action: &[&str],
        params: &[(&str, &str)],
    ) -> std::result::Result<ResolvedEndpoint, ResolveError> {
        let key = route_key(resource, action);
        let spec = match self.overrides.get(&key) {
            Some(spec) => spec,
            None => self.lookup(resource, action)?,
        };

        let path = substitute(&spec.path, params)?;
        Ok(ResolvedEndpoint::new(spec.method, path))
    }

    /// Resolves an endpoint, falling back to `fallback` when the map cannot
    /// answer.
    ///
    /// This never fails: the fallback is the caller's best-known literal
    /// route and is returned exactly as given. The bundled map drifts out of
    /// sync with live servers, and a drifted map must degrade commands, not
    /// break them.
    pub fn resolve_or(
        &self,
        resource: &str,
        action: &[&str],
        params: &[(&str, &str)],
        fallback: ResolvedEndpoint,
    ) -> ResolvedEndpoint {
        match self.resolve(resource, action, params) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(
                    "Endpoint map could not resolve {}: {}; using {} {}",
                    route_key(resource, action),
                    e,
                    fallback.method,
                    fallback.path
                );
                fallback
            }
        }
    }

    /// All routes this resolver knows, in key order, with override entries
    /// applied and appended.
    pub fn routes(&self) -> Vec<RouteEntry> {
        let mut entries = Vec::new();
        for (resource, node) in &self.map.resources {
            collect_routes(resource, &[], node, &self.overrides, &mut entries);
        }

        // Overrides for routes absent from the map still resolve, list them too.
        for (key, spec) in &self.overrides {
            if !entries.iter().any(|e| &e.key == key) {
                entries.push(RouteEntry {
                    key: key.clone(),
                    method: spec.method,
                    path: spec.path.clone(),
                    overridden: true,
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    fn lookup(
        &self,
        resource: &str,
        action: &[&str],
    ) -> std::result::Result<&EndpointSpec, ResolveError> {
        let mut node = self
            .map
            .resources
            .get(resource)
            .ok_or_else(|| ResolveError::UnknownResource(resource.to_string()))?;

        for segment in action {
            node = match node {
                EndpointNode::Group(children) => {
                    children
                        .get(*segment)
                        .ok_or_else(|| ResolveError::UnknownAction {
                            resource: resource.to_string(),
                            action: action.join("."),
                        })?
                }
                EndpointNode::Endpoint(_) => {
                    return Err(ResolveError::UnknownAction {
                        resource: resource.to_string(),
                        action: action.join("."),
                    });
                }
            };
        }

        match node {
            EndpointNode::Endpoint(spec) => Ok(spec),
            EndpointNode::Group(_) => Err(ResolveError::NotAnEndpoint {
                resource: resource.to_string(),
                action: action.join("."),
            }),
        }
    }
}

fn route_key(resource: &str, action: &[&str]) -> String {
    format!("{}:{}", resource, action.join("."))
}

fn collect_routes(
    resource: &str,
    action: &[&str],
    node: &EndpointNode,
    overrides: &BTreeMap<String, EndpointSpec>,
    entries: &mut Vec<RouteEntry>,
) {
    match node {
        EndpointNode::Endpoint(spec) => {
            let key = route_key(resource, action);
            let (method, path, overridden) = match overrides.get(&key) {
                Some(over) => (over.method, over.path.clone(), true),
                None => (spec.method, spec.path.clone(), false),
            };
            entries.push(RouteEntry {
                key,
                method,
                path,
                overridden,
            });
        }
        EndpointNode::Group(children) => {
            for (name, child) in children {
                let mut nested: Vec<&str> = action.to_vec();
                nested.push(name);
                collect_routes(resource, &nested, child, overrides, entries);
            }
        }
    }
}

/// Replaces each `{name}` placeholder in `template` with the matching
/// percent-encoded value from `params`.
fn substitute(
    template: &str,
    params: &[(&str, &str)],
) -> std::result::Result<String, ResolveError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}').map(|i| start + i) else {
            // Unbalanced brace; keep the tail verbatim.
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 1..end];
        let Some((_, value)) = params.iter().find(|(key, _)| *key == name) else {
            return Err(ResolveError::MissingParam {
                param: name.to_string(),
                template: template.to_string(),
            });
        };
        out.push_str(&urlencoding::encode(value));
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> EndpointResolver {
        EndpointResolver::bundled().unwrap()
    }

    #[test]
    fn test_bundled_map_parses() {
        assert!(!resolver().routes().is_empty());
    }

    #[test]
    fn test_resolve_substitutes_params() {
        let route = resolver()
            .resolve("tasks", &["get"], &[("task_id", "t-42")])
            .unwrap();
        assert_eq!(route.method, HttpMethod::Get);
        assert_eq!(route.path, "/v1/tasks/t-42");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let r = resolver();
        let first = r.resolve("jobs", &["get"], &[("job_id", "j1")]).unwrap();
        let second = r.resolve("jobs", &["get"], &[("job_id", "j1")]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_nested_action() {
        let route = resolver()
            .resolve(
                "jobs",
                &["artifacts", "download"],
                &[("job_id", "j1"), ("artifact_id", "a1")],
            )
            .unwrap();
        assert_eq!(route.path, "/v1/jobs/j1/artifacts/a1");
    }

    #[test]
    fn test_param_values_are_percent_encoded() {
        let route = resolver()
            .resolve("jobs", &["list"], &[("experiment_id", "exp 1")])
            .unwrap();
        assert_eq!(route.path, "/v1/experiments/exp%201/jobs");
    }

    #[test]
    fn test_extra_params_are_ignored() {
        let route = resolver()
            .resolve("tasks", &["list"], &[("task_id", "unused")])
            .unwrap();
        assert_eq!(route.path, "/v1/tasks");
    }

    #[test]
    fn test_unknown_resource() {
        let err = resolver().resolve("models", &["list"], &[]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownResource("models".to_string()));
    }

    #[test]
    fn test_unknown_action() {
        let err = resolver().resolve("tasks", &["archive"], &[]).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownAction { .. }));
    }

    #[test]
    fn test_group_is_not_an_endpoint() {
        let err = resolver().resolve("jobs", &["artifacts"], &[]).unwrap_err();
        assert!(matches!(err, ResolveError::NotAnEndpoint { .. }));
    }

    #[test]
    fn test_missing_param_fails_fast() {
        let err = resolver().resolve("tasks", &["get"], &[]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingParam {
                param: "task_id".to_string(),
                template: "/v1/tasks/{task_id}".to_string(),
            }
        );
    }

    #[test]
    fn test_override_beats_map() {
        // The bundled map still carries the retired /output route.
        let route = resolver()
            .resolve("jobs", &["stream"], &[("job_id", "j1")])
            .unwrap();
        assert_eq!(route.path, "/v1/jobs/j1/logs/stream");
    }

    #[test]
    fn test_override_substitutes_params() {
        let route = resolver()
            .resolve("gallery", &["import"], &[("entry_id", "g1")])
            .unwrap();
        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.path, "/v1/gallery/g1/import");
    }

    #[test]
    fn test_resolve_or_returns_exact_fallback_when_unknown() {
        let fallback = ResolvedEndpoint::post("/v1/tasks/t1/launch_remote");
        let route = resolver().resolve_or(
            "tasks",
            &["launch_remote"],
            &[("task_id", "t1")],
            fallback.clone(),
        );
        assert_eq!(route, fallback);
    }

    #[test]
    fn test_resolve_or_prefers_map_when_known() {
        let route = resolver().resolve_or(
            "tasks",
            &["list"],
            &[],
            ResolvedEndpoint::get("/legacy/tasks"),
        );
        assert_eq!(route.path, "/v1/tasks");
    }

    #[test]
    fn test_resolve_or_recovers_missing_param() {
        let fallback = ResolvedEndpoint::get("/v1/tasks/known-id");
        let route = resolver().resolve_or("tasks", &["get"], &[], fallback.clone());
        assert_eq!(route, fallback);
    }

    #[test]
    fn test_routes_lists_overrides() {
        let routes = resolver().routes();
        let stream = routes.iter().find(|r| r.key == "jobs:stream").unwrap();
        assert!(stream.overridden);
        assert_eq!(stream.path, "/v1/jobs/{job_id}/logs/stream");

        let list = routes.iter().find(|r| r.key == "tasks:list").unwrap();
        assert!(!list.overridden);
    }

    #[test]
    fn test_routes_are_sorted() {
        let routes = resolver().routes();
        let keys: Vec<_> = routes.iter().map(|r| r.key.clone()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_unbalanced_brace_is_kept_verbatim() {
        let out = substitute("/v1/tasks/{task_id", &[("task_id", "x")]).unwrap();
        assert_eq!(out, "/v1/tasks/{task_id");
    }
}
