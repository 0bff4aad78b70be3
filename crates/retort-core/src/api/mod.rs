//! Typed operations over the Retort REST API, one module per resource.
//!
//! Every operation resolves its route through the endpoint map with a
//! literal fallback matching the best-known current server route, then
//! issues the call through [`crate::ApiClient`].

pub mod auth;
pub mod experiments;
pub mod gallery;
pub mod jobs;
pub mod providers;
pub mod tasks;
