//! Command handlers, one module per resource.

pub mod auth;
pub mod config;
pub mod experiment;
pub mod gallery;
pub mod job;
pub mod provider;
pub mod task;
