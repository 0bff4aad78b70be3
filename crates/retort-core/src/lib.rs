//! Retort Core Library
//!
//! Endpoint resolution, credential storage, and the authenticated API client
//! for the Retort experiment platform.

pub mod api;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod paths;
pub mod response;
pub mod settings;
pub mod target;

pub use client::ApiClient;
pub use credentials::{CredentialStore, Credentials};
pub use error::{Result, RetortError};
pub use target::Target;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
