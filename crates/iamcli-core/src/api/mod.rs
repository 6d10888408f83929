//! Remote API clients for the IAM backend and the IAM SaaS.
//!
//! Every remote operation goes through the `CallEngine`, which sends one
//! request, unwraps the `{code, message, data}` envelope and logs a redacted
//! `curl` replay of the request. `BackendClient` authenticates with app
//! code/secret headers, `SaasClient` with basic auth; both implement
//! `ServiceClient`.

pub mod auth;
pub mod backend;
pub mod client;
pub mod dump;
pub mod envelope;
pub mod error;
pub mod saas;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{BackendClient, PolicyListQuery, PolicyQuery, SubjectType};
pub use client::{JsonObject, ServiceClient};
pub use envelope::{CallEngine, Method, Overrides, Params};
pub use error::ApiError;
pub use saas::SaasClient;
