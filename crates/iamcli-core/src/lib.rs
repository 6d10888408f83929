//! Core library for iamcli.
//!
//! Provides the pieces every command is built from:
//!
//! - `crypto`: the fixed-key cipher that obscures session files at rest
//! - `storage`: the encrypted session store and the active system selector
//! - `api`: the call envelope engine and the backend/SaaS service clients
//! - `config`: process configuration read once from the environment

pub mod api;
pub mod config;
pub mod crypto;
pub mod storage;

pub use api::{ApiError, BackendClient, Overrides, SaasClient, ServiceClient};
pub use config::Config;
pub use storage::{AppIdentity, SessionCredential, SessionStore, StoreError, SystemSelector};
