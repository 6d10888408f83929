//! Command handlers.
//!
//! Each handler loads whatever local state it needs through `Context`, makes
//! at most one remote round trip (login makes a short fixed sequence) and
//! prints the result.

pub mod backend;
pub mod saas;
pub mod session;

use anyhow::Result;
use iamcli_core::{BackendClient, Config, SaasClient, SessionStore, SystemSelector};
use serde::Serialize;

pub struct Context {
    config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend_store(&self) -> SessionStore {
        SessionStore::new(self.config.backend_session_path())
    }

    pub fn saas_store(&self) -> SessionStore {
        SessionStore::new(self.config.saas_session_path())
    }

    pub fn selector(&self) -> SystemSelector {
        SystemSelector::new(self.config.selector_path())
    }

    /// The system chosen with `use`
    pub fn selected_system(&self) -> Result<String> {
        Ok(self.selector().read()?)
    }

    /// Backend client built from the saved session
    pub fn backend_client(&self) -> Result<BackendClient> {
        let credential = self.backend_store().read()?;
        Ok(BackendClient::new(
            &credential.host,
            credential.identity,
            self.config.overrides,
        )?)
    }

    /// SaaS client built from the saved session
    pub fn saas_client(&self) -> Result<SaasClient> {
        let credential = self.saas_store().read()?;
        Ok(SaasClient::new(
            &credential.host,
            credential.identity,
            self.config.overrides,
        )?)
    }
}

/// Print a response as indented JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
