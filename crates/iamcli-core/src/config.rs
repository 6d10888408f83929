//! Process configuration.
//!
//! Everything here is read once from the environment when a command starts.
//! Clients receive the resulting values explicitly, so tests can build any
//! combination without touching real environment variables.
//!
//! Local state lives in the state directory, which defaults to the current
//! working directory and can be moved with `IAMCLI_STATE_DIR`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::api::Overrides;

/// Backend session file name
const BACKEND_SESSION_FILE: &str = ".credential";

/// SaaS session file name
const SAAS_SESSION_FILE: &str = ".saas-credential";

/// Active system selector file name
const SELECTOR_FILE: &str = ".use";

/// Environment variable overriding the state directory
const STATE_DIR_ENV: &str = "IAMCLI_STATE_DIR";

const DEBUG_ENV: [&str; 2] = ["IAM_API_DEBUG", "BKAPP_IAM_API_DEBUG"];
const FORCE_ENV: [&str; 2] = ["IAM_API_FORCE", "BKAPP_IAM_API_FORCE"];

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub overrides: Overrides,
}

impl Config {
    pub fn new(state_dir: impl Into<PathBuf>, overrides: Overrides) -> Self {
        Self {
            state_dir: state_dir.into(),
            overrides,
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let state_dir = match std::env::var_os(STATE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().context("Could not determine current directory")?,
        };

        let overrides = Overrides {
            debug: any_enabled(&DEBUG_ENV, |key| std::env::var(key).ok()),
            force: any_enabled(&FORCE_ENV, |key| std::env::var(key).ok()),
        };

        Ok(Self::new(state_dir, overrides))
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn backend_session_path(&self) -> PathBuf {
        self.state_dir.join(BACKEND_SESSION_FILE)
    }

    pub fn saas_session_path(&self) -> PathBuf {
        self.state_dir.join(SAAS_SESSION_FILE)
    }

    pub fn selector_path(&self) -> PathBuf {
        self.state_dir.join(SELECTOR_FILE)
    }
}

/// A toggle is on when any of its variables is exactly `true`.
fn any_enabled(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> bool {
    keys.iter().any(|key| lookup(key).as_deref() == Some("true"))
}
