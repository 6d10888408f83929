use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("please login first")]
    NotLoggedIn,

    #[error("credential of `{app_code}` for {host} expired at {expired_at}, please login again")]
    Expired {
        host: String,
        app_code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("credential is invalid ({0}), please login again")]
    Corrupt(String),

    #[error("please use system first")]
    NoSystemSelected,

    #[error("{0} must not contain ','")]
    InvalidField(&'static str),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the user has to run `login` again to recover.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            StoreError::NotLoggedIn | StoreError::Expired { .. } | StoreError::Corrupt(_)
        )
    }
}
