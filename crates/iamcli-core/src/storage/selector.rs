use std::path::{Path, PathBuf};

use tracing::debug;

use super::StoreError;

/// The system that scoped queries run against, stored as plain text.
pub struct SystemSelector {
    path: PathBuf,
}

impl SystemSelector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, system: &str) -> Result<(), StoreError> {
        std::fs::write(&self.path, system).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(system = system, "Active system changed");
        Ok(())
    }

    pub fn read(&self) -> Result<String, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NoSystemSelected)
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let system = contents.trim();
        if system.is_empty() {
            return Err(StoreError::NoSystemSelected);
        }
        Ok(system.to_string())
    }

    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}
