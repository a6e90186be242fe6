use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::models::user::UserEntry;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("could not read users file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("users file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only view of the registered users, used as the default participant set.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    path: PathBuf,
}

impl UserDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Usernames, trimmed, sorted and de-duplicated. A missing file means no users yet.
    pub fn participants(&self) -> Result<Vec<String>, DirectoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "users file not found; no participants");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DirectoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let users: Vec<UserEntry> =
            serde_json::from_slice(&bytes).map_err(|source| DirectoryError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let names: BTreeSet<String> = users
            .into_iter()
            .map(|u| u.username.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(names.into_iter().collect())
    }
}
