use std::path::PathBuf;

use thiserror::Error;

/// Failures of the on-disk draw record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("draw record at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize draw record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("could not replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Outcome taxonomy of a draw. A malformed exclusion line is never an error.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("at least two participants are required, got {count}")]
    InsufficientParticipants { count: usize },

    #[error("no valid assignment found after {attempts} attempts; the exclusions may be too tight")]
    NoFeasibleAssignment { attempts: u32 },

    #[error("draw state could not be persisted: {0}")]
    Persistence(#[from] StoreError),

    #[error("participant directory unavailable: {0}")]
    Directory(#[from] crate::directory::DirectoryError),
}
