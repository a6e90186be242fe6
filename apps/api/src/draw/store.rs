//! Draw State Store: the single persisted draw record.
//!
//! Every write goes through `write_atomic`: the full record is written to a
//! temp file in the same directory, synced, and renamed over the canonical path, then the
//! directory is synced so the rename itself survives a power loss. A reader sees either
//! the old record or the new one, never a mix. Once the rename has landed the write counts
//! as committed; a failed directory sync after that point is logged, not returned.
//!
//! Load → decide → write is not isolated. Two concurrent writers (two draws, or a draw
//! racing a reset) each replace the file atomically and the last rename wins.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::draw::engine::AssignmentMap;
use crate::draw::errors::StoreError;
use crate::draw::exclusions::ExclusionPair;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub done: bool,
    pub assignments: AssignmentMap,
    /// Audit trail of every exclusion ever supplied to a committed draw, as `giver::receiver`
    /// tokens (see [`ExclusionPair::to_token`]).
    pub forbidden_pairs: BTreeSet<String>,
    #[serde(default)]
    pub drawn_at: Option<DateTime<Utc>>,
}

impl DrawRecord {
    /// Decodes the audit trail back into pairs, skipping malformed tokens.
    pub fn forbidden_pair_list(&self) -> Vec<ExclusionPair> {
        self.forbidden_pairs
            .iter()
            .filter_map(|t| ExclusionPair::from_token(t))
            .collect()
    }
}

#[derive(Debug)]
pub struct DrawStore {
    path: PathBuf,
    /// Where temp files are created. Always the canonical file's directory outside tests,
    /// so the final rename stays on one filesystem.
    staging_dir: PathBuf,
}

impl DrawStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let staging_dir = parent_of(&path);
        Self { path, staging_dir }
    }

    /// Stages writes somewhere else. Used to make writes fail while reads still succeed.
    #[cfg(test)]
    pub(crate) fn with_staging_dir(
        path: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            path: path.into(),
            staging_dir: staging_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current record, creating the initial undrawn record on first access.
    pub fn load(&self) -> Result<DrawRecord, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let record = DrawRecord::default();
                self.write_atomic(&record)?;
                info!(path = %self.path.display(), "initialized empty draw record");
                return Ok(record);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Marks the draw done with `assignments` and unions `exclusions` into the audit trail.
    pub fn commit_draw(
        &self,
        assignments: &AssignmentMap,
        exclusions: &[ExclusionPair],
    ) -> Result<DrawRecord, StoreError> {
        let mut record = self.load()?;
        record.done = true;
        record.assignments = assignments.clone();
        record
            .forbidden_pairs
            .extend(exclusions.iter().map(ExclusionPair::to_token));
        record.drawn_at = Some(Utc::now());

        self.write_atomic(&record)?;
        info!(
            participants = record.assignments.len(),
            forbidden_pairs = record.forbidden_pairs.len(),
            "draw committed"
        );
        Ok(record)
    }

    /// Back to undrawn. The exclusion audit trail is kept.
    pub fn reset(&self) -> Result<DrawRecord, StoreError> {
        let mut record = self.load()?;
        record.done = false;
        record.assignments.clear();
        record.drawn_at = None;

        self.write_atomic(&record)?;
        info!(
            forbidden_pairs = record.forbidden_pairs.len(),
            "draw reset"
        );
        Ok(record)
    }

    fn write_atomic(&self, record: &DrawRecord) -> Result<(), StoreError> {
        let staged = self.stage(record)?;
        self.publish(staged)
    }

    /// Writes `record` to a synced temp file beside the canonical path.
    /// The canonical file is untouched until [`Self::publish`].
    fn stage(&self, record: &DrawRecord) -> Result<NamedTempFile, StoreError> {
        let parent = self.staging_dir.clone();
        fs::create_dir_all(&parent).map_err(|source| StoreError::Io {
            path: parent.clone(),
            source,
        })?;

        let bytes = serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?;

        let io_err = |source| StoreError::Io {
            path: parent.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&parent).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        Ok(tmp)
    }

    fn publish(&self, staged: NamedTempFile) -> Result<(), StoreError> {
        staged
            .persist(&self.path)
            .map_err(|source| StoreError::Persist {
                path: self.path.clone(),
                source,
            })?;

        sync_dir_or_warn(&parent_of(&self.path));
        Ok(())
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Returns whether the directory sync succeeded. The rename is already visible either way.
fn sync_dir_or_warn(dir: &Path) -> bool {
    match fsync_dir(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "draw record renamed but directory sync failed");
            false
        }
    }
}

/// Makes a rename inside `dir` durable.
#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
