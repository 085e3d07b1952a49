//! Snapshot persistence.
//!
//! The entire trainer state lives in one JSON file: scheduler parameters,
//! both card pools, and the full review history. Writes go through a
//! temp-file rename so a crash mid-write never leaves a torn snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TrainerError, TrainerResult};
use crate::types::{Card, ReviewLog};

/// The persisted form of the trainer state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Active scheduler parameter vector; empty means algorithm defaults.
    #[serde(default)]
    pub scheduler_parameters: Vec<f32>,
    #[serde(default)]
    pub new_cards: Vec<Card>,
    #[serde(default)]
    pub existing_cards: Vec<Card>,
    #[serde(default)]
    pub review_logs: Vec<ReviewLog>,
}

/// Reads and writes snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. A missing file is a fresh start, not an error;
    /// a file that exists but fails to parse is.
    pub fn load(&self) -> TrainerResult<Snapshot> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {}, starting fresh", self.path.display());
                return Ok(Snapshot::default());
            }
            Err(err) => {
                return Err(TrainerError::persistence_source(
                    format!("failed to read snapshot at {}", self.path.display()),
                    err,
                ))
            }
        };
        serde_json::from_slice(&data).map_err(|err| {
            TrainerError::persistence_source(
                format!("snapshot at {} is corrupted", self.path.display()),
                err,
            )
        })
    }

    /// Write the snapshot atomically: serialize to a sibling `.tmp` file,
    /// then rename over the destination.
    pub fn save(&self, snapshot: &Snapshot) -> TrainerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    TrainerError::persistence_source(
                        format!("failed to create snapshot dir {}", parent.display()),
                        err,
                    )
                })?;
            }
        }

        let data = serde_json::to_vec(snapshot).map_err(|err| {
            TrainerError::persistence_source("failed to serialize snapshot", err)
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &data).map_err(|err| {
            TrainerError::persistence_source(
                format!("failed to write snapshot temp file {}", tmp.display()),
                err,
            )
        })?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            TrainerError::persistence_source(
                format!("failed to move snapshot into place at {}", self.path.display()),
                err,
            )
        })?;
        debug!(
            "snapshot saved: {} existing, {} new, {} logs",
            snapshot.existing_cards.len(),
            snapshot.new_cards.len(),
            snapshot.review_logs.len()
        );
        Ok(())
    }
}
