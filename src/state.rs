//! Persisted baseline/last snapshots
//!
//! Snapshots are stored as pretty-printed JSON under a state directory,
//! one file per snapshot name. Writes go through a temp file in the same
//! directory followed by a rename, so a reader never observes a partial
//! snapshot and an interrupted run leaves the previous one intact.
//! Serialization is deterministic (serde struct field order), which makes
//! repeated saves of the same snapshot byte-identical.

use crate::finding::RunSnapshot;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Name of the accepted reference snapshot.
pub const BASELINE: &str = "baseline";

/// Name of the most recent run's snapshot.
pub const LAST: &str = "last";

/// Errors that can occur while loading or saving snapshots
#[derive(Error, Debug)]
pub enum StateError {
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("snapshot {name} is not valid JSON: {source}")]
    Corrupt {
        name: String,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for state store operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Durable storage for named snapshots.
///
/// The session controller only talks to this trait, so tests run against
/// [`MemoryStateStore`] instead of touching the filesystem.
pub trait StateStore {
    /// Load the named snapshot, failing with [`StateError::SnapshotNotFound`]
    /// when it does not exist.
    fn load(&self, name: &str) -> Result<RunSnapshot>;

    /// Persist the snapshot under the given name, creating missing parent
    /// directories first.
    fn save(&mut self, name: &str, snapshot: &RunSnapshot) -> Result<()>;

    /// Whether the named snapshot exists.
    fn exists(&self, name: &str) -> bool;

    /// Human-readable location of the named snapshot, for reporting.
    fn describe(&self, name: &str) -> String;
}

/// Filesystem-backed store: `<dir>/<name>.json` per snapshot.
#[derive(Debug, Clone)]
pub struct FsStateStore {
    dir: PathBuf,
}

impl FsStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl StateStore for FsStateStore {
    fn load(&self, name: &str) -> Result<RunSnapshot> {
        let path = self.snapshot_path(name);
        if !path.exists() {
            return Err(StateError::SnapshotNotFound(name.to_string()));
        }
        tracing::debug!(name, path = %path.display(), "loading snapshot");
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| StateError::Corrupt {
            name: name.to_string(),
            source,
        })
    }

    fn save(&mut self, name: &str, snapshot: &RunSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.snapshot_path(name);
        tracing::debug!(name, path = %path.display(), "saving snapshot");

        let json = serialize_snapshot(snapshot)?;
        // Temp file in the target directory keeps the rename on one
        // filesystem, which is what makes it atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| StateError::Io(e.error))?;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.snapshot_path(name).exists()
    }

    fn describe(&self, name: &str) -> String {
        self.snapshot_path(name).display().to_string()
    }
}

/// In-memory store for unit tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    snapshots: HashMap<String, RunSnapshot>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, name: &str) -> Result<RunSnapshot> {
        self.snapshots
            .get(name)
            .cloned()
            .ok_or_else(|| StateError::SnapshotNotFound(name.to_string()))
    }

    fn save(&mut self, name: &str, snapshot: &RunSnapshot) -> Result<()> {
        self.snapshots.insert(name.to_string(), snapshot.clone());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.snapshots.contains_key(name)
    }

    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Deterministic JSON rendering of a snapshot, newline-terminated.
fn serialize_snapshot(snapshot: &RunSnapshot) -> Result<String> {
    let mut json = serde_json::to_string_pretty(snapshot).map_err(std::io::Error::from)?;
    json.push('\n');
    Ok(json)
}
