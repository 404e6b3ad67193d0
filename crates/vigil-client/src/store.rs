//! Durable fallback store for events that could not be delivered.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use vigil_core::Route;

/// One stored failed-event file.
///
/// The route is recovered from the filename prefix so replay can pick the
/// target without opening the file; `None` means the prefix was
/// unrecognized and the entry is left alone.
#[derive(Debug, Clone)]
pub struct StoredFailure {
    pub route: Option<Route>,
    pub path: PathBuf,
}

/// Flat directory of failed-event files named `<route>_<nanos>.json`.
///
/// Single-process, single-invocation access is assumed; there is no
/// cross-process locking. Nanosecond creation time is the collision guard.
#[derive(Clone)]
pub struct FailureStore {
    root: PathBuf,
}

impl FailureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists a serialized event under a route-prefixed, timestamped
    /// name. Directory creation is idempotent. Write failures are reported
    /// to the caller, never retried here.
    pub fn save<T>(&self, route: Route, event: &T) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create failure store {}", self.root.display()))?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock set before UNIX_EPOCH")?
            .as_nanos();
        let path = self
            .root
            .join(format!("{}_{}.json", route.file_prefix(), nanos));
        let bytes = serde_json::to_vec_pretty(event).context("serialize failed event")?;
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Enumerates every non-directory entry, oldest first. A missing store
    /// directory is an empty store, not an error.
    pub fn list_all(&self) -> Result<Vec<StoredFailure>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read failure store {}", self.root.display()))
            }
        };
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.context("read store entry")?;
            if entry.file_type().context("stat store entry")?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(StoredFailure {
                route: Route::from_file_name(&name),
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    pub fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("remove {}", path.display()))
    }
}
