// LogSift - app/cache.rs
//
// Parsed-file cache shared across requests.
//
// Entries are keyed by path and tagged with the file stamp they were parsed
// from; a lookup with a different stamp misses, so an appended or rewritten
// file is always re-parsed. Cached slices are immutable and shared via Arc.

use crate::core::model::LogEntry;
use crate::platform::fs::{FileStamp, LogFile};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

struct CachedFile {
    stamp: FileStamp,
    entries: Arc<[LogEntry]>,
}

/// Thread-safe map from log file path to its parsed entries.
#[derive(Default)]
pub struct ParseCache {
    files: Mutex<HashMap<PathBuf, CachedFile>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock only means another request panicked mid-update; the
    /// map itself is still a valid cache.
    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, CachedFile>> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Entries parsed from `path` when it still has `stamp`.
    pub fn get(&self, path: &Path, stamp: &FileStamp) -> Option<Arc<[LogEntry]>> {
        let files = self.lock();
        files
            .get(path)
            .filter(|cached| cached.stamp == *stamp)
            .map(|cached| Arc::clone(&cached.entries))
    }

    pub fn insert(&self, path: PathBuf, stamp: FileStamp, entries: Arc<[LogEntry]>) {
        self.lock().insert(path, CachedFile { stamp, entries });
    }

    /// Drop every cached file that is no longer present in the directory.
    pub fn retain_listed(&self, listed: &[LogFile]) {
        let live: HashSet<&Path> = listed.iter().map(|f| f.path.as_path()).collect();
        let mut files = self.lock();
        let before = files.len();
        files.retain(|path, _| live.contains(path.as_path()));
        let evicted = before - files.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted cached log files no longer on disk");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
