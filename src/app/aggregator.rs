// LogSift - app/aggregator.rs
//
// Query orchestration over the log directory: list files, select by log
// type, read and parse each selected file, then hand the combined entry set
// to the core query pipeline.
//
// Failure policy:
//   - A directory that cannot be listed fails the whole query.
//   - A file that cannot be read is logged and skipped; the query still
//     succeeds with the remaining files.
//
// Files are parsed in parallel on the rayon pool. Parsing is a pure function
// of file content, so results only need merging in file-name order.

use crate::app::cache::ParseCache;
use crate::core::filter::FilterCriteria;
use crate::core::model::{LogEntry, QueryResult};
use crate::core::parser;
use crate::core::query::{self, PageRequest};
use crate::platform::fs::{self, LogFile};
use crate::util::error::LogSiftError;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Serves queries over every `.log` file in one directory.
pub struct LogAggregator {
    log_dir: PathBuf,
    cache: Option<ParseCache>,
}

impl LogAggregator {
    /// Files are re-read on every query unless `cache_enabled` is set, in
    /// which case unchanged files are served from memory.
    pub fn new(log_dir: impl Into<PathBuf>, cache_enabled: bool) -> Self {
        Self {
            log_dir: log_dir.into(),
            cache: cache_enabled.then(ParseCache::new),
        }
    }

    /// Number of files currently held in the parse cache.
    pub fn cached_files(&self) -> usize {
        self.cache.as_ref().map_or(0, ParseCache::len)
    }

    /// Run one query. Blocks on filesystem I/O.
    pub fn query(
        &self,
        criteria: &FilterCriteria,
        req: PageRequest,
    ) -> Result<QueryResult, LogSiftError> {
        let started = Instant::now();

        let files = fs::list_log_files(&self.log_dir).map_err(|e| {
            tracing::error!(dir = %self.log_dir.display(), error = %e, "Cannot list log directory");
            LogSiftError::from(e)
        })?;

        if let Some(cache) = &self.cache {
            cache.retain_listed(&files);
        }

        let selected: Vec<&LogFile> = match &criteria.log_type {
            Some(log_type) => files.iter().filter(|f| &f.log_type == log_type).collect(),
            None => files.iter().collect(),
        };

        if selected.is_empty() {
            tracing::debug!(
                log_type = ?criteria.log_type,
                available = files.len(),
                "No log files selected"
            );
            let available = files.into_iter().map(|f| f.log_type).collect();
            return Ok(query::empty_result(req.page, available));
        }

        let (all, files_read) = self.load_all(&selected);
        let result = query::build_result(all, criteria, req);

        tracing::debug!(
            files_selected = selected.len(),
            files_read,
            total = result.total_entries,
            filtered = result.filtered_count,
            returned = result.entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );

        Ok(result)
    }

    /// Entries of every readable file in `selected`, concatenated in list
    /// order, plus the number of files that were read.
    fn load_all(&self, selected: &[&LogFile]) -> (Vec<LogEntry>, usize) {
        let parsed: Vec<Option<Arc<[LogEntry]>>> =
            selected.par_iter().map(|file| self.load(file)).collect();

        let files_read = parsed.iter().flatten().count();
        let all = parsed
            .iter()
            .flatten()
            .flat_map(|entries| entries.iter().cloned())
            .collect();
        (all, files_read)
    }

    /// Parsed entries of one file, or `None` if it could not be read.
    fn load(&self, file: &LogFile) -> Option<Arc<[LogEntry]>> {
        let Some(cache) = &self.cache else {
            return self.read_and_parse(file);
        };

        // Stamp before reading: if the file changes mid-read, the next query
        // sees a newer stamp and re-parses.
        let stamp = match fs::file_stamp(&file.path) {
            Ok(stamp) => stamp,
            Err(e) => {
                tracing::warn!(file = %file.path.display(), error = %e, "File stat failed");
                return None;
            }
        };

        if let Some(entries) = cache.get(&file.path, &stamp) {
            return Some(entries);
        }

        let entries = self.read_and_parse(file)?;
        cache.insert(file.path.clone(), stamp, Arc::clone(&entries));
        Some(entries)
    }

    fn read_and_parse(&self, file: &LogFile) -> Option<Arc<[LogEntry]>> {
        match fs::read_log_file(&file.path) {
            Ok(content) => Some(parser::parse_content(&content, &file.log_type).into()),
            Err(e) => {
                tracing::warn!(file = %file.path.display(), error = %e, "File read failed");
                None
            }
        }
    }
}
