// LogSift - platform/fs.rs
//
// Log directory listing and file reads.
//
// Only the immediate children of the log directory are considered; the
// directory is never recursed. Contents are decoded lossily so a file that
// is mid-append (possibly ending in a partial UTF-8 sequence) always reads.

use crate::util::constants::LOG_FILE_EXTENSION;
use crate::util::error::DiscoveryError;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Retry limits for transient I/O errors.
const MAX_RETRIES: usize = 3;
const RETRY_DELAYS_MS: [u64; MAX_RETRIES] = [50, 100, 200];

/// A `.log` file in the log directory and the log type it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    /// File name without the `.log` extension, e.g. "audit".
    pub log_type: String,
}

/// Identity of a file's content at one point in time.
///
/// Two equal stamps are assumed to describe identical content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Log type encoded in a file name, or `None` if it is not a log file.
pub fn log_type_of(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(LOG_FILE_EXTENSION)
}

/// List the `.log` files directly inside `dir`, sorted by file name.
///
/// A missing or non-directory `dir` is an error. Entries that cannot be
/// inspected are logged and skipped.
pub fn list_log_files(dir: &Path) -> Result<Vec<LogFile>, DiscoveryError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: dir.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: dir.to_path_buf(),
            })
        }
    }

    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(DiscoveryError::Traversal {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-UTF-8 file name");
            continue;
        };

        if let Some(log_type) = log_type_of(file_name) {
            files.push(LogFile {
                path: entry.path().to_path_buf(),
                log_type: log_type.to_string(),
            });
        }
    }

    Ok(files)
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a log file, retrying transient I/O errors with a short backoff.
///
/// Blocks the calling thread while backing off; call from a blocking context.
pub fn read_log_file(path: &Path) -> io::Result<String> {
    read_with_retry(path, read_file_lossy, std::thread::sleep)
}

/// Retry loop behind `read_log_file`. No pause follows the final attempt.
fn read_with_retry(
    path: &Path,
    mut read: impl FnMut(&Path) -> io::Result<String>,
    mut pause: impl FnMut(Duration),
) -> io::Result<String> {
    let mut last_err: Option<io::Error> = None;

    for (attempt, delay_ms) in RETRY_DELAYS_MS.iter().enumerate() {
        match read(path) {
            Ok(content) => return Ok(content),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error"
                );
                if attempt + 1 < MAX_RETRIES {
                    pause(Duration::from_millis(*delay_ms));
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

/// Current stamp of `path`.
pub fn file_stamp(path: &Path) -> io::Result<FileStamp> {
    let meta = std::fs::metadata(path)?;
    Ok(FileStamp {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}
