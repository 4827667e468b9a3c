// LogSift - util/error.rs
//
// Error types for directory listing, configuration and query building.
// Each wraps its underlying cause so `source()` chains reach the I/O or
// parse error that started it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure of a log query, before any HTTP mapping.
#[derive(Debug)]
pub enum LogSiftError {
    /// Log directory listing failed.
    Discovery(DiscoveryError),

    /// A query could not be built from the request parameters.
    Query(QueryError),
}

impl fmt::Display for LogSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Query(e) => write!(f, "Query error: {e}"),
        }
    }
}

impl std::error::Error for LogSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Query(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to listing the log directory.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The log directory does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The log directory path is not a directory.
    NotADirectory { path: PathBuf },

    /// Walkdir traversal error while reading directory entries.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log path '{}' is not a directory", path.display())
            }
            Self::Traversal { path, source } => {
                write!(f, "Error reading '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogSiftError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// `config.toml` could not be used.
#[derive(Debug)]
pub enum ConfigError {
    /// The file is not valid TOML for the expected shape.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value lies outside its accepted range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// The file exists but could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Cannot parse '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "'{field}' = {value} is outside {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Cannot read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors raised while turning request parameters into a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A pagination parameter was present but unusable.
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The query string itself could not be decoded.
    Malformed { detail: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid '{name}' parameter '{value}': {reason}"),
            Self::Malformed { detail } => write!(f, "Malformed query string: {detail}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for LogSiftError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}
