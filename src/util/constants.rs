// LogSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogSift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logsift";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file name, looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Log directory
// =============================================================================

/// Extension that marks a file in the log directory as a log source.
/// The file stem becomes the entry's `logType`.
pub const LOG_FILE_EXTENSION: &str = ".log";

/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log type whose JSON lines get error-type and stack-location extraction.
pub const EXCEPTIONS_LOG_TYPE: &str = "exceptions";

/// Log type written in HTTP access-log style (morgan "combined").
pub const EVENTS_LOG_TYPE: &str = "events";

/// Log type written by the audit logger (`<entity> <action>` messages).
pub const AUDIT_LOG_TYPE: &str = "audit";

/// Entity assigned to `Auth <action>` audit lines.
pub const AUTH_ENTITY: &str = "auth";

/// Value reported for any user-agent facet that could not be recognised.
pub const UNKNOWN: &str = "Unknown";

// =============================================================================
// Query defaults
// =============================================================================

/// Page number used when the request omits `page`.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when neither the request nor config sets one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Smallest accepted `[logs] default_page_size`.
pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest accepted `[logs] default_page_size`.
pub const MAX_DEFAULT_PAGE_SIZE: i64 = 10_000;

/// Level filter value that disables level filtering.
pub const LEVEL_ALL: &str = "all";

// =============================================================================
// Server
// =============================================================================

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5080;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable request timeout in seconds.
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable request timeout in seconds.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// API root the log routes are nested under.
pub const API_PREFIX: &str = "/api/v1";

/// Message returned in the failure envelope when a query cannot be served.
pub const QUERY_FAILURE_MESSAGE: &str = "Error fetching consolidated logs";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
