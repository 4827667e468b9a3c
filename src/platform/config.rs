// LogSift - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogSift configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logsift/ or %APPDATA%\logsift\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => Self {
                config_dir: proj_dirs.config_dir().to_path_buf(),
            },
            None => Self {
                config_dir: PathBuf::from("."),
            },
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility. Numbers are
/// read wide and range-checked afterwards so one bad value only costs that
/// value, not the whole file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[logs]` section.
    pub logs: LogsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind host.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<i64>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<i64>,
}

/// `[logs]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LogsSection {
    /// Directory holding the `*.log` files.
    pub directory: Option<String>,
    /// Page size when a request omits `limit`.
    pub default_page_size: Option<i64>,
    /// Keep parsed files in memory between requests.
    pub cache: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Server --
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,

    // -- Logs --
    pub log_dir: PathBuf,
    pub default_page_size: i64,
    pub cache_enabled: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
            default_page_size: constants::DEFAULT_PAGE_SIZE,
            cache_enabled: true,
            log_level: None,
            log_file: None,
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

/// Load and validate config.toml at `path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. Tracing may not be initialised yet, so warnings are returned
/// for the caller to log.
///
/// When `required` is false (the default location), a missing file yields
/// defaults and an unreadable or unparseable file yields defaults plus a
/// warning. When `required` is true (an explicit `--config`), those cases
/// are errors.
pub fn load_config(path: &Path, required: bool) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings: Vec<String> = Vec::new();

    if !required && !path.exists() {
        return Ok((AppConfig::default(), warnings));
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if required => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) if required => {
            return Err(ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let config = validate(raw, &mut warnings);
    Ok((config, warnings))
}

/// Check each raw value against its allowed range, accumulating warnings.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Server: host --
    if let Some(host) = raw.server.host {
        if host.trim().is_empty() {
            warnings.push(out_of_range(
                "server.host",
                host,
                format!("a host name or address (default {})", constants::DEFAULT_HOST),
            ));
        } else {
            config.host = host;
        }
    }

    // -- Server: port --
    if let Some(port) = raw.server.port {
        match u16::try_from(port) {
            Ok(p) if p > 0 => config.port = p,
            _ => warnings.push(out_of_range(
                "server.port",
                port,
                format!("1-65535 (default {})", constants::DEFAULT_PORT),
            )),
        }
    }

    // -- Server: request_timeout_secs --
    if let Some(secs) = raw.server.request_timeout_secs {
        let range = constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS;
        match u64::try_from(secs) {
            Ok(s) if range.contains(&s) => config.request_timeout_secs = s,
            _ => warnings.push(out_of_range(
                "server.request_timeout_secs",
                secs,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_REQUEST_TIMEOUT_SECS,
                    constants::MAX_REQUEST_TIMEOUT_SECS,
                    constants::DEFAULT_REQUEST_TIMEOUT_SECS,
                ),
            )),
        }
    }

    // -- Logs: directory --
    if let Some(dir) = raw.logs.directory {
        if !dir.is_empty() {
            config.log_dir = PathBuf::from(dir);
        }
    }

    // -- Logs: default_page_size --
    if let Some(size) = raw.logs.default_page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_DEFAULT_PAGE_SIZE).contains(&size) {
            config.default_page_size = size;
        } else {
            warnings.push(out_of_range(
                "logs.default_page_size",
                size,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_PAGE_SIZE,
                    constants::MAX_DEFAULT_PAGE_SIZE,
                    constants::DEFAULT_PAGE_SIZE,
                ),
            ));
        }
    }

    // -- Logs: cache --
    if let Some(cache) = raw.logs.cache {
        config.cache_enabled = cache;
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                format!(
                    "one of {} (default {})",
                    constants::VALID_LOG_LEVELS.join(", "),
                    constants::DEFAULT_LOG_LEVEL,
                ),
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    config
}
