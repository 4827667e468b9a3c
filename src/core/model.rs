// LogSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no HTTP
// dependencies. These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Log Entry
// =============================================================================

/// Which parsing branch produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryFormat {
    /// The line decoded as a JSON object.
    Json,
    /// The line went through the heuristic text extractors.
    #[default]
    Text,
}

/// One structured record derived from a single raw log line.
///
/// Entries are built once by the parser and never mutated afterwards.
/// Serialises to the camelCase shape the dashboard consumes; keys of a JSON
/// line that have no typed counterpart are carried in `extra` and emitted
/// alongside the typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Source log file stem (e.g. "audit", "events").
    pub log_type: String,

    /// Timestamp exactly as written in the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// `timestamp` parsed to UTC, when it could be parsed.
    #[serde(skip)]
    pub parsed_timestamp: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Derived from `user_agent` by the user-agent classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,

    /// Trailing `- {...}` payload: decoded JSON, or the raw trailing text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    /// Exception class name (exceptions log only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Top stack frame location (exceptions log only).
    #[serde(flatten)]
    pub location: Option<SourceLocation>,

    /// Original line text, always retained.
    pub raw: String,

    /// Remaining keys of a JSON line, re-emitted verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    pub format: EntryFormat,
}

impl LogEntry {
    /// A bare entry carrying only the raw line and its log type.
    pub fn unparsed(raw: &str, log_type: &str) -> Self {
        Self {
            log_type: log_type.to_string(),
            raw: raw.to_string(),
            ..Default::default()
        }
    }

    /// True when no extractor recognised anything in the line.
    pub fn is_unparsed(&self) -> bool {
        *self == Self::unparsed(&self.raw, &self.log_type)
    }

    /// Sort key used for newest-first ordering. Missing or unparseable
    /// timestamps map to the Unix epoch.
    pub fn sort_key(&self) -> i64 {
        self.parsed_timestamp
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(0)
    }

    /// Value reported in the `users` facet: email when known, else id.
    pub fn user_label(&self) -> Option<&str> {
        let user = self.user.as_ref()?;
        user.email.as_deref().or(user.id.as_deref())
    }
}

// =============================================================================
// Nested records
// =============================================================================

/// Partial identity of the user a line refers to. Any subset may be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Other members of a JSON `user` object, re-emitted unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Browser / OS / device class guessed from a user-agent string, or read
/// from a JSON line's `device` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// HTTP request line fragments found in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `file:line:column` of the first stack frame of an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

// =============================================================================
// Facets
// =============================================================================

/// Distinct values per filterable field, used to populate filter dropdowns.
///
/// Always computed over the unfiltered entry set of the selected files, so
/// it describes what exists in the data rather than what survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FacetSummary {
    pub log_types: Vec<String>,
    pub levels: Vec<String>,
    pub users: Vec<String>,
    pub ip_addresses: Vec<String>,
    pub devices: Vec<String>,
    pub browsers: Vec<String>,
    pub operating_systems: Vec<String>,
    pub actions: Vec<String>,
    pub entities: Vec<String>,
}

// =============================================================================
// Query result
// =============================================================================

/// One page of an aggregated query plus the counts and facets around it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Entries on the requested page, newest first.
    pub entries: Vec<LogEntry>,
    /// Number of entries across the selected files before filtering.
    pub total_entries: usize,
    /// Number of entries that passed every filter.
    pub filtered_count: usize,
    pub page: i64,
    pub total_pages: i64,
    pub facets: FacetSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unparsed_entry_only_serialises_raw_and_log_type() {
        let entry = LogEntry::unparsed("garbage", "errors");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "logType": "errors", "raw": "garbage" })
        );
        assert!(entry.is_unparsed());
    }

    #[test]
    fn test_entry_with_level_is_not_unparsed() {
        let entry = LogEntry {
            level: Some("info".into()),
            ..LogEntry::unparsed("x", "events")
        };
        assert!(!entry.is_unparsed());
    }

    #[test]
    fn test_location_flattens_into_entry() {
        let entry = LogEntry {
            error_type: Some("TypeError".into()),
            location: Some(SourceLocation {
                file: "/app/server.js".into(),
                line: 10,
                column: 5,
            }),
            ..LogEntry::unparsed("{}", "exceptions")
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["errorType"], "TypeError");
        assert_eq!(json["file"], "/app/server.js");
        assert_eq!(json["line"], 10);
        assert_eq!(json["column"], 5);
    }

    #[test]
    fn test_sort_key_defaults_to_epoch() {
        let mut entry = LogEntry::unparsed("x", "events");
        assert_eq!(entry.sort_key(), 0);
        entry.parsed_timestamp = Some(Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap());
        assert!(entry.sort_key() > 0);
    }

    #[test]
    fn test_user_label_prefers_email() {
        let mut entry = LogEntry::unparsed("x", "audit");
        entry.user = Some(UserInfo {
            id: Some("abc".into()),
            email: Some("a@b.co".into()),
            role: None,
            extra: Default::default(),
        });
        assert_eq!(entry.user_label(), Some("a@b.co"));
        entry.user = Some(UserInfo {
            id: Some("abc".into()),
            ..Default::default()
        });
        assert_eq!(entry.user_label(), Some("abc"));
    }
}
