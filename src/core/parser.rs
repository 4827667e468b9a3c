// LogSift - core/parser.rs
//
// Turns raw log lines into `LogEntry` values.
// Core layer: works on in-memory text, never touches the filesystem.
//
// A line is either a JSON object (structured branch) or free text
// (heuristic branch driven by the rule tables in `core::rules`). The
// parser is total: every input string yields an entry.

use crate::core::model::{DeviceInfo, EntryFormat, LogEntry, RequestInfo, UserInfo};
use crate::core::rules::{self, first_match};
use crate::core::user_agent;
use crate::util::constants::{AUDIT_LOG_TYPE, EVENTS_LOG_TYPE, EXCEPTIONS_LOG_TYPE};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Shape of a raw line, decided before any field extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// The line is a JSON object.
    Json(Map<String, Value>),
    /// Anything else, handled by the heuristic extractors.
    Heuristic,
}

impl ParsedLine {
    /// Strict JSON decode; only objects count as structured lines.
    pub fn classify(line: &str) -> Self {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Self::Json(map),
            _ => Self::Heuristic,
        }
    }
}

/// Parse every non-blank line of a file's content.
///
/// Lines are split on `\n` with a trailing `\r` removed, so CRLF files and
/// a partially written final line are both handled.
pub fn parse_content(content: &str, log_type: &str) -> Vec<LogEntry> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_line(line, log_type))
        .collect()
}

/// Parse one raw line into an entry tagged with `log_type`.
pub fn parse_line(line: &str, log_type: &str) -> LogEntry {
    match ParsedLine::classify(line) {
        ParsedLine::Json(map) => from_json(map, line, log_type),
        ParsedLine::Heuristic => from_text(line, log_type),
    }
}

// =============================================================================
// Structured branch
// =============================================================================

/// Remove `key` from `map` when it holds a string.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Remove `key` from `map` when it converts to `T` without losing anything.
///
/// Values that would not re-serialise identically stay in the map, so they
/// are still emitted verbatim.
fn take_typed<T: DeserializeOwned + Serialize>(
    map: &mut Map<String, Value>,
    key: &str,
) -> Option<T> {
    let value = map.get(key)?;
    let typed: T = serde_json::from_value(value.clone()).ok()?;
    if serde_json::to_value(&typed).ok()? != *value {
        return None;
    }
    map.remove(key);
    Some(typed)
}

/// Remove a `user` object, lifting its string `id`, `email` and `role`.
/// Every other member stays on the record so the object is re-emitted as
/// written.
fn take_user(map: &mut Map<String, Value>) -> Option<UserInfo> {
    if !map.get("user").is_some_and(Value::is_object) {
        return None;
    }
    let Some(Value::Object(mut fields)) = map.remove("user") else {
        return None;
    };
    Some(UserInfo {
        id: take_string(&mut fields, "id"),
        email: take_string(&mut fields, "email"),
        role: take_string(&mut fields, "role"),
        extra: fields,
    })
}

/// Remove a `device` object whose `browser`, `os` and `device` members are
/// all strings. Other members ride along unchanged.
fn take_device(map: &mut Map<String, Value>) -> Option<DeviceInfo> {
    let Some(Value::Object(fields)) = map.get("device") else {
        return None;
    };
    if !["browser", "os", "device"]
        .iter()
        .all(|key| fields.get(*key).is_some_and(Value::is_string))
    {
        return None;
    }
    let Some(Value::Object(mut fields)) = map.remove("device") else {
        return None;
    };
    Some(DeviceInfo {
        browser: take_string(&mut fields, "browser").unwrap_or_default(),
        os: take_string(&mut fields, "os").unwrap_or_default(),
        device: take_string(&mut fields, "device").unwrap_or_default(),
        extra: fields,
    })
}

fn from_json(mut map: Map<String, Value>, line: &str, log_type: &str) -> LogEntry {
    map.remove("logType");
    map.remove("raw");

    let timestamp = take_string(&mut map, "timestamp");
    let message = take_string(&mut map, "message");

    let mut entry = LogEntry {
        log_type: log_type.to_string(),
        parsed_timestamp: timestamp.as_deref().and_then(parse_timestamp),
        timestamp,
        level: take_string(&mut map, "level"),
        user: take_user(&mut map),
        ip_address: take_string(&mut map, "ipAddress"),
        user_agent: take_string(&mut map, "userAgent"),
        device: take_device(&mut map),
        action: take_string(&mut map, "action"),
        entity: take_string(&mut map, "entity"),
        status_code: take_typed::<u16>(&mut map, "statusCode"),
        request: take_typed::<RequestInfo>(&mut map, "request"),
        metadata: map.remove("metadata"),
        changes: map.remove("changes"),
        details: map.remove("details"),
        error_type: take_string(&mut map, "errorType"),
        raw: line.to_string(),
        format: EntryFormat::Json,
        ..Default::default()
    };

    if log_type == EXCEPTIONS_LOG_TYPE {
        if let Some(error_type) = message.as_deref().and_then(rules::error_type) {
            map.remove("errorType");
            entry.error_type = Some(error_type);
        }
        if let Some(Value::String(stack)) = map.get("stack") {
            if let Some(location) = rules::stack_location(stack) {
                for key in ["file", "line", "column"] {
                    map.remove(key);
                }
                entry.location = Some(location);
            }
        }
    }

    entry.message = message;
    entry.extra = map;
    entry
}

// =============================================================================
// Heuristic branch
// =============================================================================

fn from_text(line: &str, log_type: &str) -> LogEntry {
    let is_events = log_type == EVENTS_LOG_TYPE;

    let timestamp = rules::timestamp(line);
    let mut entry = LogEntry {
        log_type: log_type.to_string(),
        parsed_timestamp: timestamp.as_deref().and_then(parse_timestamp),
        timestamp,
        level: rules::level(line),
        raw: line.to_string(),
        format: EntryFormat::Text,
        ..Default::default()
    };

    let user = UserInfo {
        id: rules::user_id(line),
        email: first_match(line, rules::USER_EMAIL_RULES),
        role: rules::user_role(line),
        ..Default::default()
    };
    if !user.is_empty() {
        entry.user = Some(user);
    }

    let (ip_rules, ua_rules, request_rules, status_rules) = if is_events {
        (
            rules::EVENTS_IP_RULES,
            rules::EVENTS_USER_AGENT_RULES,
            rules::EVENTS_REQUEST_RULES,
            rules::EVENTS_STATUS_RULES,
        )
    } else {
        (
            rules::IP_RULES,
            rules::USER_AGENT_RULES,
            rules::REQUEST_RULES,
            rules::STATUS_RULES,
        )
    };

    entry.ip_address = first_match(line, ip_rules);
    entry.user_agent = first_match(line, ua_rules);
    entry.device = user_agent::classify(entry.user_agent.as_deref());

    if log_type == AUDIT_LOG_TYPE {
        if let Some((entity, action)) = first_match(line, rules::AUDIT_RULES) {
            entry.entity = Some(entity);
            entry.action = Some(action);
        }
    }

    entry.request = first_match(line, request_rules);
    entry.status_code = first_match(line, status_rules);

    entry.message = if is_events {
        match &entry.request {
            Some(RequestInfo {
                method: Some(method),
                path: Some(path),
            }) => Some(format!("{method} {path}")),
            _ => entry.ip_address.clone(),
        }
    } else {
        first_match(line, rules::MESSAGE_RULES)
    };

    if let Some(metadata) = rules::trailing_metadata(line) {
        backfill_from_metadata(&mut entry, &metadata);
        entry.metadata = Some(metadata);
    }

    entry
}

fn json_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Fill fields the line-level rules left empty from a decoded metadata
/// object. Line-level values always win.
fn backfill_from_metadata(entry: &mut LogEntry, metadata: &Value) {
    if let Some(request) = metadata.get("request") {
        if entry.ip_address.is_none() {
            entry.ip_address = json_str(request, "ip").map(str::to_string);
        }
        if entry.user_agent.is_none() {
            if let Some(ua) = json_str(request, "userAgent") {
                entry.user_agent = Some(ua.to_string());
                if entry.device.is_none() {
                    entry.device = user_agent::classify(Some(ua));
                }
            }
        }
    }

    if entry.changes.is_none() {
        entry.changes = metadata.get("changes").filter(|v| !v.is_null()).cloned();
    }
    if entry.details.is_none() {
        entry.details = metadata.get("details").filter(|v| !v.is_null()).cloned();
    }

    if let Some(meta_user) = metadata.get("user").filter(|v| v.is_object()) {
        let user = entry.user.get_or_insert_with(UserInfo::default);
        if user.email.is_none() {
            user.email = json_str(meta_user, "email").map(str::to_string);
        }
        if user.id.is_none() {
            user.id = json_str(meta_user, "id").map(str::to_string);
        }
        if user.role.is_none() {
            user.role = json_str(meta_user, "role").map(str::to_string);
        }
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// Parse a timestamp string as written in a log line or a date filter.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]`, the same with a `T`
/// separator, and a bare `YYYY-MM-DD` (midnight). Naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ndt.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
