// LogSift - core/rules.rs
//
// Field extraction rules for the heuristic (non-JSON) line parser.
//
// Every rule is a pure `fn(&str) -> Option<T>` over the raw line. Rules for
// the same field are grouped in ordered tables and applied with
// `first_match`, so the first rule that recognises something wins.

use crate::core::model::{RequestInfo, SourceLocation};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// A single extraction rule.
pub type Rule<T> = fn(&str) -> Option<T>;

/// Apply `rules` in order and return the first hit.
pub fn first_match<T>(line: &str, rules: &[Rule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(line))
}

// =============================================================================
// Compiled patterns
// =============================================================================

struct Patterns {
    timestamp: Regex,
    level: Regex,
    user_marker: Regex,
    user_id: Regex,
    user_role: Regex,
    email: Regex,
    events_ip: Regex,
    ip_json: Regex,
    ip_marker: Regex,
    ipv4: Regex,
    events_user_agent: Regex,
    user_agent_json: Regex,
    user_agent_header: Regex,
    mozilla: Regex,
    auth_action: Regex,
    entity_action: Regex,
    events_request: Regex,
    method_marker: Regex,
    bare_request: Regex,
    events_status: Regex,
    status_marker: Regex,
    bare_status: Regex,
    message: Regex,
    message_fallback: Regex,
    uncaught_exception: Regex,
    stack_first_line: Regex,
    stack_frame_paren: Regex,
    stack_frame_bare: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are literals exercised by the unit tests below, so a typo
        // fails the test suite rather than a request.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("rules: invalid regex")
        }

        Patterns {
            timestamp: re(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})"),
            level: re(r"(?i)\[(error|info|warn|debug|event|audit)\]"),
            user_marker: re(r"User: ([^\s\-\]]+)"),
            user_id: re(r"(?i)UserId: ([a-f0-9]{24})"),
            user_role: re(r"(?i)UserRole: ([^\s,\]]+)"),
            email: re(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+"),
            events_ip: re(r"(?i)\[INFO\]\s+(\S+)"),
            ip_json: re(r#"(?i)ip":"([^"]+)""#),
            ip_marker: re(r"(?i)IP: ([^\s,\]]+)"),
            ipv4: re(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\b"),
            events_user_agent: re(r#""([^"]+)"\r?$"#),
            user_agent_json: re(r#"(?i)userAgent":"([^"]+)""#),
            user_agent_header: re(r"(?i)User-Agent: ([^\]]+)"),
            mozilla: re(r"(Mozilla/[\d.]+.+?)(?:\s-|\s\[|$)"),
            auth_action: re(r"\] Auth (\w+[\-\w]*)"),
            entity_action: re(r"\] (\w+) (\w+[\-\w]*)"),
            events_request: re(r#"(?i)"(GET|POST|PUT|DELETE|PATCH)\s+(\S+)\s+HTTP"#),
            method_marker: re(r"(?i)\[Method: ([^\]]+)\]"),
            bare_request: re(r"(?i)\b(GET|POST|PUT|DELETE|PATCH)\s+(\S+)"),
            events_status: re(r#"(?i)HTTP/[\d.]+"\s+(\d{3})\s"#),
            status_marker: re(r"(?i)\[Status: (\d{3})\]"),
            bare_status: re(r"\b(\d{3})\b(?:\s-|\s\[|$)"),
            message: re(r"\][^\[]*?([^-]+)(?:-|$)"),
            message_fallback: re(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \[[^\]]+\](.*)"),
            uncaught_exception: re(r"uncaughtException: ([^:]+):"),
            stack_first_line: re(r"\n([^:]+):"),
            stack_frame_paren: re(r"\(([^():]+):(\d+):(\d+)\)"),
            stack_frame_bare: re(r"([^()\s]+):(\d+):(\d+)"),
        }
    })
}

/// First capture group of `re` in `line`, as an owned string.
fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// =============================================================================
// Timestamp / level
// =============================================================================

/// Leading `YYYY-MM-DD HH:MM:SS`.
pub fn timestamp(line: &str) -> Option<String> {
    capture(&patterns().timestamp, line)
}

/// Bracketed level token, lower-cased.
pub fn level(line: &str) -> Option<String> {
    capture(&patterns().level, line).map(|l| l.to_lowercase())
}

// =============================================================================
// User
// =============================================================================

/// `User: <token>` marker.
pub fn user_marker(line: &str) -> Option<String> {
    capture(&patterns().user_marker, line)
}

/// Any email-looking token.
pub fn bare_email(line: &str) -> Option<String> {
    patterns()
        .email
        .find(line)
        .map(|m| m.as_str().to_string())
}

/// Email source order: explicit marker beats a bare address.
pub const USER_EMAIL_RULES: &[Rule<String>] = &[user_marker, bare_email];

/// `UserId: <24 hex chars>`.
pub fn user_id(line: &str) -> Option<String> {
    capture(&patterns().user_id, line)
}

/// `UserRole: <token>`.
pub fn user_role(line: &str) -> Option<String> {
    capture(&patterns().user_role, line)
}

// =============================================================================
// IP address
// =============================================================================

/// Access-log style: the client address right after `[INFO]`.
pub fn events_ip(line: &str) -> Option<String> {
    capture(&patterns().events_ip, line)
}

/// `ip":"..."` fragment of inline JSON.
pub fn ip_json_fragment(line: &str) -> Option<String> {
    capture(&patterns().ip_json, line)
}

/// `IP: ...` marker.
pub fn ip_marker(line: &str) -> Option<String> {
    capture(&patterns().ip_marker, line)
}

/// Any dotted quad.
pub fn bare_ipv4(line: &str) -> Option<String> {
    capture(&patterns().ipv4, line)
}

pub const EVENTS_IP_RULES: &[Rule<String>] = &[events_ip];
pub const IP_RULES: &[Rule<String>] = &[ip_json_fragment, ip_marker, bare_ipv4];

// =============================================================================
// User agent
// =============================================================================

/// Access-log style: last double-quoted segment at end of line.
pub fn events_user_agent(line: &str) -> Option<String> {
    capture(&patterns().events_user_agent, line)
}

/// `userAgent":"..."` fragment of inline JSON.
pub fn user_agent_json_fragment(line: &str) -> Option<String> {
    capture(&patterns().user_agent_json, line)
}

/// `User-Agent: ...` header marker, up to the next `]`.
pub fn user_agent_header(line: &str) -> Option<String> {
    capture(&patterns().user_agent_header, line)
}

/// Bare `Mozilla/x.y ...` up to the next ` -` or ` [`.
pub fn mozilla_user_agent(line: &str) -> Option<String> {
    capture(&patterns().mozilla, line)
}

pub const EVENTS_USER_AGENT_RULES: &[Rule<String>] = &[events_user_agent];
pub const USER_AGENT_RULES: &[Rule<String>] =
    &[user_agent_json_fragment, user_agent_header, mozilla_user_agent];

// =============================================================================
// Audit action / entity
// =============================================================================

/// An audited operation: `(entity, action)`.
pub type AuditPair = (String, String);

/// `] Auth <action>`; the entity is always `auth`.
pub fn auth_action(line: &str) -> Option<AuditPair> {
    capture(&patterns().auth_action, line)
        .map(|action| (crate::util::constants::AUTH_ENTITY.to_string(), action))
}

/// `] <entity> <action>` right after the level bracket.
pub fn entity_action(line: &str) -> Option<AuditPair> {
    let caps = patterns().entity_action.captures(line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

pub const AUDIT_RULES: &[Rule<AuditPair>] = &[auth_action, entity_action];

// =============================================================================
// Request line / status code
// =============================================================================

/// Quoted `"<METHOD> <path> HTTP/x.y"` request line.
pub fn events_request(line: &str) -> Option<RequestInfo> {
    let caps = patterns().events_request.captures(line)?;
    Some(RequestInfo {
        method: Some(caps[1].to_string()),
        path: Some(caps[2].to_string()),
    })
}

/// `[Method: GET /path]` marker. The path part is optional.
pub fn method_marker(line: &str) -> Option<RequestInfo> {
    let content = capture(&patterns().method_marker, line)?;
    let mut parts = content.split_whitespace();
    let method = parts.next()?.to_string();
    Some(RequestInfo {
        method: Some(method),
        path: parts.next().map(str::to_string),
    })
}

/// Bare `<METHOD> <path>` anywhere in the line.
pub fn bare_request(line: &str) -> Option<RequestInfo> {
    let caps = patterns().bare_request.captures(line)?;
    Some(RequestInfo {
        method: Some(caps[1].to_string()),
        path: Some(caps[2].to_string()),
    })
}

pub const EVENTS_REQUEST_RULES: &[Rule<RequestInfo>] = &[events_request];
pub const REQUEST_RULES: &[Rule<RequestInfo>] = &[method_marker, bare_request];

fn status_capture(re: &Regex, line: &str) -> Option<u16> {
    capture(re, line).and_then(|code| code.parse().ok())
}

/// Three-digit code after the quoted request's `HTTP/x.y"`.
pub fn events_status(line: &str) -> Option<u16> {
    status_capture(&patterns().events_status, line)
}

/// `[Status: nnn]` marker.
pub fn status_marker(line: &str) -> Option<u16> {
    status_capture(&patterns().status_marker, line)
}

/// Bare three-digit token followed by ` -`, ` [` or end of line.
pub fn bare_status(line: &str) -> Option<u16> {
    status_capture(&patterns().bare_status, line)
}

pub const EVENTS_STATUS_RULES: &[Rule<u16>] = &[events_status];
pub const STATUS_RULES: &[Rule<u16>] = &[status_marker, bare_status];

// =============================================================================
// Message
// =============================================================================

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Text between the level bracket and the first `-`.
pub fn message_segment(line: &str) -> Option<String> {
    capture(&patterns().message, line).and_then(|m| non_empty(&m))
}

/// Everything after `<timestamp> [<level>]`.
pub fn message_after_level(line: &str) -> Option<String> {
    capture(&patterns().message_fallback, line).and_then(|m| non_empty(&m))
}

pub const MESSAGE_RULES: &[Rule<String>] = &[message_segment, message_after_level];

// =============================================================================
// Trailing metadata
// =============================================================================

/// Offsets just past every `-` that is followed by whitespace and some text.
fn metadata_candidates(line: &str) -> impl Iterator<Item = &str> + '_ {
    line.match_indices('-').filter_map(move |(idx, _)| {
        let rest = &line[idx + 1..];
        let starts_with_space = rest.chars().next().is_some_and(char::is_whitespace);
        let trimmed = rest.trim();
        (starts_with_space && !trimmed.is_empty()).then_some(trimmed)
    })
}

/// Payload after the first `- ` delimiter.
///
/// The first delimiter's remainder is JSON-decoded. When that fails, later
/// delimiters whose remainder opens a JSON object or array are tried, which
/// recovers the trailing `- {...}` of `msg - User: x - {...}` lines. If
/// nothing decodes, the first remainder is returned as a JSON string.
/// A decoded `null` counts as no metadata.
pub fn trailing_metadata(line: &str) -> Option<Value> {
    let mut candidates = metadata_candidates(line);
    let first = candidates.next()?;
    if let Ok(value) = serde_json::from_str::<Value>(first) {
        return (!value.is_null()).then_some(value);
    }
    candidates
        .filter(|rest| rest.starts_with('{') || rest.starts_with('['))
        .find_map(|rest| serde_json::from_str::<Value>(rest).ok())
        .or_else(|| Some(Value::String(first.to_string())))
}

// =============================================================================
// Exceptions
// =============================================================================

/// Exception class from an `uncaughtException: <Type>:` message, falling
/// back to the first `<Type>:` line of an embedded stack trace.
pub fn error_type(message: &str) -> Option<String> {
    let p = patterns();
    capture(&p.uncaught_exception, message)
        .or_else(|| capture(&p.stack_first_line, message))
        .and_then(|t| non_empty(&t))
}

/// First `(<file>:<line>:<col>)` frame of a stack, or a bare
/// `<file>:<line>:<col>` when no parenthesised frame exists.
pub fn stack_location(stack: &str) -> Option<SourceLocation> {
    let p = patterns();
    let caps = p
        .stack_frame_paren
        .captures(stack)
        .or_else(|| p.stack_frame_bare.captures(stack))?;
    Some(SourceLocation {
        file: caps[1].to_string(),
        line: caps[2].parse().ok()?,
        column: caps[3].parse().ok()?,
    })
}
