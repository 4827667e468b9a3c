// LogSift - core/filter.rs
//
// Filter criteria for log queries and the predicate that applies them.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O or HTTP dependencies.

use crate::core::model::LogEntry;
use crate::core::parser::parse_timestamp;
use crate::util::constants::LEVEL_ALL;
use chrono::{DateTime, Utc};

/// Page-independent query criteria. `None` means "no filter".
///
/// `log_type` selects which files are read; it is applied by the aggregator
/// before parsing, not by `apply_filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub level: Option<String>,
    pub search: Option<String>,
    /// Inclusive lower day bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper day bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub user: Option<String>,
    pub ip: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub log_type: Option<String>,
    pub action: Option<String>,
    pub entity: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FilterCriteria {
    /// Drop empty-string values and the `level=all` sentinel.
    pub fn normalized(self) -> Self {
        Self {
            level: present(self.level).filter(|l| !l.eq_ignore_ascii_case(LEVEL_ALL)),
            search: present(self.search),
            start_date: present(self.start_date),
            end_date: present(self.end_date),
            user: present(self.user),
            ip: present(self.ip),
            device: present(self.device),
            browser: present(self.browser),
            os: present(self.os),
            log_type: present(self.log_type),
            action: present(self.action),
            entity: present(self.entity),
        }
    }

    /// Returns true if no entry-level filter is active.
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.search.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.user.is_none()
            && self.ip.is_none()
            && self.device.is_none()
            && self.browser.is_none()
            && self.os.is_none()
            && self.action.is_none()
            && self.entity.is_none()
    }
}

/// A day bound resolved to an instant. An unparseable date matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DayBound {
    Open,
    At(DateTime<Utc>),
    Invalid,
}

/// `(hour, minute, second, millisecond)` a day bound snaps to.
type TimeOfDay = (u32, u32, u32, u32);

const START_OF_DAY: TimeOfDay = (0, 0, 0, 0);
const END_OF_DAY: TimeOfDay = (23, 59, 59, 999);

impl DayBound {
    fn resolve(raw: Option<&str>, (h, m, s, ms): TimeOfDay) -> Self {
        let Some(raw) = raw else {
            return Self::Open;
        };
        parse_timestamp(raw)
            .and_then(|ts| ts.date_naive().and_hms_milli_opt(h, m, s, ms))
            .map(|ndt| Self::At(ndt.and_utc()))
            .unwrap_or(Self::Invalid)
    }
}

/// Criteria with the lower-cased and parsed forms computed once per query.
struct Prepared<'a> {
    criteria: &'a FilterCriteria,
    search_lower: Option<String>,
    start: DayBound,
    end: DayBound,
}

impl<'a> Prepared<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            search_lower: criteria.search.as_ref().map(|s| s.to_lowercase()),
            start: DayBound::resolve(criteria.start_date.as_deref(), START_OF_DAY),
            end: DayBound::resolve(criteria.end_date.as_deref(), END_OF_DAY),
        }
    }
}

/// Apply filters to a slice of entries, returning indices of matching
/// entries in their original order.
pub fn apply_filters(entries: &[LogEntry], criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.is_empty() {
        return (0..entries.len()).collect();
    }

    let prepared = Prepared::new(criteria);

    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_all(entry, &prepared))
        .map(|(idx, _)| idx)
        .collect()
}

fn eq_ignore_case(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase())
}

/// Check if a single entry matches all active filters.
fn matches_all(entry: &LogEntry, p: &Prepared<'_>) -> bool {
    let c = p.criteria;

    if let Some(level) = &c.level {
        if !eq_ignore_case(entry.level.as_deref(), level) {
            return false;
        }
    }

    if let Some(needle) = &p.search_lower {
        let in_message = entry
            .message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(needle.as_str()));
        if !in_message && !entry.raw.to_lowercase().contains(needle.as_str()) {
            return false;
        }
    }

    // Entries without a timestamp are excluded from time filters.
    match p.start {
        DayBound::Open => {}
        DayBound::Invalid => return false,
        DayBound::At(start) => match entry.parsed_timestamp {
            Some(ts) if ts >= start => {}
            _ => return false,
        },
    }
    match p.end {
        DayBound::Open => {}
        DayBound::Invalid => return false,
        DayBound::At(end) => match entry.parsed_timestamp {
            Some(ts) if ts <= end => {}
            _ => return false,
        },
    }

    if let Some(wanted) = &c.user {
        let user = entry.user.as_ref();
        let hit = |field: Option<&String>| field.is_some_and(|v| v.contains(wanted.as_str()));
        if !user.is_some_and(|u| hit(u.email.as_ref()) || hit(u.id.as_ref())) {
            return false;
        }
    }

    if let Some(wanted) = &c.ip {
        if !entry
            .ip_address
            .as_deref()
            .is_some_and(|ip| ip.contains(wanted.as_str()))
        {
            return false;
        }
    }

    let device = entry.device.as_ref();
    if let Some(wanted) = &c.device {
        if device.map(|d| d.device.as_str()) != Some(wanted.as_str()) {
            return false;
        }
    }
    if let Some(wanted) = &c.browser {
        if device.map(|d| d.browser.as_str()) != Some(wanted.as_str()) {
            return false;
        }
    }
    if let Some(wanted) = &c.os {
        if device.map(|d| d.os.as_str()) != Some(wanted.as_str()) {
            return false;
        }
    }

    if let Some(action) = &c.action {
        if !eq_ignore_case(entry.action.as_deref(), action) {
            return false;
        }
    }
    if let Some(entity) = &c.entity {
        if !eq_ignore_case(entry.entity.as_deref(), entity) {
            return false;
        }
    }

    true
}
