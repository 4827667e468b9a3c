// LogSift - core/query.rs
//
// Query assembly over an in-memory entry set: newest-first ordering,
// facet extraction, filtering and page slicing.
// Core layer: pure logic, no I/O.

use crate::core::filter::{apply_filters, FilterCriteria};
use crate::core::model::{FacetSummary, LogEntry, QueryResult};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;

/// Requested page window. Values are taken as given; see `page_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    /// Page size, expected to be at least 1.
    pub limit: i64,
}

/// Stable newest-first sort. Entries without a usable timestamp sort as the
/// Unix epoch, so they land after every dated entry and keep file order
/// among themselves.
pub fn sort_entries(entries: &mut [LogEntry]) {
    entries.sort_by_key(|entry| Reverse(entry.sort_key()));
}

/// `ceil(filtered / limit)`; zero when there is nothing to page.
pub fn total_pages(filtered: usize, limit: i64) -> i64 {
    if limit < 1 {
        return 0;
    }
    let filtered = i64::try_from(filtered).unwrap_or(i64::MAX);
    filtered.saturating_add(limit - 1) / limit
}

/// Index range of `page` within a list of `len` items.
///
/// The window is `[(page-1)*limit, (page-1)*limit + limit)` resolved with
/// array-slice semantics where a negative index counts back from the end.
/// Page 0 with limit 10 therefore selects the ten items before the end
/// boundary `0`, which is nothing, and page -1 selects the window that
/// ends ten items before the end.
pub fn page_range(len: usize, req: PageRequest) -> Range<usize> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolve = |idx: i64| -> usize {
        let clamped = if idx < 0 {
            len_i.saturating_add(idx).max(0)
        } else {
            idx.min(len_i)
        };
        usize::try_from(clamped).unwrap_or(0)
    };

    let start = req.page.saturating_sub(1).saturating_mul(req.limit);
    let end = start.saturating_add(req.limit);
    let (start, end) = (resolve(start), resolve(end));
    if end <= start {
        return 0..0;
    }
    start..end
}

/// Ordered set of distinct strings, kept in first-seen order.
#[derive(Default)]
struct Distinct {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl Distinct {
    fn add(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            if !self.seen.contains(value) {
                self.seen.insert(value.to_string());
                self.values.push(value.to_string());
            }
        }
    }
}

/// Distinct values per filterable field, over exactly the entries given.
pub fn compute_facets(entries: &[LogEntry]) -> FacetSummary {
    let mut log_types = Distinct::default();
    let mut levels = Distinct::default();
    let mut users = Distinct::default();
    let mut ips = Distinct::default();
    let mut devices = Distinct::default();
    let mut browsers = Distinct::default();
    let mut systems = Distinct::default();
    let mut actions = Distinct::default();
    let mut entities = Distinct::default();

    for entry in entries {
        log_types.add(Some(&entry.log_type));
        levels.add(entry.level.as_deref());
        users.add(entry.user_label());
        ips.add(entry.ip_address.as_deref());
        if let Some(device) = &entry.device {
            devices.add(Some(&device.device));
            browsers.add(Some(&device.browser));
            systems.add(Some(&device.os));
        }
        actions.add(entry.action.as_deref());
        entities.add(entry.entity.as_deref());
    }

    FacetSummary {
        log_types: log_types.values,
        levels: levels.values,
        users: users.values,
        ip_addresses: ips.values,
        devices: devices.values,
        browsers: browsers.values,
        operating_systems: systems.values,
        actions: actions.values,
        entities: entities.values,
    }
}

/// Sort, facet, filter and slice the full entry set of the selected files.
///
/// Facets describe `all` before filtering; `total_entries` counts `all`.
pub fn build_result(
    mut all: Vec<LogEntry>,
    criteria: &FilterCriteria,
    req: PageRequest,
) -> QueryResult {
    sort_entries(&mut all);
    let facets = compute_facets(&all);

    let matched = apply_filters(&all, criteria);
    let range = page_range(matched.len(), req);
    let entries = matched[range].iter().map(|&idx| all[idx].clone()).collect();

    QueryResult {
        entries,
        total_entries: all.len(),
        filtered_count: matched.len(),
        page: req.page,
        total_pages: total_pages(matched.len(), req.limit),
        facets,
    }
}

/// Well-formed result for a query that selected no files.
///
/// Only the log-type facet is populated, from every available file, so a
/// client can still discover which types exist.
pub fn empty_result(page: i64, available_log_types: Vec<String>) -> QueryResult {
    QueryResult {
        entries: Vec::new(),
        total_entries: 0,
        filtered_count: 0,
        page,
        total_pages: 0,
        facets: FacetSummary {
            log_types: available_log_types,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{DeviceInfo, UserInfo};
    use crate::core::parser::parse_timestamp;

    fn entry(ts: Option<&str>, level: &str, raw: &str) -> LogEntry {
        LogEntry {
            timestamp: ts.map(str::to_string),
            parsed_timestamp: ts.and_then(parse_timestamp),
            level: Some(level.to_string()),
            ..LogEntry::unparsed(raw, "events")
        }
    }

    fn numbered(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| {
                let ts = format!("2025-05-11 10:{:02}:{:02}", i / 60, i % 60);
                entry(Some(&ts), "info", &format!("line {i}"))
            })
            .collect()
    }

    #[test]
    fn test_sort_newest_first_with_undated_last() {
        let mut entries = vec![
            entry(None, "info", "undated-a"),
            entry(Some("2025-05-11 10:00:00"), "info", "older"),
            entry(Some("not a date"), "info", "undated-b"),
            entry(Some("2025-05-11 11:00:00"), "info", "newer"),
        ];
        sort_entries(&mut entries);
        let order: Vec<&str> = entries.iter().map(|e| e.raw.as_str()).collect();
        assert_eq!(order, vec!["newer", "older", "undated-a", "undated-b"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut entries = vec![
            entry(Some("2025-05-11 10:00:00"), "info", "first"),
            entry(Some("2025-05-11 10:00:00"), "info", "second"),
        ];
        sort_entries(&mut entries);
        assert_eq!(entries[0].raw, "first");
        assert_eq!(entries[1].raw, "second");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_range_basic() {
        let req = |page, limit| PageRequest { page, limit };
        assert_eq!(page_range(25, req(1, 10)), 0..10);
        assert_eq!(page_range(25, req(3, 10)), 20..25);
        assert_eq!(page_range(25, req(4, 10)), 0..0);
    }

    #[test]
    fn test_page_range_non_positive_pages() {
        let req = |page, limit| PageRequest { page, limit };
        // start = -10, end = 0: end resolves to 0.
        assert_eq!(page_range(25, req(0, 10)), 0..0);
        // start = -20, end = -10: counted back from the end.
        assert_eq!(page_range(25, req(-1, 10)), 5..15);
        assert_eq!(page_range(5, req(-1, 10)), 0..0);
    }

    #[test]
    fn test_page_range_never_panics_on_extremes() {
        let r = page_range(3, PageRequest { page: i64::MAX, limit: i64::MAX });
        assert!(r.is_empty());
        let r = page_range(3, PageRequest { page: i64::MIN, limit: 2 });
        assert!(r.is_empty());
    }

    #[test]
    fn test_pages_concatenate_to_filtered_list() {
        let all = numbered(23);
        let criteria = FilterCriteria::default();
        let first = build_result(all.clone(), &criteria, PageRequest { page: 1, limit: 5 });
        let mut joined = Vec::new();
        for page in 1..=first.total_pages {
            let result = build_result(all.clone(), &criteria, PageRequest { page, limit: 5 });
            joined.extend(result.entries);
        }
        let mut expected = all;
        sort_entries(&mut expected);
        assert_eq!(first.total_pages, 5);
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_facets_are_distinct_and_ignore_filters() {
        let all = vec![
            entry(Some("2025-05-11 10:00:00"), "info", "a"),
            entry(Some("2025-05-11 10:00:01"), "info", "b"),
            entry(Some("2025-05-11 10:00:02"), "error", "c"),
        ];
        let criteria = FilterCriteria {
            level: Some("error".into()),
            search: Some("c".into()),
            ..Default::default()
        };
        let result = build_result(all, &criteria, PageRequest { page: 1, limit: 50 });
        assert_eq!(result.filtered_count, 1);
        assert_eq!(result.total_entries, 3);
        let mut levels = result.facets.levels.clone();
        levels.sort();
        assert_eq!(levels, vec!["error", "info"]);
    }

    #[test]
    fn test_facets_cover_every_field() {
        let mut e = entry(Some("2025-05-11 10:00:00"), "audit", "x");
        e.log_type = "audit".into();
        e.user = Some(UserInfo {
            id: Some("0123456789abcdef01234567".into()),
            ..Default::default()
        });
        e.ip_address = Some("10.0.0.1".into());
        e.device = Some(DeviceInfo {
            browser: "Firefox".into(),
            os: "Linux".into(),
            device: "Desktop".into(),
            extra: Default::default(),
        });
        e.action = Some("login".into());
        e.entity = Some("auth".into());

        let facets = compute_facets(&[e]);
        assert_eq!(facets.log_types, vec!["audit"]);
        assert_eq!(facets.users, vec!["0123456789abcdef01234567"]);
        assert_eq!(facets.ip_addresses, vec!["10.0.0.1"]);
        assert_eq!(facets.devices, vec!["Desktop"]);
        assert_eq!(facets.browsers, vec!["Firefox"]);
        assert_eq!(facets.operating_systems, vec!["Linux"]);
        assert_eq!(facets.actions, vec!["login"]);
        assert_eq!(facets.entities, vec!["auth"]);
    }

    #[test]
    fn test_page_entries_are_a_subset_of_filtered() {
        let all = numbered(12);
        let criteria = FilterCriteria {
            search: Some("line 1".into()),
            ..Default::default()
        };
        let result = build_result(all, &criteria, PageRequest { page: 1, limit: 2 });
        // "line 1", "line 10", "line 11"
        assert_eq!(result.filtered_count, 3);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.entries.len(), 2);
        assert!(result.entries.iter().all(|e| e.raw.contains("line 1")));
    }

    #[test]
    fn test_empty_result_shape() {
        let result = empty_result(2, vec!["audit".into(), "events".into()]);
        assert!(result.entries.is_empty());
        assert_eq!(result.page, 2);
        assert_eq!(result.total_pages, 0);
        assert_eq!(result.facets.log_types, vec!["audit", "events"]);
        assert!(result.facets.levels.is_empty());
    }
}
