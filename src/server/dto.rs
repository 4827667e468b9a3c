// LogSift - server/dto.rs
//
// Wire shapes of the log query endpoint.

use crate::core::filter::FilterCriteria;
use crate::core::model::{FacetSummary, LogEntry, QueryResult};
use crate::core::query::PageRequest;
use crate::util::constants::{DEFAULT_PAGE, MIN_PAGE_SIZE};
use crate::util::error::QueryError;
use serde::{Deserialize, Serialize};

/// Query string of `GET /logs`. Every parameter arrives as text; empty
/// strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
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

fn parse_int(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, QueryError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| QueryError::InvalidParameter {
            name,
            value: raw.to_string(),
            reason: "must be an integer",
        })
}

impl LogsQuery {
    /// Page window of the request. `page` is taken as given; `limit` must be
    /// at least 1.
    pub fn page_request(&self, default_limit: i64) -> Result<PageRequest, QueryError> {
        let page = parse_int("page", self.page.as_deref())?.unwrap_or(DEFAULT_PAGE);
        let limit = parse_int("limit", self.limit.as_deref())?.unwrap_or(default_limit);
        if limit < MIN_PAGE_SIZE {
            return Err(QueryError::InvalidParameter {
                name: "limit",
                value: limit.to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(PageRequest { page, limit })
    }

    pub fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            level: self.level,
            search: self.search,
            start_date: self.start_date,
            end_date: self.end_date,
            user: self.user,
            ip: self.ip,
            device: self.device,
            browser: self.browser,
            os: self.os,
            log_type: self.log_type,
            action: self.action,
            entity: self.entity,
        }
        .normalized()
    }
}

/// Success envelope of `GET /logs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub success: bool,
    pub total_entries: usize,
    pub filtered_entries: usize,
    pub page: i64,
    pub total_pages: i64,
    pub entries: Vec<LogEntry>,
    pub filters: FacetSummary,
}

impl From<QueryResult> for LogsResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            success: true,
            total_entries: result.total_entries,
            filtered_entries: result.filtered_count,
            page: result.page,
            total_pages: result.total_pages,
            entries: result.entries,
            filters: result.facets,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> LogsQuery {
        LogsQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply_when_absent_or_empty() {
        let req = query(None, None).page_request(50).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 50 });
        let req = query(Some(""), Some(" ")).page_request(25).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 25 });
    }

    #[test]
    fn test_explicit_values_are_used() {
        let req = query(Some("3"), Some("10")).page_request(50).unwrap();
        assert_eq!(req, PageRequest { page: 3, limit: 10 });
    }

    #[test]
    fn test_non_positive_page_is_accepted() {
        let req = query(Some("-2"), None).page_request(50).unwrap();
        assert_eq!(req.page, -2);
    }

    #[test]
    fn test_invalid_limit_is_rejected() {
        assert!(query(None, Some("0")).page_request(50).is_err());
        assert!(query(None, Some("ten")).page_request(50).is_err());
        let err = query(Some("1.5"), None).page_request(50).unwrap_err();
        assert!(matches!(err, QueryError::InvalidParameter { name: "page", .. }));
    }

    #[test]
    fn test_into_criteria_normalizes() {
        let q = LogsQuery {
            level: Some("all".into()),
            log_type: Some("audit".into()),
            search: Some(String::new()),
            ..Default::default()
        };
        let criteria = q.into_criteria();
        assert_eq!(criteria.level, None);
        assert_eq!(criteria.search, None);
        assert_eq!(criteria.log_type.as_deref(), Some("audit"));
    }
}
