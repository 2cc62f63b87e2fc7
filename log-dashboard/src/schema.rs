//! Request and response types for the dashboard API
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::database::Record;
use crate::query::spec::{PageWindow, DEFAULT_PAGE_LIMIT};

/// Query parameters for paginated endpoints
///
/// Values are kept as strings so that malformed numbers fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,

    /// Rows per page (default 50, capped at 500)
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn window(&self) -> PageWindow {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_LIMIT);
        PageWindow::new(page, limit)
    }
}

/// Query parameters for the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Search term (required)
    pub q: Option<String>,

    #[serde(flatten)]
    pub page: PageQuery,
}

impl SearchQuery {
    /// The search term as sent, unless it is missing or blank
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().filter(|term| !term.trim().is_empty())
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based)
    pub page: u64,

    /// Rows per page used for this query
    pub limit: u64,

    /// Total number of matching rows
    pub total: u64,

    /// Number of pages
    pub pages: u64,
}

impl Pagination {
    pub fn new(window: PageWindow, total: u64) -> Self {
        Self {
            page: window.page(),
            limit: window.limit(),
            total,
            pages: window.page_count(total),
        }
    }
}

/// Response for `GET /api/data`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    /// The records on this page
    pub data: Vec<Record>,

    pub pagination: Pagination,
}

/// Response for `GET /api/data/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Matching records on this page
    pub data: Vec<Record>,

    pub pagination: Pagination,
}

/// Row count for one level value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    /// Level as stored (may be null)
    pub level: serde_json::Value,

    pub count: u64,
}

/// Response for `GET /api/data/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Total number of records
    pub total: u64,

    /// Records created during the database server's current day
    pub today: u64,

    /// Counts per level
    pub by_level: Vec<LevelCount>,
}

/// Response for `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,

    /// RFC 3339 time of the check
    pub timestamp: String,

    /// "connected" or "disconnected"
    pub database: String,

    pub environment: String,

    /// Why the database check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
