//! Log record endpoints: listing, search, statistics and lookup by id

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::api::DashboardState;
use crate::database::{DatabaseProvider, Record};
use crate::schema::{DataResponse, LevelCount, PageQuery, Pagination, SearchQuery, SearchResponse, StatsResponse};

/// Handler for GET /api/data
///
/// Returns one page of records, newest first.
///
/// Query parameters:
/// - page: 1-based page number (default: 1)
/// - limit: Rows per page (default: 50, max: 500)
pub async fn list_records_handler<DB: DatabaseProvider>(
    State(state): State<DashboardState<DB>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<DataResponse>> {
    let window = query.window();
    let layout = &state.layout;

    let (list, count) = (layout.list(window), layout.count());
    let (data, total) = tokio::try_join!(state.run(&list), state.run(&count))
        .map_err(ApiError::database("Failed to fetch data"))?;

    Ok(Json(DataResponse {
        data,
        pagination: Pagination::new(window, count_from(&total)),
    }))
}

/// Handler for GET /api/data/search
///
/// Case-insensitive substring match over the configured search columns.
/// `q` is required; `page` and `limit` behave as for the list endpoint.
pub async fn search_records_handler<DB: DatabaseProvider>(
    State(state): State<DashboardState<DB>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let term = query
        .term()
        .ok_or_else(|| ApiError::Validation("Search query is required".to_string()))?;
    let window = query.page.window();
    let layout = &state.layout;

    let (search, count) = (layout.search(term, window), layout.count_matching(term));
    let (data, total) = tokio::try_join!(state.run(&search), state.run(&count))
    .map_err(ApiError::database("Failed to search data"))?;

    Ok(Json(SearchResponse {
        data,
        pagination: Pagination::new(window, count_from(&total)),
    }))
}

/// Handler for GET /api/data/stats
///
/// Total count, today's count and per-level counts, queried concurrently.
pub async fn get_stats_handler<DB: DatabaseProvider>(
    State(state): State<DashboardState<DB>>,
) -> ApiResult<Json<StatsResponse>> {
    let layout = &state.layout;

    let (count, count_today, count_by_level) = (layout.count(), layout.count_today(), layout.count_by_level());
    let (total, today, levels) = tokio::try_join!(
        state.run(&count),
        state.run(&count_today),
        state.run(&count_by_level)
    )
    .map_err(ApiError::database("Failed to fetch statistics"))?;

    let by_level = levels
        .iter()
        .map(|record| LevelCount {
            level: record.get("level").cloned().unwrap_or(Value::Null),
            count: count_value(record.get("count")),
        })
        .collect();

    Ok(Json(StatsResponse {
        total: count_from(&total),
        today: count_from(&today),
        by_level,
    }))
}

/// Handler for GET /api/data/{id}
pub async fn get_record_handler<DB: DatabaseProvider>(
    State(state): State<DashboardState<DB>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record>> {
    let records = state
        .run(&state.layout.by_id(&id))
        .await
        .map_err(ApiError::database("Failed to fetch record"))?;

    records
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Record not found".to_string()))
}

/// Read the `count` column of a single-row aggregate result
fn count_from(records: &[Record]) -> u64 {
    count_value(records.first().and_then(|record| record.get("count")))
}

// Drivers disagree on the type of COUNT(*): BIGINT, DECIMAL or a string
fn count_value(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().map(|float| float.max(0.0) as u64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{create_api_router, fake::FakeDatabase};
    use crate::query::{SqlParameter, TableLayout};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(database: Arc<FakeDatabase>) -> Router {
        let layout = TableLayout::new("logs").unwrap();
        create_api_router(DashboardState::new(database, layout, "test"))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_returns_newest_page_with_pagination() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database.clone()), "/data?page=1&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 10);
        // Rows 1..=3 are stamped today, so they sort first
        assert_eq!(data[0]["id"], 3);
        assert_eq!(data[1]["id"], 2);
        assert_eq!(body["pagination"], json!({"page": 1, "limit": 10, "total": 15, "pages": 2}));

        let executed = database.executed();
        let list = executed.iter().find(|(sql, _)| sql.contains("LIMIT")).unwrap();
        assert_eq!(
            list.0,
            "SELECT * FROM \"logs\" ORDER BY \"created_at\" DESC LIMIT $1 OFFSET $2"
        );
        assert_eq!(list.1, vec![SqlParameter::Integer(10), SqlParameter::Integer(0)]);
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database), "/data?page=2&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["pagination"]["page"], 2);
    }

    #[tokio::test]
    async fn test_list_ignores_malformed_paging() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database), "/data?page=abc&limit=-3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 50);
        assert_eq!(body["data"].as_array().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database.clone()), "/data/search").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Search query is required");
        assert!(database.executed().is_empty());

        let (status, _) = get(router(database), "/data/search?q=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database.clone()), "/data/search?q=ERROR").await;

        assert_eq!(status, StatusCode::OK);
        // ids 3, 6, 9, 12, 15 carry level "error"
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["pagination"]["total"], 5);

        let executed = database.executed();
        let search = executed.iter().find(|(sql, _)| sql.contains("LIMIT")).unwrap();
        assert_eq!(search.1[0], SqlParameter::Text("ERROR".to_string()));
    }

    #[tokio::test]
    async fn test_stats() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database), "/data/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 15);
        assert_eq!(body["today"], 3);

        let by_level = body["byLevel"].as_array().unwrap();
        assert_eq!(by_level.len(), 3);
        let total: u64 = by_level.iter().map(|level| level["count"].as_u64().unwrap()).sum();
        assert_eq!(total, 15);
    }

    #[tokio::test]
    async fn test_get_record_by_id() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database.clone()), "/data/7").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["message"], "event number 7");
        assert_eq!(database.executed()[0].1, vec![SqlParameter::Text("7".to_string())]);
    }

    #[tokio::test]
    async fn test_record_keeps_column_order() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (_, body) = get(router(database), "/data?limit=1").await;

        let columns: Vec<&str> = body["data"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(columns, ["id", "created_at", "level", "message", "source"]);
    }

    #[tokio::test]
    async fn test_search_sends_term_verbatim() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database.clone()), "/data/search?q=event%20number%201%20").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 0);

        let executed = database.executed();
        let search = executed.iter().find(|(sql, _)| sql.contains("LIMIT")).unwrap();
        assert_eq!(search.1[0], SqlParameter::Text("event number 1 ".to_string()));
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let database = Arc::new(FakeDatabase::fifteen_logs());
        let (status, body) = get(router(database), "/data/42").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Record not found");
    }

    #[tokio::test]
    async fn test_database_failure_is_internal_error() {
        let database = Arc::new(FakeDatabase::unreachable());

        let (status, body) = get(router(database.clone()), "/data").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data");

        let (_, body) = get(router(database.clone()), "/data/stats").await;
        assert_eq!(body["error"], "Failed to fetch statistics");

        let (_, body) = get(router(database), "/data/1").await;
        assert_eq!(body["error"], "Failed to fetch record");
    }

    #[test]
    fn test_count_value_accepts_driver_variants() {
        assert_eq!(count_value(Some(&json!(15))), 15);
        assert_eq!(count_value(Some(&json!(15.0))), 15);
        assert_eq!(count_value(Some(&json!("15"))), 15);
        assert_eq!(count_value(Some(&Value::Null)), 0);
        assert_eq!(count_value(None), 0);
        assert_eq!(count_from(&[]), 0);
    }
}
