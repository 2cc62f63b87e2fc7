//! Round-trip against a live PostgreSQL
//!
//! Run with `DATABASE_URL=postgres://... cargo test --features postgres-tests`.

#![cfg(feature = "postgres-tests")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use log_dashboard::query::{Identifier, OrderBy, TableName};
use log_dashboard::{DashboardLayer, DatabaseProvider, Dialect, PostgresProvider, SqlParameter, TableLayout};
use sqlx::PgPool;
use tower::ServiceExt;

struct Fixture {
    provider: Arc<PostgresProvider>,
    table: String,
    enum_type: Option<String>,
}

impl Fixture {
    /// A unique table name on a fresh pool; nothing is created yet
    async fn empty() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres-tests");
        let pool = PgPool::connect(&url).await.expect("Failed to connect to PostgreSQL");
        Self {
            provider: Arc::new(PostgresProvider::new(pool)),
            table: format!("roundtrip_logs_{}", uuid::Uuid::new_v4().simple()),
            enum_type: None,
        }
    }

    /// A fresh table with 15 rows, created one hour apart
    async fn new() -> Self {
        let fixture = Self::empty().await;
        let table = &fixture.table;
        fixture
            .execute(&format!(
                "CREATE TABLE {table} (id SERIAL PRIMARY KEY, created_at TIMESTAMP NOT NULL, \
                 level TEXT NOT NULL, message TEXT NOT NULL)"
            ))
            .await;
        fixture
            .execute(&format!(
                "INSERT INTO {table} (created_at, level, message) \
                 SELECT TIMESTAMP '2024-01-01 00:00:00' + n * INTERVAL '1 hour', \
                 CASE WHEN n % 3 = 0 THEN 'error' ELSE 'info' END, 'event ' || n \
                 FROM generate_series(1, 15) AS n"
            ))
            .await;
        fixture
    }

    async fn execute(&self, sql: &str) {
        self.provider.query(sql, &[]).await.unwrap();
    }

    fn router(&self) -> axum::Router {
        let layout = TableLayout::new(&self.table).unwrap();
        DashboardLayer::new(self.provider.clone(), layout).into_router()
    }

    async fn drop_table(self) {
        self.execute(&format!("DROP TABLE IF EXISTS {}", self.table)).await;
        if let Some(enum_type) = &self.enum_type {
            self.execute(&format!("DROP TYPE IF EXISTS {enum_type}")).await;
        }
        self.provider.close().await;
        self.provider.close().await;
    }
}

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_paginated_newest_first_and_count() {
    let fixture = Fixture::new().await;
    let builder = Dialect::Postgres.query_builder();
    let table = TableName::new(&fixture.table).unwrap();
    let order_by = OrderBy::descending(Identifier::new("created_at").unwrap());

    let rows = fixture
        .provider
        .fetch(&builder.build_paginated(&table, &order_by, 10, 0))
        .await
        .unwrap();
    assert_eq!(rows.len(), 10);

    let timestamps: Vec<&str> = rows
        .iter()
        .map(|row| row["created_at"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_unstable_by(|left, right| right.cmp(left));
    assert_eq!(timestamps, sorted);
    assert_eq!(rows[0]["message"], "event 15");

    let count = fixture.provider.fetch(&builder.build_count(&table, None)).await.unwrap();
    assert_eq!(count[0]["count"], 15);

    let record = fixture
        .provider
        .fetch(&builder.build_by_id(&table, &Identifier::new("id").unwrap(), SqlParameter::Integer(4)))
        .await
        .unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(record[0]["message"], "event 4");

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_dashboard_routes_against_live_table() {
    let fixture = Fixture::new().await;
    let router = fixture.router();

    let (status, body) = get(&router, "/api/data/search?q=ERROR&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 3);

    let (_, body) = get(&router, "/api/data/stats").await;
    assert_eq!(body["total"], 15);
    assert_eq!(body["today"], 0);

    let (status, body) = get(&router, "/api/data/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "event 4");

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_records_keep_table_column_order() {
    let fixture = Fixture::new().await;

    let (_, body) = get(&fixture.router(), "/api/data?limit=1").await;
    let columns: Vec<&str> = body["data"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(columns, ["id", "created_at", "level", "message"]);

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_uuid_keys_resolve() {
    let fixture = Fixture::empty().await;
    let table = &fixture.table;
    let known = uuid::Uuid::new_v4();
    fixture
        .execute(&format!(
            "CREATE TABLE {table} (id UUID PRIMARY KEY, created_at TIMESTAMP NOT NULL, \
             level TEXT NOT NULL, message TEXT NOT NULL)"
        ))
        .await;
    fixture
        .execute(&format!(
            "INSERT INTO {table} VALUES ('{known}', TIMESTAMP '2024-01-01 00:00:00', 'info', 'by uuid')"
        ))
        .await;
    let router = fixture.router();

    let (status, body) = get(&router, &format!("/api/data/{known}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], known.to_string());
    assert_eq!(body["message"], "by uuid");

    let (status, _) = get(&router, &format!("/api/data/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Not a uuid at all: still a miss, never a type error
    let (status, _) = get(&router, "/api/data/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_text_keys_resolve() {
    let fixture = Fixture::empty().await;
    let table = &fixture.table;
    fixture
        .execute(&format!(
            "CREATE TABLE {table} (id TEXT PRIMARY KEY, created_at TIMESTAMP NOT NULL, \
             level TEXT NOT NULL, message TEXT NOT NULL)"
        ))
        .await;
    fixture
        .execute(&format!(
            "INSERT INTO {table} VALUES ('42', TIMESTAMP '2024-01-02 00:00:00', 'warn', 'by number'), \
             ('req-7', TIMESTAMP '2024-01-02 01:00:00', 'info', 'by name')"
        ))
        .await;
    let router = fixture.router();

    let (status, body) = get(&router, "/api/data/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "by number");

    let (status, body) = get(&router, "/api/data/req-7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "by name");

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_enum_level_column() {
    let mut fixture = Fixture::empty().await;
    let enum_type = format!("{}_level", fixture.table);
    let table = fixture.table.clone();
    fixture
        .execute(&format!("CREATE TYPE {enum_type} AS ENUM ('info', 'warn', 'error')"))
        .await;
    fixture.enum_type = Some(enum_type.clone());
    fixture
        .execute(&format!(
            "CREATE TABLE {table} (id SERIAL PRIMARY KEY, created_at TIMESTAMP NOT NULL, \
             level {enum_type} NOT NULL, message TEXT NOT NULL)"
        ))
        .await;
    fixture
        .execute(&format!(
            "INSERT INTO {table} (created_at, level, message) VALUES \
             (TIMESTAMP '2024-01-01 00:00:00', 'info', 'started'), \
             (TIMESTAMP '2024-01-01 01:00:00', 'error', 'disk full'), \
             (TIMESTAMP '2024-01-01 02:00:00', 'error', 'disk still full')"
        ))
        .await;
    let router = fixture.router();

    let (status, body) = get(&router, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["level"], "error");
    assert_eq!(body["data"][2]["level"], "info");

    let (_, body) = get(&router, "/api/data/stats").await;
    let by_level = body["byLevel"].as_array().unwrap();
    assert_eq!(by_level.len(), 2);
    assert!(by_level.iter().all(|level| level["level"].is_string()), "{by_level:?}");

    let (status, body) = get(&router, "/api/data/search?q=erro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    fixture.drop_table().await;
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let fixture = Fixture::new().await;
    let table = &fixture.table;
    fixture
        .execute(&format!(
            "INSERT INTO {table} (created_at, level, message) VALUES \
             (TIMESTAMP '2024-02-01 00:00:00', 'info', 'upload 50% done'), \
             (TIMESTAMP '2024-02-01 01:00:00', 'info', 'upload 500 done')"
        ))
        .await;
    let router = fixture.router();

    let (_, body) = get(&router, "/api/data/search?q=50%25").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["message"], "upload 50% done");

    // `_` would otherwise match any single character, e.g. every "event 1x"
    let (_, body) = get(&router, "/api/data/search?q=event%201_").await;
    assert_eq!(body["pagination"]["total"], 0);

    fixture.drop_table().await;
}
