//! DashboardLayer - Main Axum integration layer
//!
//! Bundles the API and the dashboard page into one router that can be served
//! directly or merged into an existing application.

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{create_api_router, DashboardState};
use crate::database::DatabaseProvider;
use crate::frontend::create_frontend_router;
use crate::query::TableLayout;

/// Main layer for mounting the log dashboard in an Axum application
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use log_dashboard::{ConnectionManager, ConnectionSettings, DashboardLayer, Dialect, TableLayout};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ConnectionSettings::new(Dialect::Postgres, "localhost", "app", "app", "secret");
/// let manager = Arc::new(ConnectionManager::new(settings));
/// manager.connect().await?;
///
/// let app = DashboardLayer::new(manager, TableLayout::new("logs")?)
///     .with_environment("production")
///     .into_router();
/// # drop(app);
/// # Ok(())
/// # }
/// ```
pub struct DashboardLayer<DB: DatabaseProvider> {
    base_path: String,
    database: Arc<DB>,
    layout: TableLayout,
    environment: String,
}

impl<DB: DatabaseProvider> DashboardLayer<DB> {
    /// Dashboard at the root path, reporting the "development" environment
    pub fn new(database: Arc<DB>, layout: TableLayout) -> Self {
        Self {
            base_path: String::new(),
            database,
            layout,
            environment: "development".to_string(),
        }
    }

    /// Environment name reported by the health endpoint
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Mount under a prefix such as `/logs` instead of the root
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert into an Axum Router
    ///
    /// The returned router includes:
    /// - The dashboard page at `{base_path}/`
    /// - API endpoints at `{base_path}/api/*`
    /// - Request tracing and permissive CORS
    pub fn into_router(self) -> Router {
        let state = DashboardState::new(self.database, self.layout, self.environment);
        let api_router = create_api_router(state);
        let frontend_router = create_frontend_router(&self.base_path);

        // Axum 0.8 rejects nesting at the root, so the unprefixed case merges
        let router = if self.base_path.is_empty() {
            Router::new().nest("/api", api_router).merge(frontend_router)
        } else {
            Router::new()
                .nest(&format!("{}/api", self.base_path), api_router)
                .nest(&self.base_path, frontend_router)
        };

        router.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeDatabase;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn layer() -> DashboardLayer<FakeDatabase> {
        DashboardLayer::new(
            Arc::new(FakeDatabase::fifteen_logs()),
            TableLayout::new("logs").unwrap(),
        )
    }

    async fn status(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_root_mount() {
        let router = layer().into_router();
        assert_eq!(status(router.clone(), "/").await, StatusCode::OK);
        assert_eq!(status(router.clone(), "/api/health").await, StatusCode::OK);
        assert_eq!(status(router.clone(), "/api/data").await, StatusCode::OK);
        assert_eq!(status(router, "/api/unknown").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_prefixed_mount() {
        let router = layer().with_base_path("/logs/").into_router();
        assert_eq!(status(router.clone(), "/logs").await, StatusCode::OK);
        assert_eq!(status(router.clone(), "/logs/api/data/stats").await, StatusCode::OK);
        assert_eq!(status(router, "/api/data").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let response = layer()
            .into_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }
}
