//! REST API endpoints
//!
//! This module contains the handlers for log listing, search, statistics,
//! single-record lookup and health, plus the state they share.

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::debug;

use crate::database::{DatabaseError, DatabaseProvider, Record};
use crate::query::{QueryBuilder, QuerySpec, TableLayout};

pub mod data;
pub mod error;
pub mod health;

// Re-export handlers for convenience
pub use data::{get_record_handler, get_stats_handler, list_records_handler, search_records_handler};
pub use error::{ApiError, ApiResult};
pub use health::health_handler;

/// State shared by every handler
///
/// The query builder is derived from the provider's dialect when the state
/// is created, so rendered SQL always matches the database it is sent to.
pub struct DashboardState<DB: DatabaseProvider> {
    pub database: Arc<DB>,
    pub layout: Arc<TableLayout>,
    pub environment: Arc<str>,
    builder: &'static dyn QueryBuilder,
}

impl<DB: DatabaseProvider> Clone for DashboardState<DB> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            layout: self.layout.clone(),
            environment: self.environment.clone(),
            builder: self.builder,
        }
    }
}

impl<DB: DatabaseProvider> DashboardState<DB> {
    pub fn new(database: Arc<DB>, layout: TableLayout, environment: impl Into<Arc<str>>) -> Self {
        let builder = database.dialect().query_builder();
        Self {
            database,
            layout: Arc::new(layout),
            environment: environment.into(),
            builder,
        }
    }

    /// Render a spec for this database's dialect and execute it
    pub async fn run(&self, spec: &QuerySpec) -> Result<Vec<Record>, DatabaseError> {
        let query = spec.render(self.builder);
        debug!(
            operation = spec.operation.name(),
            table = %spec.table,
            dialect = %self.builder.dialect(),
            "Running query"
        );
        self.database.fetch(&query).await
    }
}

/// Create the API router with all endpoints
///
/// Routes are relative; the caller nests them under `/api`.
pub fn create_api_router<DB: DatabaseProvider>(state: DashboardState<DB>) -> Router {
    Router::new()
        .route("/data", get(list_records_handler::<DB>))
        .route("/data/search", get(search_records_handler::<DB>))
        .route("/data/stats", get(get_stats_handler::<DB>))
        .route("/data/{id}", get(get_record_handler::<DB>))
        .route("/health", get(health_handler::<DB>))
        .with_state(state)
}
