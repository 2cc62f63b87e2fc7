//! # log-dashboard
//!
//! A read-only web dashboard over a single log table in PostgreSQL, MySQL or
//! Microsoft SQL Server, easily integrable as an Axum layer.
//!
//! ## Features
//!
//! - Paginated listing, newest records first
//! - Case-insensitive search across configurable columns
//! - Total, today and per-level statistics
//! - Single-record lookup and a database health check
//! - One query builder per dialect, chosen once from configuration
//!
//! Every value that reaches the database is bound as a parameter. Table and
//! column names come from configuration and are validated as identifiers
//! before they are quoted into SQL.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use log_dashboard::{ConnectionManager, ConnectionSettings, DashboardLayer, Dialect, TableLayout};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dialect: Dialect = "mysql".parse()?;
//!     let settings = ConnectionSettings::new(dialect, "localhost", "app", "reader", "secret");
//!
//!     let manager = Arc::new(ConnectionManager::new(settings));
//!     manager.connect().await?;
//!
//!     let app = DashboardLayer::new(manager, TableLayout::new("logs")?).into_router();
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres", feature = "mysql", feature = "mssql")))]
compile_error!("enable at least one of the `postgres`, `mysql` or `mssql` features");

// Public modules
pub mod api;
pub mod database;
pub mod frontend;
pub mod layer;
pub mod query;
pub mod schema;

// Public exports
pub use layer::DashboardLayer;
pub use query::{query_builder_for, Dialect, DialectError, QueryBuilder, SqlParameter, SqlQuery, TableLayout};
pub use schema::{DataResponse, HealthResponse, Pagination, SearchResponse, StatsResponse};

// Re-export database types
pub use database::{ConnectionManager, ConnectionSettings, DatabaseError, DatabaseProvider, Record};

#[cfg(feature = "postgres")]
pub use database::postgres::PostgresProvider;

#[cfg(feature = "mysql")]
pub use database::mysql::MySqlProvider;

#[cfg(feature = "mssql")]
pub use database::mssql::MsSqlProvider;
