//! Database provider trait
//!
//! This trait defines the `query(sql, params) -> rows` contract the routes run
//! against. The [`ConnectionManager`](crate::database::ConnectionManager)
//! implements it for live databases; tests substitute their own.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::{Dialect, SqlParameter, SqlQuery};

/// One result row: column name to value, in column order
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Database provider trait for executing rendered queries
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// Dialect the SQL sent to this provider must be written in
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return its rows in result order
    ///
    /// # Arguments
    ///
    /// * `sql` - SQL text using this dialect's placeholder syntax
    /// * `parameters` - Values bound to the placeholders, in binding order
    ///
    /// # Returns
    ///
    /// The plain row sequence, never a driver-specific result envelope
    async fn query(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Record>, DatabaseError>;

    /// Release all connections. Calling it again is a no-op.
    async fn close(&self);

    /// Execute a rendered [`SqlQuery`]
    async fn fetch(&self, query: &SqlQuery) -> Result<Vec<Record>, DatabaseError> {
        self.query(&query.sql, &query.parameters).await
    }

    /// Round-trip a trivial statement to check the database is reachable
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.query("SELECT 1", &[]).await.map(|_| ())
    }
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Pool could not be created or the liveness probe failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement failed to execute or its rows failed to decode
    #[error("Query error: {0}")]
    Query(String),

    /// `query` was called before `connect` or after `close`
    #[error("Database is not connected")]
    NotConnected,

    /// Query deadline exceeded
    #[error("Query timeout exceeded ({0:?})")]
    Timeout(Duration),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}

#[cfg(feature = "mssql")]
impl From<tiberius::error::Error> for DatabaseError {
    fn from(error: tiberius::error::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_insertion_order() {
        let mut record = Record::new();
        for (column, value) in [("id", json!(1)), ("created_at", json!("2024-01-01T00:00:00")), ("level", json!("info"))] {
            record.insert(column.to_string(), value);
        }

        assert_eq!(record.keys().collect::<Vec<_>>(), ["id", "created_at", "level"]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":1,"created_at":"2024-01-01T00:00:00","level":"info"}"#
        );
    }
}
