//! Dialect-specific SQL generation
//!
//! Everything in this module is pure: a [`QueryBuilder`] turns table names,
//! ordering, search and pagination parameters into a [`SqlQuery`] whose
//! placeholders and parameter order match the binding convention of the
//! database it targets. The builder for a dialect is chosen once from
//! configuration via [`Dialect::query_builder`].

use std::fmt;

use thiserror::Error;

pub mod builder;
pub mod identifier;
pub mod mssql;
pub mod mysql;
pub mod postgres;
pub mod spec;

pub use builder::{query_builder_for, Dialect, QueryBuilder};
pub use identifier::{Identifier, TableName};
pub use mssql::MsSqlQueryBuilder;
pub use mysql::MySqlQueryBuilder;
pub use postgres::PostgresQueryBuilder;
pub use spec::{Operation, OrderBy, PageWindow, QuerySpec, SearchFilter, SortOrder, TableLayout};

/// Errors raised while configuring or rendering queries
///
/// These all surface before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// Dialect tag not one of postgresql, mysql, mssql
    #[error("Unsupported database type: {0}")]
    UnsupportedDialect(String),

    /// Table or column name that is not a plain SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A search needs at least one column to match against
    #[error("At least one search column is required")]
    EmptySearchColumns,
}

/// A positional parameter bound alongside the SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParameter {
    Integer(i64),
    Text(String),
}

impl SqlParameter {
    /// Interpret a record id taken from a request path
    ///
    /// Numeric ids bind as integers so they compare against integer key
    /// columns without a cast; anything else binds as text.
    pub fn from_record_id(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(value) => Self::Integer(value),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// The same value as text
    pub fn into_text(self) -> Self {
        match self {
            Self::Integer(value) => Self::Text(value.to_string()),
            text => text,
        }
    }
}

impl From<u64> for SqlParameter {
    fn from(value: u64) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for SqlParameter {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for SqlParameter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Text(value) => write!(formatter, "{value:?}"),
        }
    }
}

/// Rendered SQL text plus the parameters to bind, in binding order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub parameters: Vec<SqlParameter>,
}

impl SqlQuery {
    pub fn new(sql: impl Into<String>, parameters: Vec<SqlParameter>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }

    /// A statement without parameters
    pub fn plain(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_binding() {
        assert_eq!(SqlParameter::from_record_id("42"), SqlParameter::Integer(42));
        assert_eq!(SqlParameter::from_record_id(" 7 "), SqlParameter::Integer(7));
        assert_eq!(
            SqlParameter::from_record_id("3f1c-aa"),
            SqlParameter::Text("3f1c-aa".to_string())
        );
    }

    #[test]
    fn test_into_text() {
        assert_eq!(SqlParameter::Integer(42).into_text(), SqlParameter::Text("42".to_string()));
        assert_eq!(
            SqlParameter::Text("a1".to_string()).into_text(),
            SqlParameter::Text("a1".to_string())
        );
    }

    #[test]
    fn test_unsigned_parameters_saturate() {
        assert_eq!(SqlParameter::from(u64::MAX), SqlParameter::Integer(i64::MAX));
        assert_eq!(SqlParameter::from(50u64), SqlParameter::Integer(50));
    }
}
