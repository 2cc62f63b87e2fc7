//! Query builder trait and dialect selection

use std::fmt;
use std::str::FromStr;

use crate::query::mssql::MsSqlQueryBuilder;
use crate::query::mysql::MySqlQueryBuilder;
use crate::query::postgres::PostgresQueryBuilder;
use crate::query::spec::{OrderBy, SearchFilter, SortOrder};
use crate::query::{DialectError, Identifier, SqlParameter, SqlQuery, TableName};

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    MsSql,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Postgres, Dialect::MySql, Dialect::MsSql];

    /// Canonical configuration tag
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::MsSql => "mssql",
        }
    }

    /// Port used when none is configured
    pub fn default_port(self) -> u16 {
        match self {
            Dialect::Postgres => 5432,
            Dialect::MySql => 3306,
            Dialect::MsSql => 1433,
        }
    }

    /// The builder rendering SQL for this dialect
    pub fn query_builder(self) -> &'static dyn QueryBuilder {
        match self {
            Dialect::Postgres => &PostgresQueryBuilder,
            Dialect::MySql => &MySqlQueryBuilder,
            Dialect::MsSql => &MsSqlQueryBuilder,
        }
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "mssql" | "sqlserver" => Ok(Dialect::MsSql),
            _ => Err(DialectError::UnsupportedDialect(tag.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Resolve a configuration tag straight to its builder
pub fn query_builder_for(tag: &str) -> Result<&'static dyn QueryBuilder, DialectError> {
    tag.parse::<Dialect>().map(Dialect::query_builder)
}

/// Renders SQL for one dialect
///
/// Implementations hold no state. Every method is deterministic: the same
/// inputs always produce the same SQL text and parameter list, and the
/// placeholders in the text line up with the parameter list in the order the
/// dialect's driver binds them.
pub trait QueryBuilder: Send + Sync + 'static {
    /// Dialect this builder renders for
    fn dialect(&self) -> Dialect;

    /// Quote a single identifier
    fn quote_identifier(&self, identifier: &Identifier) -> String;

    /// Paginated `SELECT *` ordered by `order_by`
    ///
    /// # Arguments
    ///
    /// * `table` - Table to read from
    /// * `order_by` - Ordering (required; OFFSET/FETCH dialects reject unordered pages)
    /// * `limit` - Maximum number of rows
    /// * `offset` - Rows to skip
    fn build_paginated(&self, table: &TableName, order_by: &OrderBy, limit: u64, offset: u64) -> SqlQuery;

    /// OR-combined, case-insensitive substring match across the filter's columns
    ///
    /// Returns the condition (without `WHERE`) and its parameters. Placeholders
    /// are numbered from `first_position` (1-based) in dialects that number them.
    fn search_condition(&self, filter: &SearchFilter, first_position: usize) -> (String, Vec<SqlParameter>);

    /// Paginated search, ordered by `order_by`
    ///
    /// The first parameter is always the search term.
    fn build_search(
        &self,
        table: &TableName,
        filter: &SearchFilter,
        order_by: &OrderBy,
        limit: u64,
        offset: u64,
    ) -> SqlQuery;

    /// Count of rows whose `date_column` falls on the server's current local day
    fn build_today_count(&self, table: &TableName, date_column: &Identifier) -> SqlQuery;

    /// Single row lookup by key
    fn build_by_id(&self, table: &TableName, id_column: &Identifier, id: SqlParameter) -> SqlQuery;

    /// Base tables of the current database, as a `table_name` column
    fn build_list_tables(&self) -> SqlQuery;

    /// Column name, data type and nullability of a table
    fn build_columns(&self, table: &TableName) -> SqlQuery;

    /// First `rows` rows of a table, in storage order
    fn build_sample(&self, table: &TableName, rows: u64) -> SqlQuery;

    /// Quote a possibly schema-qualified table name
    fn quote_table(&self, table: &TableName) -> String {
        table
            .parts()
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `<column> ASC|DESC`
    fn order_clause(&self, order_by: &OrderBy) -> String {
        let direction = match order_by.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        format!("{} {}", self.quote_identifier(&order_by.column), direction)
    }

    /// `SELECT COUNT(*)`, optionally restricted to rows matching a search
    fn build_count(&self, table: &TableName, search: Option<&SearchFilter>) -> SqlQuery {
        let mut sql = format!("SELECT COUNT(*) AS count FROM {}", self.quote_table(table));

        let parameters = match search {
            Some(filter) => {
                let (condition, parameters) = self.search_condition(filter, 1);
                sql.push_str(&format!(" WHERE {}", condition));
                parameters
            }
            None => Vec::new(),
        };

        SqlQuery::new(sql, parameters)
    }

    /// Row count per level value
    fn build_by_level(&self, table: &TableName, level_column: &Identifier) -> SqlQuery {
        let level = self.quote_identifier(level_column);
        SqlQuery::plain(format!(
            "SELECT {level} AS level, COUNT(*) AS count FROM {} GROUP BY {level}",
            self.quote_table(table)
        ))
    }
}
