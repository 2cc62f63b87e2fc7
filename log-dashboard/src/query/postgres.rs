//! PostgreSQL query builder
//!
//! Numbered `$n` placeholders; a bound value can be referenced more than once.

use crate::query::builder::{Dialect, QueryBuilder};
use crate::query::spec::{OrderBy, SearchFilter, LIKE_ESCAPE};
use crate::query::{Identifier, SqlParameter, SqlQuery, TableName};

/// PostgreSQL query builder
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQueryBuilder;

fn placeholder(position: usize) -> String {
    format!("${}", position)
}

impl QueryBuilder for PostgresQueryBuilder {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote_identifier(&self, identifier: &Identifier) -> String {
        format!("\"{}\"", identifier.as_str().replace('"', "\"\""))
    }

    fn build_paginated(&self, table: &TableName, order_by: &OrderBy, limit: u64, offset: u64) -> SqlQuery {
        SqlQuery::new(
            format!(
                "SELECT * FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
                self.quote_table(table),
                self.order_clause(order_by)
            ),
            vec![limit.into(), offset.into()],
        )
    }

    fn search_condition(&self, filter: &SearchFilter, first_position: usize) -> (String, Vec<SqlParameter>) {
        let term = placeholder(first_position);
        let condition = filter
            .columns()
            .iter()
            .map(|column| {
                format!(
                    "{}::text ILIKE '%' || {} || '%' ESCAPE '{}'",
                    self.quote_identifier(column),
                    term,
                    LIKE_ESCAPE
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");

        (condition, vec![filter.term_parameter()])
    }

    fn build_search(
        &self,
        table: &TableName,
        filter: &SearchFilter,
        order_by: &OrderBy,
        limit: u64,
        offset: u64,
    ) -> SqlQuery {
        let (condition, mut parameters) = self.search_condition(filter, 1);
        let bound = parameters.len();

        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            self.quote_table(table),
            condition,
            self.order_clause(order_by),
            placeholder(bound + 1),
            placeholder(bound + 2)
        );
        parameters.extend([limit.into(), offset.into()]);

        SqlQuery::new(sql, parameters)
    }

    fn build_today_count(&self, table: &TableName, date_column: &Identifier) -> SqlQuery {
        SqlQuery::plain(format!(
            "SELECT COUNT(*) AS count FROM {} WHERE DATE({}) = CURRENT_DATE",
            self.quote_table(table),
            self.quote_identifier(date_column)
        ))
    }

    /// The key is compared as text: PostgreSQL has no implicit cast between
    /// text and uuid or integer keys
    fn build_by_id(&self, table: &TableName, id_column: &Identifier, id: SqlParameter) -> SqlQuery {
        SqlQuery::new(
            format!(
                "SELECT * FROM {} WHERE {}::text = $1",
                self.quote_table(table),
                self.quote_identifier(id_column)
            ),
            vec![id.into_text()],
        )
    }

    fn build_list_tables(&self) -> SqlQuery {
        SqlQuery::plain(
            "SELECT table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
    }

    fn build_columns(&self, table: &TableName) -> SqlQuery {
        let select = "SELECT column_name::text AS column_name, data_type::text AS data_type, \
                      is_nullable::text AS is_nullable FROM information_schema.columns";

        match table.schema() {
            Some(schema) => SqlQuery::new(
                format!("{select} WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position"),
                vec![schema.as_str().into(), table.name().as_str().into()],
            ),
            None => SqlQuery::new(
                format!(
                    "{select} WHERE table_schema = current_schema() AND table_name = $1 ORDER BY ordinal_position"
                ),
                vec![table.name().as_str().into()],
            ),
        }
    }

    fn build_sample(&self, table: &TableName, rows: u64) -> SqlQuery {
        SqlQuery::new(
            format!("SELECT * FROM {} LIMIT $1", self.quote_table(table)),
            vec![rows.into()],
        )
    }
}
