//! SQL Server query builder
//!
//! Parameters are named `@P1`, `@P2`, ... in binding order, which is how the
//! driver declares positional parameters to `sp_executesql`. Pagination uses
//! `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY`, so the offset is bound before the
//! limit.

use crate::query::builder::{Dialect, QueryBuilder};
use crate::query::spec::{OrderBy, SearchFilter, LIKE_ESCAPE};
use crate::query::{Identifier, SqlParameter, SqlQuery, TableName};

/// SQL Server query builder
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSqlQueryBuilder;

fn placeholder(position: usize) -> String {
    format!("@P{}", position)
}

/// `OFFSET @Pn ROWS FETCH NEXT @Pn+1 ROWS ONLY` with its parameters, offset first
fn offset_fetch(first_position: usize, limit: u64, offset: u64) -> (String, Vec<SqlParameter>) {
    (
        format!(
            "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
            placeholder(first_position),
            placeholder(first_position + 1)
        ),
        vec![offset.into(), limit.into()],
    )
}

impl QueryBuilder for MsSqlQueryBuilder {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    fn quote_identifier(&self, identifier: &Identifier) -> String {
        format!("[{}]", identifier.as_str().replace(']', "]]"))
    }

    fn build_paginated(&self, table: &TableName, order_by: &OrderBy, limit: u64, offset: u64) -> SqlQuery {
        let (window, parameters) = offset_fetch(1, limit, offset);
        SqlQuery::new(
            format!(
                "SELECT * FROM {} ORDER BY {} {}",
                self.quote_table(table),
                self.order_clause(order_by),
                window
            ),
            parameters,
        )
    }

    fn search_condition(&self, filter: &SearchFilter, first_position: usize) -> (String, Vec<SqlParameter>) {
        let term = placeholder(first_position);
        let condition = filter
            .columns()
            .iter()
            .map(|column| {
                format!(
                    "{} LIKE '%' + {} + '%' ESCAPE '{}'",
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
        let (window, window_parameters) = offset_fetch(parameters.len() + 1, limit, offset);
        parameters.extend(window_parameters);

        SqlQuery::new(
            format!(
                "SELECT * FROM {} WHERE {} ORDER BY {} {}",
                self.quote_table(table),
                condition,
                self.order_clause(order_by),
                window
            ),
            parameters,
        )
    }

    fn build_today_count(&self, table: &TableName, date_column: &Identifier) -> SqlQuery {
        SqlQuery::plain(format!(
            "SELECT COUNT(*) AS count FROM {} WHERE CAST({} AS DATE) = CAST(GETDATE() AS DATE)",
            self.quote_table(table),
            self.quote_identifier(date_column)
        ))
    }

    fn build_by_id(&self, table: &TableName, id_column: &Identifier, id: SqlParameter) -> SqlQuery {
        SqlQuery::new(
            format!(
                "SELECT * FROM {} WHERE {} = @P1",
                self.quote_table(table),
                self.quote_identifier(id_column)
            ),
            vec![id],
        )
    }

    fn build_list_tables(&self) -> SqlQuery {
        SqlQuery::plain(
            "SELECT TABLE_NAME AS table_name \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_CATALOG = DB_NAME() AND TABLE_TYPE = 'BASE TABLE' \
             ORDER BY TABLE_NAME",
        )
    }

    fn build_columns(&self, table: &TableName) -> SqlQuery {
        let select = "SELECT COLUMN_NAME AS column_name, DATA_TYPE AS data_type, \
                      IS_NULLABLE AS is_nullable FROM INFORMATION_SCHEMA.COLUMNS";

        match table.schema() {
            Some(schema) => SqlQuery::new(
                format!("{select} WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 ORDER BY ORDINAL_POSITION"),
                vec![schema.as_str().into(), table.name().as_str().into()],
            ),
            None => SqlQuery::new(
                format!("{select} WHERE TABLE_SCHEMA = SCHEMA_NAME() AND TABLE_NAME = @P1 ORDER BY ORDINAL_POSITION"),
                vec![table.name().as_str().into()],
            ),
        }
    }

    fn build_sample(&self, table: &TableName, rows: u64) -> SqlQuery {
        SqlQuery::new(
            format!("SELECT TOP (@P1) * FROM {}", self.quote_table(table)),
            vec![rows.into()],
        )
    }
}
