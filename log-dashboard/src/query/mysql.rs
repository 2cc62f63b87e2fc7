//! MySQL query builder
//!
//! Anonymous `?` placeholders bind strictly left to right, so a value that
//! appears in several places is bound once per appearance.

use crate::query::builder::{Dialect, QueryBuilder};
use crate::query::spec::{OrderBy, SearchFilter, LIKE_ESCAPE};
use crate::query::{Identifier, SqlParameter, SqlQuery, TableName};

/// MySQL query builder
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQueryBuilder;

impl QueryBuilder for MySqlQueryBuilder {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote_identifier(&self, identifier: &Identifier) -> String {
        format!("`{}`", identifier.as_str().replace('`', "``"))
    }

    fn build_paginated(&self, table: &TableName, order_by: &OrderBy, limit: u64, offset: u64) -> SqlQuery {
        SqlQuery::new(
            format!(
                "SELECT * FROM {} ORDER BY {} LIMIT ? OFFSET ?",
                self.quote_table(table),
                self.order_clause(order_by)
            ),
            vec![limit.into(), offset.into()],
        )
    }

    fn search_condition(&self, filter: &SearchFilter, _first_position: usize) -> (String, Vec<SqlParameter>) {
        let condition = filter
            .columns()
            .iter()
            .map(|column| {
                format!(
                    "{} LIKE CONCAT('%', ?, '%') ESCAPE '{}'",
                    self.quote_identifier(column),
                    LIKE_ESCAPE
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        let parameters = filter.columns().iter().map(|_| filter.term_parameter()).collect();

        (condition, parameters)
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

        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            self.quote_table(table),
            condition,
            self.order_clause(order_by)
        );
        parameters.extend([limit.into(), offset.into()]);

        SqlQuery::new(sql, parameters)
    }

    fn build_today_count(&self, table: &TableName, date_column: &Identifier) -> SqlQuery {
        SqlQuery::plain(format!(
            "SELECT COUNT(*) AS count FROM {} WHERE DATE({}) = CURDATE()",
            self.quote_table(table),
            self.quote_identifier(date_column)
        ))
    }

    fn build_by_id(&self, table: &TableName, id_column: &Identifier, id: SqlParameter) -> SqlQuery {
        SqlQuery::new(
            format!(
                "SELECT * FROM {} WHERE {} = ?",
                self.quote_table(table),
                self.quote_identifier(id_column)
            ),
            vec![id],
        )
    }

    fn build_list_tables(&self) -> SqlQuery {
        SqlQuery::plain(
            "SELECT table_name AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
    }

    fn build_columns(&self, table: &TableName) -> SqlQuery {
        let select = "SELECT column_name AS column_name, data_type AS data_type, \
                      is_nullable AS is_nullable FROM information_schema.columns";

        match table.schema() {
            Some(schema) => SqlQuery::new(
                format!("{select} WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position"),
                vec![schema.as_str().into(), table.name().as_str().into()],
            ),
            None => SqlQuery::new(
                format!("{select} WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position"),
                vec![table.name().as_str().into()],
            ),
        }
    }

    fn build_sample(&self, table: &TableName, rows: u64) -> SqlQuery {
        SqlQuery::new(
            format!("SELECT * FROM {} LIMIT ?", self.quote_table(table)),
            vec![rows.into()],
        )
    }
}
