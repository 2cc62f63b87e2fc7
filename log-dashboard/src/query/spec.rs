//! Dialect-independent descriptions of the reads the dashboard performs

use crate::query::{DialectError, Identifier, QueryBuilder, SqlParameter, SqlQuery, TableName};

/// Largest page the routes will request
pub const MAX_PAGE_LIMIT: u64 = 500;

/// Page size used when none is requested
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Escape character of every LIKE pattern the builders render
pub const LIKE_ESCAPE: char = '!';

/// Sort order for ordered reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Identifier,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn ascending(column: Identifier) -> Self {
        Self {
            column,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column: Identifier) -> Self {
        Self {
            column,
            order: SortOrder::Descending,
        }
    }
}

/// Search term and the columns it is matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    columns: Vec<Identifier>,
    term: String,
}

impl SearchFilter {
    pub fn new(columns: Vec<Identifier>, term: impl Into<String>) -> Result<Self, DialectError> {
        if columns.is_empty() {
            return Err(DialectError::EmptySearchColumns);
        }

        Ok(Self {
            columns,
            term: term.into(),
        })
    }

    pub fn columns(&self) -> &[Identifier] {
        &self.columns
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// The term as a LIKE pattern fragment that matches literally
    ///
    /// `%` and `_` are wildcards in every dialect and `[` opens a character
    /// class in SQL Server, so each is prefixed with [`LIKE_ESCAPE`].
    pub(crate) fn term_parameter(&self) -> SqlParameter {
        let mut pattern = String::with_capacity(self.term.len());
        for character in self.term.chars() {
            if matches!(character, '%' | '_' | '[') || character == LIKE_ESCAPE {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(character);
        }
        SqlParameter::Text(pattern)
    }
}

/// A 1-based page of `limit` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    limit: u64,
}

impl PageWindow {
    /// Page numbers below 1 become 1; limits are kept within `1..=MAX_PAGE_LIMIT`
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` rows
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// A read operation before it is rendered to SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List {
        order_by: OrderBy,
        window: PageWindow,
    },
    Search {
        filter: SearchFilter,
        order_by: OrderBy,
        window: PageWindow,
    },
    Count {
        filter: Option<SearchFilter>,
    },
    CountToday {
        date_column: Identifier,
    },
    CountByLevel {
        level_column: Identifier,
    },
    GetById {
        id_column: Identifier,
        id: SqlParameter,
    },
}

impl Operation {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Operation::List { .. } => "list",
            Operation::Search { .. } => "search",
            Operation::Count { .. } => "count",
            Operation::CountToday { .. } => "count-today",
            Operation::CountByLevel { .. } => "count-by-level",
            Operation::GetById { .. } => "get-by-id",
        }
    }
}

/// An operation against a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub table: TableName,
    pub operation: Operation,
}

impl QuerySpec {
    /// Render to SQL for the builder's dialect
    pub fn render(&self, builder: &dyn QueryBuilder) -> SqlQuery {
        let table = &self.table;
        match &self.operation {
            Operation::List { order_by, window } => {
                builder.build_paginated(table, order_by, window.limit(), window.offset())
            }
            Operation::Search {
                filter,
                order_by,
                window,
            } => builder.build_search(table, filter, order_by, window.limit(), window.offset()),
            Operation::Count { filter } => builder.build_count(table, filter.as_ref()),
            Operation::CountToday { date_column } => builder.build_today_count(table, date_column),
            Operation::CountByLevel { level_column } => builder.build_by_level(table, level_column),
            Operation::GetById { id_column, id } => builder.build_by_id(table, id_column, id.clone()),
        }
    }
}

/// Where log records live and which columns the dashboard relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    table: TableName,
    id_column: Identifier,
    timestamp_column: Identifier,
    level_column: Identifier,
    search_columns: Vec<Identifier>,
}

impl TableLayout {
    /// Layout with the default column names (`id`, `created_at`, `level`,
    /// searching `message` and `level`)
    pub fn new(table: &str) -> Result<Self, DialectError> {
        Ok(Self {
            table: TableName::new(table)?,
            id_column: Identifier::new("id")?,
            timestamp_column: Identifier::new("created_at")?,
            level_column: Identifier::new("level")?,
            search_columns: vec![Identifier::new("message")?, Identifier::new("level")?],
        })
    }

    pub fn with_id_column(mut self, column: &str) -> Result<Self, DialectError> {
        self.id_column = Identifier::new(column)?;
        Ok(self)
    }

    pub fn with_timestamp_column(mut self, column: &str) -> Result<Self, DialectError> {
        self.timestamp_column = Identifier::new(column)?;
        Ok(self)
    }

    pub fn with_level_column(mut self, column: &str) -> Result<Self, DialectError> {
        self.level_column = Identifier::new(column)?;
        Ok(self)
    }

    pub fn with_search_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Result<Self, DialectError> {
        let columns = columns
            .iter()
            .map(|column| Identifier::new(column.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(DialectError::EmptySearchColumns);
        }

        self.search_columns = columns;
        Ok(self)
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn search_columns(&self) -> &[Identifier] {
        &self.search_columns
    }

    /// Newest records first
    pub fn default_order(&self) -> OrderBy {
        OrderBy::descending(self.timestamp_column.clone())
    }

    fn search_filter(&self, term: &str) -> SearchFilter {
        SearchFilter {
            columns: self.search_columns.clone(),
            term: term.to_string(),
        }
    }

    fn spec(&self, operation: Operation) -> QuerySpec {
        QuerySpec {
            table: self.table.clone(),
            operation,
        }
    }

    pub fn list(&self, window: PageWindow) -> QuerySpec {
        self.spec(Operation::List {
            order_by: self.default_order(),
            window,
        })
    }

    pub fn search(&self, term: &str, window: PageWindow) -> QuerySpec {
        self.spec(Operation::Search {
            filter: self.search_filter(term),
            order_by: self.default_order(),
            window,
        })
    }

    pub fn count(&self) -> QuerySpec {
        self.spec(Operation::Count { filter: None })
    }

    pub fn count_matching(&self, term: &str) -> QuerySpec {
        self.spec(Operation::Count {
            filter: Some(self.search_filter(term)),
        })
    }

    pub fn count_today(&self) -> QuerySpec {
        self.spec(Operation::CountToday {
            date_column: self.timestamp_column.clone(),
        })
    }

    pub fn count_by_level(&self) -> QuerySpec {
        self.spec(Operation::CountByLevel {
            level_column: self.level_column.clone(),
        })
    }

    pub fn by_id(&self, id: &str) -> QuerySpec {
        self.spec(Operation::GetById {
            id_column: self.id_column.clone(),
            id: SqlParameter::from_record_id(id),
        })
    }
}
