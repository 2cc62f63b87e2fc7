//! Validated SQL identifiers
//!
//! Table and column names are spliced into SQL text, so they are only ever
//! built from configuration through these constructors. Request input never
//! reaches an identifier.

use std::fmt;

use crate::query::DialectError;

/// Longest identifier accepted (SQL Server's `sysname` limit)
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// A single, unqualified SQL identifier such as a column name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate an identifier
    ///
    /// Accepts ASCII letters, digits and underscores, not starting with a digit.
    pub fn new(name: impl Into<String>) -> Result<Self, DialectError> {
        let name = name.into();
        if is_plain_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(DialectError::InvalidIdentifier(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// A table name, optionally qualified by a schema (`dbo.logs`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    schema: Option<Identifier>,
    name: Identifier,
}

impl TableName {
    /// Parse `table` or `schema.table`
    pub fn new(qualified: &str) -> Result<Self, DialectError> {
        let invalid = || DialectError::InvalidIdentifier(qualified.to_string());

        match qualified.split_once('.') {
            Some((schema, name)) => Ok(Self {
                schema: Some(Identifier::new(schema).map_err(|_| invalid())?),
                name: Identifier::new(name).map_err(|_| invalid())?,
            }),
            None => Ok(Self {
                schema: None,
                name: Identifier::new(qualified)?,
            }),
        }
    }

    pub fn schema(&self) -> Option<&Identifier> {
        self.schema.as_ref()
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    /// Identifier parts in order, schema first
    pub fn parts(&self) -> impl Iterator<Item = &Identifier> {
        self.schema.iter().chain(std::iter::once(&self.name))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(formatter, "{}.{}", schema, self.name),
            None => write!(formatter, "{}", self.name),
        }
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut characters = name.chars();
    let Some(first) = characters.next() else {
        return false;
    };

    name.len() <= MAX_IDENTIFIER_LENGTH
        && (first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
}
