//! Database abstraction layer
//!
//! This module provides the dialect-agnostic `query(sql, params) -> rows`
//! contract, one provider per supported backend, and the connection manager
//! that owns the process's pool.

mod convert;
pub mod manager;
pub mod settings;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "mssql")]
pub mod mssql;

// Re-export the main types
pub use manager::ConnectionManager;
pub use settings::ConnectionSettings;
pub use traits::{DatabaseError, DatabaseProvider, Record};
