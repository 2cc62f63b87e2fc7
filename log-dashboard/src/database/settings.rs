//! Connection settings shared by every backend

use std::fmt;
use std::time::Duration;

use crate::query::Dialect;

/// Connections kept open at most
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Idle connections are closed after this long
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `connect` and each query wait for a free connection
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for a single query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to connect
#[derive(Clone)]
pub struct ConnectionSettings {
    pub dialect: Dialect,
    pub host: String,
    /// Falls back to the dialect's default port when unset
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Require an encrypted connection (server certificate is not verified)
    pub tls: bool,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

impl ConnectionSettings {
    pub fn new(
        dialect: Dialect,
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            host: host.into(),
            port: None,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            tls: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Configured port, or the dialect default
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.dialect.default_port())
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectionSettings")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port())
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .field("max_connections", &self.max_connections)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}
