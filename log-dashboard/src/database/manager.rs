//! Connection lifecycle for the configured dialect

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::database::settings::ConnectionSettings;
use crate::database::traits::{DatabaseError, DatabaseProvider, Record};
use crate::query::{Dialect, SqlParameter};

#[cfg(feature = "mssql")]
use crate::database::mssql::MsSqlProvider;
#[cfg(feature = "mysql")]
use crate::database::mysql::MySqlProvider;
#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresProvider;

/// The live pool for whichever dialect was configured
#[derive(Clone)]
enum Backend {
    #[cfg(feature = "postgres")]
    Postgres(PostgresProvider),
    #[cfg(feature = "mysql")]
    MySql(MySqlProvider),
    #[cfg(feature = "mssql")]
    MsSql(MsSqlProvider),
    /// A provider built by the caller
    Attached(Arc<dyn DatabaseProvider>),
}

impl Backend {
    async fn connect(settings: &ConnectionSettings) -> Result<Self, DatabaseError> {
        match settings.dialect {
            #[cfg(feature = "postgres")]
            Dialect::Postgres => Ok(Backend::Postgres(PostgresProvider::connect(settings).await?)),
            #[cfg(feature = "mysql")]
            Dialect::MySql => Ok(Backend::MySql(MySqlProvider::connect(settings).await?)),
            #[cfg(feature = "mssql")]
            Dialect::MsSql => Ok(Backend::MsSql(MsSqlProvider::connect(settings).await?)),
            #[allow(unreachable_patterns)]
            dialect => Err(DatabaseError::Connection(format!(
                "{dialect} support is not enabled in this build"
            ))),
        }
    }

    fn provider(&self) -> &dyn DatabaseProvider {
        match self {
            #[cfg(feature = "postgres")]
            Backend::Postgres(provider) => provider,
            #[cfg(feature = "mysql")]
            Backend::MySql(provider) => provider,
            #[cfg(feature = "mssql")]
            Backend::MsSql(provider) => provider,
            Backend::Attached(provider) => provider.as_ref(),
        }
    }
}

/// Owns the single connection pool of a process
///
/// Construct one per configured database and share it behind an `Arc`.
/// `connect` must succeed before queries run; calling it again replaces the
/// pool, which is the only way to recover from a broken one.
pub struct ConnectionManager {
    settings: ConnectionSettings,
    backend: RwLock<Option<Backend>>,
}

impl ConnectionManager {
    /// Create an unconnected manager
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            backend: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub async fn is_connected(&self) -> bool {
        self.backend.read().await.is_some()
    }

    /// Create the pool and check that one connection can be acquired
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Connection`] carrying the driver's message on bad
    /// host, rejected credentials or failed TLS negotiation.
    pub async fn connect(&self) -> Result<(), DatabaseError> {
        let settings = &self.settings;

        let backend = Backend::connect(settings).await.map_err(|error| {
            error!(
                dialect = %settings.dialect,
                host = %settings.host,
                port = settings.port(),
                error = %error,
                "Database connection failed"
            );
            error
        })?;

        info!(
            dialect = %settings.dialect,
            host = %settings.host,
            port = settings.port(),
            database = %settings.database,
            "Connected to database"
        );

        self.install(backend).await;
        Ok(())
    }

    /// Serve queries from an already connected provider
    ///
    /// Like a repeated `connect`, this closes whatever was installed before.
    /// The provider must speak the configured dialect.
    pub async fn attach(&self, provider: Arc<dyn DatabaseProvider>) {
        debug_assert_eq!(provider.dialect(), self.settings.dialect);
        self.install(Backend::Attached(provider)).await;
    }

    async fn install(&self, backend: Backend) {
        let previous = self.backend.write().await.replace(backend);
        if let Some(previous) = previous {
            previous.provider().close().await;
            debug!(dialect = %self.settings.dialect, "Replaced previous connection");
        }
    }
}

#[async_trait]
impl DatabaseProvider for ConnectionManager {
    fn dialect(&self) -> Dialect {
        self.settings.dialect
    }

    async fn query(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Record>, DatabaseError> {
        // Clone the pool handle so the lock is not held across the round-trip
        let backend = self
            .backend
            .read()
            .await
            .clone()
            .ok_or(DatabaseError::NotConnected)?;

        debug!(sql, parameters = parameters.len(), "Executing query");

        let deadline = self.settings.query_timeout;
        let result = match tokio::time::timeout(deadline, backend.provider().query(sql, parameters)).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(deadline)),
        };

        if let Err(error) = &result {
            error!(sql, error = %error, "Query execution failed");
        }

        result
    }

    async fn close(&self) {
        let backend = self.backend.write().await.take();
        if let Some(backend) = backend {
            backend.provider().close().await;
            info!(dialect = %self.settings.dialect, "Database connection closed");
        }
    }
}
