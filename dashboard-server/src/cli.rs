use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use log_dashboard::{ConnectionSettings, Dialect, DialectError, TableLayout};

#[derive(Parser, Debug, Clone)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "Log dashboard server",
    long_about = "Serves a read-only dashboard over one log table in PostgreSQL, MySQL or SQL Server"
)]
pub struct CliArguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Database dialect: postgresql, mysql or mssql
    #[arg(long, env = "DB_TYPE", default_value = "postgresql")]
    pub db_type: Dialect,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Defaults to 5432, 3306 or 1433 depending on the dialect
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    #[arg(long, env = "DB_NAME")]
    pub db_name: String,

    #[arg(long, env = "DB_USER")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Require TLS for the database connection
    #[arg(long, env = "DB_SSL", default_value_t = false)]
    pub db_ssl: bool,

    /// Table holding the log records, optionally schema-qualified
    #[arg(long, env = "LOG_TABLE", default_value = "logs")]
    pub log_table: String,

    /// Comma-separated columns matched by the search endpoint
    #[arg(long, env = "LOG_SEARCH_COLUMNS", default_value = "message,level", value_delimiter = ',')]
    pub search_columns: Vec<String>,

    /// Listen address
    ///
    /// Example: 0.0.0.0:3000
    #[arg(short = 'a', long, env = "SERVER_ADDRESS", default_value = "127.0.0.1:3000")]
    pub address: SocketAddr,

    /// Environment name reported by /api/health
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    /// Per-query deadline in seconds
    #[arg(long, env = "DB_QUERY_TIMEOUT", default_value_t = 30)]
    pub query_timeout: u64,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve the dashboard (default)
    Serve,

    /// Connect, describe the log table and exit
    Check,
}

impl CliArguments {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(
            self.db_type,
            self.db_host.clone(),
            self.db_name.clone(),
            self.db_user.clone(),
            self.db_password.clone(),
        )
        .with_port(self.db_port)
        .with_tls(self.db_ssl)
        .with_query_timeout(Duration::from_secs(self.query_timeout))
    }

    pub fn table_layout(&self) -> Result<TableLayout, DialectError> {
        TableLayout::new(&self.log_table)?.with_search_columns(&self.search_columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(arguments: &[&str]) -> Result<CliArguments, clap::Error> {
        let base = ["dashboard-server", "--db-name", "app", "--db-user", "reader"];
        CliArguments::try_parse_from(base.iter().chain(arguments).copied())
    }

    #[test]
    fn test_defaults() {
        let arguments = parse(&[]).unwrap();
        assert_eq!(arguments.command(), Command::Serve);
        assert_eq!(arguments.db_type, Dialect::Postgres);
        assert_eq!(arguments.search_columns, vec!["message", "level"]);

        let settings = arguments.connection_settings();
        assert_eq!(settings.port(), 5432);
        assert_eq!(settings.query_timeout, Duration::from_secs(30));
        assert!(!settings.tls);
    }

    #[test]
    fn test_dialect_aliases_and_ports() {
        let arguments = parse(&["--db-type", "sqlserver", "check"]).unwrap();
        assert_eq!(arguments.command(), Command::Check);
        assert_eq!(arguments.connection_settings().port(), 1433);

        let arguments = parse(&["--db-type", "mysql", "--db-port", "3307"]).unwrap();
        assert_eq!(arguments.connection_settings().port(), 3307);
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        assert!(parse(&["--db-type", "oracle"]).is_err());
    }

    #[test]
    fn test_table_layout_validation() {
        let arguments = parse(&["--log-table", "audit.events", "--search-columns", "message,source"]).unwrap();
        let layout = arguments.table_layout().unwrap();
        assert_eq!(layout.table().to_string(), "audit.events");
        assert_eq!(layout.search_columns().len(), 2);

        let arguments = parse(&["--log-table", "logs; DROP TABLE logs"]).unwrap();
        assert!(matches!(arguments.table_layout(), Err(DialectError::InvalidIdentifier(_))));
    }
}
