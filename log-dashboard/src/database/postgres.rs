//! PostgreSQL database provider implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode, PgTypeKind};
use sqlx::{Column, PgPool, Row, TypeInfo};

use crate::database::convert;
use crate::database::settings::ConnectionSettings;
use crate::database::traits::{DatabaseError, DatabaseProvider, Record};
use crate::query::{Dialect, SqlParameter};

/// PostgreSQL database provider
#[derive(Clone)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    /// Wrap an existing PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from settings and probe it with one connection
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, DatabaseError> {
        let ssl_mode = if settings.tls {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        };

        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port())
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .idle_timeout(settings.idle_timeout)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(options);

        // Acquire and immediately release one connection so misconfiguration fails here
        pool.acquire()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Convert a PostgreSQL row to a JSON object
    fn row_to_json(row: &PgRow) -> Result<Record, DatabaseError> {
        let mut map = Record::new();

        for column in row.columns() {
            let index = column.ordinal();
            let type_name = column.type_info().name();

            let value: Value = match type_name {
                "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool).into(),
                "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from).into(),
                "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from).into(),
                "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from).into(),
                "FLOAT4" => convert::float(row.try_get::<Option<f32>, _>(index)?.map(f64::from)),
                "FLOAT8" => convert::float(row.try_get::<Option<f64>, _>(index)?),
                "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "BPCHAR" => {
                    row.try_get::<Option<String>, _>(index)?.map(Value::String).into()
                }
                "BYTEA" => convert::binary(row.try_get::<Option<Vec<u8>>, _>(index)?.as_deref()),
                "TIMESTAMPTZ" => convert::timestamp_utc(row.try_get::<Option<DateTime<Utc>>, _>(index)?),
                "TIMESTAMP" => convert::timestamp(row.try_get::<Option<NaiveDateTime>, _>(index)?),
                "DATE" => convert::display(row.try_get::<Option<NaiveDate>, _>(index)?),
                "TIME" => convert::display(row.try_get::<Option<NaiveTime>, _>(index)?),
                "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?.unwrap_or(Value::Null),
                "UUID" => convert::display(row.try_get::<Option<uuid::Uuid>, _>(index)?),
                // Enum labels travel as text but the type check rejects String
                _ if matches!(column.type_info().kind(), PgTypeKind::Enum(_)) => row
                    .try_get_unchecked::<Option<String>, _>(index)?
                    .map(Value::String)
                    .into(),
                _ => {
                    // Fallback: text-like types decode as strings, anything else is null
                    row.try_get::<Option<String>, _>(index)
                        .ok()
                        .flatten()
                        .map(Value::String)
                        .unwrap_or(Value::Null)
                }
            };

            map.insert(column.name().to_string(), value);
        }

        Ok(map)
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Record>, DatabaseError> {
        let mut query = sqlx::query(sql);
        for parameter in parameters {
            query = match parameter {
                SqlParameter::Integer(value) => query.bind(*value),
                SqlParameter::Text(value) => query.bind(value.clone()),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_json).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
