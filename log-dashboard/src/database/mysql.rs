//! MySQL database provider implementation

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, MySqlPool, Row, TypeInfo};

use crate::database::convert;
use crate::database::settings::ConnectionSettings;
use crate::database::traits::{DatabaseError, DatabaseProvider, Record};
use crate::query::{Dialect, SqlParameter};

/// MySQL database provider
#[derive(Clone)]
pub struct MySqlProvider {
    pool: MySqlPool,
}

impl MySqlProvider {
    /// Wrap an existing MySQL connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Build a pool from settings and probe it with one connection
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, DatabaseError> {
        let ssl_mode = if settings.tls {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Disabled
        };

        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port())
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .ssl_mode(ssl_mode);

        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .idle_timeout(settings.idle_timeout)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(options);

        pool.acquire()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Convert a MySQL row to a JSON object
    fn row_to_json(row: &MySqlRow) -> Result<Record, DatabaseError> {
        let mut map = Record::new();

        for column in row.columns() {
            let index = column.ordinal();
            let type_name = column.type_info().name();

            let value: Value = match type_name {
                "BOOLEAN" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool).into(),
                "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                    row.try_get::<Option<i64>, _>(index)?.map(Value::from).into()
                }
                "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
                | "BIGINT UNSIGNED" => row.try_get::<Option<u64>, _>(index)?.map(Value::from).into(),
                "YEAR" => row
                    .try_get_unchecked::<Option<u16>, _>(index)
                    .ok()
                    .flatten()
                    .map(Value::from)
                    .into(),
                "FLOAT" => convert::float(row.try_get::<Option<f32>, _>(index)?.map(f64::from)),
                "DOUBLE" => convert::float(row.try_get::<Option<f64>, _>(index)?),
                "DATETIME" | "TIMESTAMP" => convert::timestamp(row.try_get::<Option<NaiveDateTime>, _>(index)?),
                "DATE" => convert::display(row.try_get::<Option<NaiveDate>, _>(index)?),
                "TIME" => convert::display(row.try_get::<Option<NaiveTime>, _>(index).ok().flatten()),
                "JSON" => row.try_get::<Option<Value>, _>(index)?.unwrap_or(Value::Null),
                "BLOB" | "BINARY" | "VARBINARY" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                    let bytes = row.try_get::<Option<Vec<u8>>, _>(index)?;
                    match bytes {
                        // Text stored with a binary collation still reads as text
                        Some(bytes) => match String::from_utf8(bytes) {
                            Ok(text) => Value::String(text),
                            Err(error) => convert::binary(Some(error.as_bytes())),
                        },
                        None => Value::Null,
                    }
                }
                _ => {
                    // DECIMAL, ENUM, SET and text types all arrive as strings on the wire
                    row.try_get_unchecked::<Option<String>, _>(index)
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
impl DatabaseProvider for MySqlProvider {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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
