//! SQL Server database provider implementation
//!
//! Connections come from `tiberius`, pooled with `bb8`. Parameters are sent
//! positionally and named `@P1..@Pn` by the driver, matching the SQL rendered
//! by [`MsSqlQueryBuilder`](crate::query::MsSqlQueryBuilder).

use async_trait::async_trait;
use bb8::Pool;
use bb8_tiberius::ConnectionManager as TiberiusManager;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use tiberius::{AuthMethod, ColumnData, Config, EncryptionLevel, Row, ToSql};

use crate::database::convert;
use crate::database::settings::ConnectionSettings;
use crate::database::traits::{DatabaseError, DatabaseProvider, Record};
use crate::query::{Dialect, SqlParameter};

/// SQL Server database provider
#[derive(Clone)]
pub struct MsSqlProvider {
    pool: Pool<TiberiusManager>,
}

impl MsSqlProvider {
    /// Wrap an existing pool
    pub fn new(pool: Pool<TiberiusManager>) -> Self {
        Self { pool }
    }

    /// Build a pool from settings and probe it with one connection
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, DatabaseError> {
        let mut config = Config::new();
        config.host(&settings.host);
        config.port(settings.port());
        config.database(&settings.database);
        config.authentication(AuthMethod::sql_server(&settings.user, &settings.password));

        if settings.tls {
            config.encryption(EncryptionLevel::Required);
            config.trust_cert();
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }

        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .idle_timeout(Some(settings.idle_timeout))
            .connection_timeout(settings.acquire_timeout)
            .build_unchecked(TiberiusManager::new(config));

        pool.get()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Convert a SQL Server row to a JSON object
    fn row_to_json(row: &Row) -> Result<Record, DatabaseError> {
        let mut map = Record::new();

        for (index, (column, data)) in row.cells().enumerate() {
            let value: Value = match data {
                ColumnData::U8(value) => value.map(Value::from).into(),
                ColumnData::I16(value) => value.map(Value::from).into(),
                ColumnData::I32(value) => value.map(Value::from).into(),
                ColumnData::I64(value) => value.map(Value::from).into(),
                ColumnData::F32(value) => convert::float(value.map(f64::from)),
                ColumnData::F64(value) => convert::float(*value),
                ColumnData::Bit(value) => value.map(Value::Bool).into(),
                ColumnData::String(value) => value
                    .as_ref()
                    .map(|text| Value::String(text.to_string()))
                    .into(),
                ColumnData::Guid(value) => convert::display(*value),
                ColumnData::Numeric(value) => convert::display(*value),
                ColumnData::Binary(value) => convert::binary(value.as_deref()),
                ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
                    convert::timestamp(row.try_get::<NaiveDateTime, _>(index)?)
                }
                ColumnData::Date(_) => convert::display(row.try_get::<NaiveDate, _>(index)?),
                ColumnData::Time(_) => convert::display(row.try_get::<NaiveTime, _>(index)?),
                ColumnData::DateTimeOffset(_) => row
                    .try_get::<DateTime<FixedOffset>, _>(index)?
                    .map(|moment| Value::String(moment.to_rfc3339()))
                    .into(),
                ColumnData::Xml(value) => value.as_ref().map(|_| Value::String("[XML]".to_string())).into(),
                #[allow(unreachable_patterns)]
                _ => Value::Null,
            };

            map.insert(column.name().to_string(), value);
        }

        Ok(map)
    }
}

#[async_trait]
impl DatabaseProvider for MsSqlProvider {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    async fn query(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Record>, DatabaseError> {
        let mut connection = self
            .pool
            .get()
            .await
            .map_err(|error| DatabaseError::Query(error.to_string()))?;

        let bound: Vec<&dyn ToSql> = parameters
            .iter()
            .map(|parameter| match parameter {
                SqlParameter::Integer(value) => value as &dyn ToSql,
                SqlParameter::Text(value) => value as &dyn ToSql,
            })
            .collect();

        // Only the first result set is returned; the driver's stream is not exposed
        let rows = connection.query(sql, &bound).await?.into_first_result().await?;

        rows.iter().map(Self::row_to_json).collect()
    }

    async fn close(&self) {
        // bb8 has no shutdown call: connections close once the last pool handle is dropped
        let state = self.pool.state();
        tracing::debug!(
            connections = state.connections,
            idle = state.idle_connections,
            "Releasing SQL Server pool"
        );
    }
}
