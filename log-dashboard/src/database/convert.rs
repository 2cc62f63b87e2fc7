//! Conversions from decoded column values to JSON shared by the backends

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Number, Value};

/// Floats that JSON can't represent (NaN, infinities) become null
pub(crate) fn float(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Binary payloads are summarised rather than inlined
pub(crate) fn binary(value: Option<&[u8]>) -> Value {
    value
        .map(|bytes| Value::String(format!("[BLOB: {} bytes]", bytes.len())))
        .unwrap_or(Value::Null)
}

/// Timezone-naive timestamps as ISO 8601 without offset
pub(crate) fn timestamp(value: Option<NaiveDateTime>) -> Value {
    value
        .map(|moment| Value::String(moment.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        .unwrap_or(Value::Null)
}

/// UTC timestamps as RFC 3339
pub(crate) fn timestamp_utc(value: Option<DateTime<Utc>>) -> Value {
    value
        .map(|moment| Value::String(moment.to_rfc3339()))
        .unwrap_or(Value::Null)
}

pub(crate) fn display<T: Display>(value: Option<T>) -> Value {
    value
        .map(|inner| Value::String(inner.to_string()))
        .unwrap_or(Value::Null)
}
