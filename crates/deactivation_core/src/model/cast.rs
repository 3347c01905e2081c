//! Temporal casting for the deactivation column.
//!
//! # Responsibility
//! - Interpret stored deactivation values as `DateTime<Utc>`, never as raw text.
//! - Write timestamps in one canonical, sortable text form with nanosecond precision.
//!
//! # Invariants
//! - SQL `NULL` maps to `None` and back.
//! - Accepted inputs: RFC 3339 text, `YYYY-MM-DD HH:MM:SS[.f]` text (UTC),
//!   integer epoch milliseconds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

/// Canonical storage format, always UTC.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

const NAIVE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Nullable timestamp column value with temporal casting on both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullableTimestamp(pub Option<DateTime<Utc>>);

impl NullableTimestamp {
    pub fn into_inner(self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl From<Option<DateTime<Utc>>> for NullableTimestamp {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        Self(value)
    }
}

impl FromSql for NullableTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        datetime_from_sql(value).map(Self)
    }
}

impl ToSql for NullableTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(datetime_to_sql(self.0)))
    }
}

/// Converts an optional instant to its stored SQL value.
pub fn datetime_to_sql(value: Option<DateTime<Utc>>) -> Value {
    match value {
        Some(instant) => Value::Text(instant.format(STORAGE_FORMAT).to_string()),
        None => Value::Null,
    }
}

/// Converts a stored SQL value to an optional instant.
pub fn datetime_from_sql(value: ValueRef<'_>) -> FromSqlResult<Option<DateTime<Utc>>> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(millis) => DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or(FromSqlError::OutOfRange(millis)),
        ValueRef::Text(bytes) => {
            let text =
                std::str::from_utf8(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))?;
            parse_datetime(text).map(Some).ok_or_else(|| {
                FromSqlError::Other(format!("invalid timestamp text `{text}`").into())
            })
        }
        ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, NAIVE_INPUT_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
