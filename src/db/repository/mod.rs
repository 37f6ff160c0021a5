//! Repository layer: per-entity table mappings.
//!
//! Each entity type describes its table, its columns and how to move a
//! record in and out of a row. `SqliteStore` builds all SQL from these
//! descriptions, so adding an entity means adding one mapping module.

mod appointment;
mod client;
mod professional;
mod service;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

/// Storage format for calendar days.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for timestamps.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record type the entity store can persist.
///
/// `from_row` receives rows selected as `id, COLUMNS...` in declaration order,
/// and `to_values` must yield one value per entry of `COLUMNS`.
pub trait Entity: Clone + Sized {
    /// Human-readable type name, used in not-found errors.
    const ENTITY_TYPE: &'static str;
    const TABLE: &'static str;
    /// Column names excluding `id`.
    const COLUMNS: &'static [&'static str];

    /// `0` means not yet persisted.
    fn id(&self) -> i64;
    fn with_id(self, id: i64) -> Self;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn to_values(&self) -> Vec<Value>;
}

pub(crate) fn date_value(date: &NaiveDate) -> Value {
    Value::Text(date.format(DATE_FORMAT).to_string())
}

pub(crate) fn datetime_value(ts: &NaiveDateTime) -> Value {
    Value::Text(ts.format(DATETIME_FORMAT).to_string())
}

pub(crate) fn opt_text(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

pub(crate) fn read_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn read_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
