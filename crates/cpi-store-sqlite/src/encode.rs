//! Encoding and decoding helpers between domain types and the values stored
//! in SQLite columns.
//!
//! Dates are `YYYY-MM-DD` text. Timestamps are fixed-width RFC 3339 UTC
//! strings with nanoseconds, so text order is time order. Prices are REAL,
//! rounded to the persisted scale before insert so equal decimals bind to
//! the same double.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use cpi_core::observation::{DATE_FORMAT, FieldValue, Observation, PRICE_SCALE, round_price};
use rusqlite::types::Value;
use rust_decimal::{
  Decimal,
  prelude::{FromPrimitive as _, ToPrimitive as _},
};

use crate::{Error, Result};

// ─── Date ─────────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::Decode {
    column: "date",
    reason: format!("{s:?}: {e}"),
  })
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode {
      column: "added_on",
      reason: format!("{s:?}: {e}"),
    })
}

// ─── Price ────────────────────────────────────────────────────────────────────

pub fn encode_price(p: Decimal) -> Result<f64> {
  round_price(p).to_f64().ok_or_else(|| Error::Decode {
    column: "price",
    reason: format!("{p} has no floating-point form"),
  })
}

pub fn decode_price(f: f64) -> Result<Decimal> {
  Decimal::from_f64(f)
    .map(round_price)
    .ok_or_else(|| Error::Decode {
      column: "price",
      reason: format!("{f} is not a finite decimal"),
    })
}

// ─── Filter values ────────────────────────────────────────────────────────────

/// Bind form of a filter value, matching how the column was written.
///
/// A price finer than [`PRICE_SCALE`] cannot equal any stored price, so it
/// binds as NULL and `price = NULL` matches no row.
pub fn encode_value(v: &FieldValue) -> Result<Value> {
  Ok(match v {
    FieldValue::Date(d) => Value::Text(encode_date(*d)),
    FieldValue::Text(s) => Value::Text(s.clone()),
    FieldValue::Price(p) if p.normalize().scale() > PRICE_SCALE => Value::Null,
    FieldValue::Price(p) => Value::Real(encode_price(*p)?),
    FieldValue::Timestamp(t) => Value::Text(encode_dt(*t)),
  })
}

// ─── Row type ─────────────────────────────────────────────────────────────────

/// Raw values read directly from an `observations` row.
pub struct RawObservation {
  pub date:     String,
  pub item:     String,
  pub price:    f64,
  pub category: String,
  pub state:    String,
  pub city:     String,
  pub added_on: String,
}

/// Column list matching [`RawObservation::from_row`].
pub const SELECT_COLUMNS: &str = "date, item, price, category, state, city, added_on";

impl RawObservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      date:     row.get(0)?,
      item:     row.get(1)?,
      price:    row.get(2)?,
      category: row.get(3)?,
      state:    row.get(4)?,
      city:     row.get(5)?,
      added_on: row.get(6)?,
    })
  }

  pub fn into_observation(self) -> Result<Observation> {
    Ok(Observation {
      date:     decode_date(&self.date)?,
      item:     self.item,
      price:    decode_price(self.price)?,
      category: self.category,
      state:    self.state,
      city:     self.city,
      added_on: decode_dt(&self.added_on)?,
    })
  }
}
