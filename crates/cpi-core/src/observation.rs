//! Observation — one recorded price for an item at a place and date.
//!
//! There is no synthetic identifier. Two observations with identical values
//! are legal and are told apart only by their store-assigned `added_on`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of fractional digits prices are persisted with.
pub const PRICE_SCALE: u32 = 4;

/// Textual date format used by forms, the CLI and the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Round `price` to the persisted precision.
pub fn round_price(price: Decimal) -> Decimal { price.round_dp(PRICE_SCALE) }

// ─── Column ──────────────────────────────────────────────────────────────────

/// A column of the observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Column {
  Date,
  Item,
  Price,
  Category,
  State,
  City,
  AddedOn,
}

impl Column {
  pub const ALL: [Column; 7] = [
    Column::Date,
    Column::Item,
    Column::Price,
    Column::Category,
    Column::State,
    Column::City,
    Column::AddedOn,
  ];

  /// Storage name of the column.
  pub fn name(self) -> &'static str {
    match self {
      Column::Date => "date",
      Column::Item => "item",
      Column::Price => "price",
      Column::Category => "category",
      Column::State => "state",
      Column::City => "city",
      Column::AddedOn => "added_on",
    }
  }

  /// Human-facing column header.
  pub fn label(self) -> &'static str {
    match self {
      Column::Date => "Date",
      Column::Item => "Item",
      Column::Price => "Price",
      Column::Category => "Category",
      Column::State => "State",
      Column::City => "City",
      Column::AddedOn => "AddedOn",
    }
  }

  /// Parse a raw textual value for this column.
  pub fn parse_value(self, raw: &str) -> Result<FieldValue> {
    match self {
      Column::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(FieldValue::Date)
        .map_err(|e| Error::invalid(format!("Date {raw:?}: {e}"))),
      Column::Price => Decimal::from_str(raw.trim())
        .map(FieldValue::Price)
        .map_err(|e| Error::invalid(format!("Price {raw:?}: {e}"))),
      Column::AddedOn => DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)))
        .map_err(|e| Error::invalid(format!("AddedOn {raw:?}: {e}"))),
      Column::Item | Column::Category | Column::State | Column::City => {
        Ok(FieldValue::Text(raw.to_owned()))
      }
    }
  }
}

impl fmt::Display for Column {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for Column {
  type Err = Error;

  /// Accepts `AddedOn`, `added_on`, `addedon` and so on.
  fn from_str(s: &str) -> Result<Self> {
    let key: String = s
      .trim()
      .chars()
      .filter(|c| *c != '_' && *c != ' ')
      .flat_map(char::to_lowercase)
      .collect();
    Column::ALL
      .into_iter()
      .find(|c| c.name().replace('_', "") == key)
      .ok_or_else(|| Error::invalid(format!("unknown field {s:?}")))
  }
}

impl TryFrom<String> for Column {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Column> for String {
  fn from(c: Column) -> Self { c.name().to_owned() }
}

// ─── Field values ────────────────────────────────────────────────────────────

/// A typed value for one column, used for equality matching.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Date(NaiveDate),
  Text(String),
  Price(Decimal),
  Timestamp(DateTime<Utc>),
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub date:     NaiveDate,
  pub item:     String,
  pub price:    Decimal,
  pub category: String,
  pub state:    String,
  pub city:     String,
  /// Assigned by the store at insert time.
  pub added_on: DateTime<Utc>,
}

/// Input for [`ObservationStore::record`](crate::store::ObservationStore::record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewObservation {
  pub date:     NaiveDate,
  pub category: String,
  pub item:     String,
  pub price:    Decimal,
  pub state:    String,
  pub city:     String,
}

impl NewObservation {
  pub fn new(
    date: NaiveDate,
    category: impl Into<String>,
    item: impl Into<String>,
    price: Decimal,
    state: impl Into<String>,
    city: impl Into<String>,
  ) -> Self {
    Self {
      date,
      category: category.into(),
      item: item.into(),
      price: round_price(price),
      state: state.into(),
      city: city.into(),
    }
  }

  /// Build from textual `(field, value)` pairs, as submitted by a form.
  ///
  /// Every field except `AddedOn` is required. Unknown or repeated field
  /// names are rejected rather than ignored.
  pub fn from_fields<I, K, V>(fields: I) -> Result<Self>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut slots: [Option<FieldValue>; 6] = Default::default();

    for (key, raw) in fields {
      let column: Column = key.as_ref().parse()?;
      let slot = match column {
        Column::Date => 0,
        Column::Item => 1,
        Column::Price => 2,
        Column::Category => 3,
        Column::State => 4,
        Column::City => 5,
        Column::AddedOn => {
          return Err(Error::invalid("AddedOn is assigned by the store"));
        }
      };
      if slots[slot].is_some() {
        return Err(Error::invalid(format!("field {column} given twice")));
      }
      slots[slot] = Some(column.parse_value(raw.as_ref())?);
    }

    let [date, item, price, category, state, city] = slots;
    let missing = |c: Column| Error::invalid(format!("missing required field {c}"));

    let Some(FieldValue::Date(date)) = date else {
      return Err(missing(Column::Date));
    };
    let Some(FieldValue::Price(price)) = price else {
      return Err(missing(Column::Price));
    };
    let text = |v: Option<FieldValue>, c: Column| match v {
      Some(FieldValue::Text(s)) => Ok(s),
      _ => Err(missing(c)),
    };

    Ok(Self::new(
      date,
      text(category, Column::Category)?,
      text(item, Column::Item)?,
      price,
      text(state, Column::State)?,
      text(city, Column::City)?,
    ))
  }
}
