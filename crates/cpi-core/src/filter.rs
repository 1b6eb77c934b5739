//! Matching-delete parameters: the equality filter, ordering keys and limit.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  observation::{Column, FieldValue},
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Conjunctive equality filter over observation columns.
///
/// `None` means "do not filter on this column", never "column is null".
/// Text compares exactly (case and whitespace included). Prices compare by
/// exact value: `2.99` and `2.9900` are equal, while a price with more than
/// four significant fractional digits matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationFilter {
  #[serde(default)]
  pub date:     Option<NaiveDate>,
  #[serde(default)]
  pub item:     Option<String>,
  #[serde(default)]
  pub price:    Option<Decimal>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub state:    Option<String>,
  #[serde(default)]
  pub city:     Option<String>,
  #[serde(default)]
  pub added_on: Option<DateTime<Utc>>,
}

impl ObservationFilter {
  /// Build from `(field, value)` pairs. A `None` or blank value drops the
  /// field; an unknown field name is an error.
  pub fn from_fields<I, K, V>(fields: I) -> Result<Self>
  where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut filter = Self::default();
    for (key, raw) in fields {
      let column: Column = key.as_ref().parse()?;
      let Some(raw) = raw.filter(|r| !r.as_ref().trim().is_empty()) else {
        continue;
      };
      filter.set(column, column.parse_value(raw.as_ref())?)?;
    }
    Ok(filter)
  }

  /// Set one column's value. The value variant must fit the column.
  pub fn set(&mut self, column: Column, value: FieldValue) -> Result<()> {
    match (column, value) {
      (Column::Date, FieldValue::Date(d)) => self.date = Some(d),
      (Column::Price, FieldValue::Price(p)) => self.price = Some(p),
      (Column::AddedOn, FieldValue::Timestamp(t)) => self.added_on = Some(t),
      (Column::Item, FieldValue::Text(s)) => self.item = Some(s),
      (Column::Category, FieldValue::Text(s)) => self.category = Some(s),
      (Column::State, FieldValue::Text(s)) => self.state = Some(s),
      (Column::City, FieldValue::Text(s)) => self.city = Some(s),
      (column, value) => {
        return Err(Error::invalid(format!(
          "value {value:?} does not fit column {column}"
        )));
      }
    }
    Ok(())
  }

  /// The non-null `(column, value)` pairs, in column order.
  pub fn conditions(&self) -> Vec<(Column, FieldValue)> {
    let text = |s: &Option<String>| s.clone().map(FieldValue::Text);
    [
      (Column::Date, self.date.map(FieldValue::Date)),
      (Column::Item, text(&self.item)),
      (Column::Price, self.price.map(FieldValue::Price)),
      (Column::Category, text(&self.category)),
      (Column::State, text(&self.state)),
      (Column::City, text(&self.city)),
      (Column::AddedOn, self.added_on.map(FieldValue::Timestamp)),
    ]
    .into_iter()
    .filter_map(|(c, v)| v.map(|v| (c, v)))
    .collect()
  }

  pub fn is_empty(&self) -> bool { self.conditions().is_empty() }

  /// A match-everything delete is refused.
  pub fn ensure_not_empty(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::invalid(
        "must specify at least one column-value pair to match on",
      ));
    }
    Ok(())
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  #[serde(alias = "asc")]
  Ascending,
  #[serde(alias = "desc")]
  Descending,
}

impl Direction {
  pub fn sql(self) -> &'static str {
    match self {
      Direction::Ascending => "ASC",
      Direction::Descending => "DESC",
    }
  }
}

/// One ordering key; ties fall through to the next key in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
  pub column:    Column,
  #[serde(default)]
  pub direction: Direction,
}

impl SortKey {
  pub fn asc(column: Column) -> Self {
    Self { column, direction: Direction::Ascending }
  }

  pub fn desc(column: Column) -> Self {
    Self { column, direction: Direction::Descending }
  }

  /// Newest observations first, as the data-entry form does by default.
  pub fn most_recent_first() -> Self { Self::desc(Column::AddedOn) }
}

impl fmt::Display for SortKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let dir = match self.direction {
      Direction::Ascending => "asc",
      Direction::Descending => "desc",
    };
    write!(f, "{}:{dir}", self.column.name())
  }
}

impl FromStr for SortKey {
  type Err = Error;

  /// `column`, `column:asc` or `column:desc`.
  fn from_str(s: &str) -> Result<Self> {
    let (col, dir) = match s.split_once(':') {
      Some((col, dir)) => (col, Some(dir)),
      None => (s, None),
    };
    let column: Column = col.parse()?;
    let direction = match dir.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
      None | Some("asc") | Some("ascending") => Direction::Ascending,
      Some("desc") | Some("descending") => Direction::Descending,
      Some(other) => {
        return Err(Error::invalid(format!("unknown sort direction {other:?}")));
      }
    };
    Ok(Self { column, direction })
  }
}

// ─── Limit ───────────────────────────────────────────────────────────────────

/// Parse a textual delete limit. Only non-negative integers are accepted.
pub fn parse_limit(raw: &str) -> Result<u64> {
  raw
    .trim()
    .parse::<u64>()
    .map_err(|_| Error::invalid(format!("limit must be a non-negative integer, got {raw:?}")))
}
