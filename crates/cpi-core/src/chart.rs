//! Chart data derived from the observation table.
//!
//! Only the data is computed here; drawing is up to the consumer.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  observation::{Observation, round_price},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
  /// Scatter of price against date, one series per item.
  PricesOverTime,
  /// Bar of mean price per city, grouped by item.
  AveragePriceByCity,
}

impl ChartKind {
  pub const ALL: [ChartKind; 2] = [ChartKind::PricesOverTime, ChartKind::AveragePriceByCity];

  pub fn label(self) -> &'static str {
    match self {
      ChartKind::PricesOverTime => "Item Prices Over Time",
      ChartKind::AveragePriceByCity => "Average Item Price by City",
    }
  }

  pub fn slug(self) -> &'static str {
    match self {
      ChartKind::PricesOverTime => "prices-over-time",
      ChartKind::AveragePriceByCity => "average-price-by-city",
    }
  }
}

impl fmt::Display for ChartKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for ChartKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    ChartKind::ALL
      .into_iter()
      .find(|k| k.slug() == s || k.label().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::invalid(format!("unknown chart type {s:?}")))
  }
}

// ─── Data ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
  pub date:  NaiveDate,
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
  pub item:   String,
  pub points: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAverage {
  pub item:    String,
  pub state:   String,
  pub city:    String,
  pub average: Decimal,
  pub count:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Chart {
  PricesOverTime(Vec<Series>),
  AveragePriceByCity(Vec<CityAverage>),
}

impl Chart {
  pub fn build(kind: ChartKind, rows: &[Observation]) -> Self {
    match kind {
      ChartKind::PricesOverTime => Chart::PricesOverTime(prices_over_time(rows)),
      ChartKind::AveragePriceByCity => Chart::AveragePriceByCity(average_price_by_city(rows)),
    }
  }

  pub fn kind(&self) -> ChartKind {
    match self {
      Chart::PricesOverTime(_) => ChartKind::PricesOverTime,
      Chart::AveragePriceByCity(_) => ChartKind::AveragePriceByCity,
    }
  }
}

/// One series per item, points sorted by date.
pub fn prices_over_time(rows: &[Observation]) -> Vec<Series> {
  let mut by_item: BTreeMap<&str, Vec<PricePoint>> = BTreeMap::new();
  for row in rows {
    by_item
      .entry(row.item.as_str())
      .or_default()
      .push(PricePoint { date: row.date, price: row.price });
  }

  by_item
    .into_iter()
    .map(|(item, mut points)| {
      points.sort_by_key(|p| p.date);
      Series { item: item.to_owned(), points }
    })
    .collect()
}

/// Mean price per (item, state, city), sorted by item then city.
pub fn average_price_by_city(rows: &[Observation]) -> Vec<CityAverage> {
  let mut sums: BTreeMap<(&str, &str, &str), (Decimal, usize)> = BTreeMap::new();
  for row in rows {
    let entry = sums
      .entry((row.item.as_str(), row.city.as_str(), row.state.as_str()))
      .or_insert((Decimal::ZERO, 0));
    entry.0 += row.price;
    entry.1 += 1;
  }

  sums
    .into_iter()
    .map(|((item, city, state), (total, count))| CityAverage {
      item: item.to_owned(),
      state: state.to_owned(),
      city: city.to_owned(),
      average: round_price(total / Decimal::from(count)),
      count,
    })
    .collect()
}
