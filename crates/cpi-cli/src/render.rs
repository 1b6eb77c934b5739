//! Plain-text rendering of the observation table, charts and catalog.

use std::fmt::Write as _;

use cpi_core::{
  catalog::Catalog,
  chart::{Chart, CityAverage, Series},
  observation::{Column, DATE_FORMAT, Observation, round_price},
};
use rust_decimal::{Decimal, prelude::ToPrimitive as _};

const BAR_WIDTH: usize = 40;

/// Render rows as an aligned table with a header line.
pub fn table(rows: &[Observation]) -> String {
  let cells: Vec<[String; 7]> = rows
    .iter()
    .map(|o| {
      [
        o.date.format(DATE_FORMAT).to_string(),
        o.item.clone(),
        o.price.to_string(),
        o.category.clone(),
        o.state.clone(),
        o.city.clone(),
        o.added_on.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
      ]
    })
    .collect();

  let mut widths = Column::ALL.map(|c| c.label().len());
  for row in &cells {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  let header = Column::ALL.map(|c| c.label().to_owned());
  for row in std::iter::once(&header).chain(&cells) {
    let line: Vec<String> = row
      .iter()
      .zip(widths)
      .map(|(cell, w)| format!("{cell:<w$}"))
      .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
  }
  let _ = writeln!(out, "({} rows)", rows.len());
  out
}

/// Render chart data as text.
pub fn chart(chart: &Chart) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", chart.kind().label());
  match chart {
    Chart::PricesOverTime(series) => series.iter().for_each(|s| scatter_summary(&mut out, s)),
    Chart::AveragePriceByCity(bars) => bar_chart(&mut out, bars),
  }
  out
}

/// One line per date: how many points and their spread.
fn scatter_summary(out: &mut String, series: &Series) {
  let _ = writeln!(out, "\n{}", series.item);
  for day in series.points.chunk_by(|a, b| a.date == b.date) {
    let prices: Vec<Decimal> = day.iter().map(|p| p.price).collect();
    let (Some(min), Some(max)) = (prices.iter().min(), prices.iter().max()) else {
      continue;
    };
    let mean = round_price(prices.iter().sum::<Decimal>() / Decimal::from(prices.len()));
    let _ = writeln!(
      out,
      "  {}  n={:<3} min {min:<10} mean {mean:<10} max {max}",
      day[0].date.format(DATE_FORMAT),
      prices.len(),
    );
  }
}

fn bar_chart(out: &mut String, bars: &[CityAverage]) {
  let peak = bars
    .iter()
    .filter_map(|b| b.average.to_f64())
    .fold(0.0_f64, f64::max);
  let label_width = bars
    .iter()
    .map(|b| b.city.chars().count() + b.state.chars().count() + 2)
    .max()
    .unwrap_or(0);

  let mut current_item: Option<&str> = None;
  for bar in bars {
    if current_item != Some(bar.item.as_str()) {
      let _ = writeln!(out, "\n{}", bar.item);
      current_item = Some(bar.item.as_str());
    }
    let len = match bar.average.to_f64() {
      Some(v) if peak > 0.0 => ((v / peak) * BAR_WIDTH as f64).round() as usize,
      _ => 0,
    };
    let label = format!("{}, {}", bar.city, bar.state);
    let _ = writeln!(
      out,
      "  {label:<label_width$}  {:<BAR_WIDTH$}  {} (n={})",
      "#".repeat(len),
      bar.average,
      bar.count,
    );
  }
}

/// Selectable values, grouped the way a form presents them.
pub fn catalog(catalog: &Catalog) -> String {
  let mut out = String::from("Categories\n");
  for c in &catalog.categories {
    let _ = writeln!(out, "  {}", c.name);
    for i in &c.items {
      let _ = writeln!(out, "    {} (base {:.2})", i.name, i.base_price);
    }
  }
  out.push_str("States\n");
  for s in &catalog.states {
    let _ = writeln!(out, "  {}: {}", s.name, s.cities.join(", "));
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};
  use cpi_core::chart::ChartKind;
  use rust_decimal_macros::dec;

  use super::*;

  fn obs(city: &str, price: Decimal) -> Observation {
    Observation {
      date:     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      item:     "Wool Socks (Pair)".into(),
      price,
      category: "Clothing".into(),
      state:    "Texas".into(),
      city:     city.into(),
      added_on: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
    }
  }

  #[test]
  fn table_has_header_and_rows() {
    let text = table(&[obs("Dallas", dec!(21.95)), obs("Austin", dec!(19.5))]);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Date"));
    assert!(lines[0].contains("AddedOn"));
    assert!(lines[1].contains("Dallas"));
    assert_eq!(lines.last(), Some(&"(2 rows)"));
  }

  #[test]
  fn bar_chart_scales_to_peak() {
    let rows = [obs("Dallas", dec!(20)), obs("Austin", dec!(10))];
    let text = chart(&Chart::build(ChartKind::AveragePriceByCity, &rows));
    let austin = text.lines().find(|l| l.contains("Austin")).unwrap();
    let dallas = text.lines().find(|l| l.contains("Dallas")).unwrap();
    assert_eq!(dallas.matches('#').count(), BAR_WIDTH);
    assert_eq!(austin.matches('#').count(), BAR_WIDTH / 2);
  }

  #[test]
  fn scatter_summary_groups_by_day() {
    let rows = [obs("Dallas", dec!(20)), obs("Austin", dec!(10))];
    let text = chart(&Chart::build(ChartKind::PricesOverTime, &rows));
    assert!(text.contains("n=2"));
    assert!(text.contains("mean 15"));
  }
}
