//! Synthetic observations for demos and tests.
//!
//! Every catalog combination gets several prices per day so the scatter
//! chart shows realistic point density. Identical rows are expected.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::{Decimal, prelude::FromPrimitive as _};

use crate::{
  Error, Result,
  catalog::{Catalog, ItemSpec, StateSpec},
  observation::NewObservation,
};

/// How much data to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
  /// Last day of the range (inclusive).
  pub end:             NaiveDate,
  /// Number of consecutive days ending at `end`.
  pub days:            u32,
  /// Observations per (item, city, day).
  pub per_combination: usize,
}

impl SeedPlan {
  pub fn ending(end: NaiveDate) -> Self { Self { end, days: 10, per_combination: 5 } }

  pub fn dates(&self) -> Vec<NaiveDate> {
    (0..self.days)
      .rev()
      .filter_map(|back| self.end.checked_sub_days(Days::new(u64::from(back))))
      .collect()
  }
}

/// Gaussian price model for one item in one state.
///
/// Negative or non-finite parameters are refused; `Normal::new` would
/// otherwise reflect a negative deviation instead of failing.
fn price_model(item: &ItemSpec, state: &StateSpec) -> Result<Normal<f64>> {
  let checks = [
    ("base_price", &item.name, item.base_price),
    ("price_mean", &state.name, state.price_mean),
    ("price_std_dev", &state.name, state.price_std_dev),
  ];
  for (field, owner, value) in checks {
    if !value.is_finite() || value < 0.0 {
      return Err(Error::invalid(format!(
        "{field} of {owner} must be finite and non-negative, got {value}"
      )));
    }
  }

  let mean = item.base_price * state.price_mean;
  Normal::new(mean, mean * state.price_std_dev).map_err(|e| Error::PriceModel {
    subject: format!("{} in {}", item.name, state.name),
    reason:  e.to_string(),
  })
}

/// Round a sampled price to the item's real-world precision.
fn to_price(raw: f64, item: &ItemSpec) -> Result<Decimal> {
  Decimal::from_f64(raw)
    .map(|d| d.round_dp(item.precision))
    .ok_or_else(|| Error::PriceModel {
      subject: item.name.clone(),
      reason:  format!("sampled price {raw} is not representable"),
    })
}

/// Generate observations for every catalog combination in `plan`.
pub fn generate<R: Rng + ?Sized>(
  catalog: &Catalog,
  plan: &SeedPlan,
  rng: &mut R,
) -> Result<Vec<NewObservation>> {
  let dates = plan.dates();
  let mut out = Vec::new();

  for category in &catalog.categories {
    for item in &category.items {
      for state in &catalog.states {
        let model = price_model(item, state)?;
        for city in &state.cities {
          for date in &dates {
            for _ in 0..plan.per_combination {
              let price = to_price(model.sample(rng), item)?;
              out.push(NewObservation::new(
                *date,
                &category.name,
                &item.name,
                price,
                &state.name,
                city,
              ));
            }
          }
        }
      }
    }
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use rand::SeedableRng as _;
  use rand_chacha::ChaCha8Rng;

  use super::*;

  fn end() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 10).unwrap() }

  #[test]
  fn date_range_ends_on_end_date() {
    let dates = SeedPlan::ending(end()).dates();
    assert_eq!(dates.len(), 10);
    assert_eq!(dates.first(), NaiveDate::from_ymd_opt(2024, 3, 1).as_ref());
    assert_eq!(dates.last(), Some(&end()));
  }

  #[test]
  fn one_row_per_combination_day_and_repeat() {
    let catalog = Catalog::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let rows = generate(&catalog, &SeedPlan::ending(end()), &mut rng).unwrap();
    // 3 items x 5 cities x 10 days x 5 repeats
    assert_eq!(rows.len(), 3 * 5 * 10 * 5);
  }

  #[test]
  fn prices_use_item_precision() {
    let catalog = Catalog::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let rows = generate(&catalog, &SeedPlan::ending(end()), &mut rng).unwrap();
    for row in &rows {
      let precision = catalog.item(&row.item).unwrap().precision;
      assert!(row.price.scale() <= precision, "{} has {}", row.item, row.price);
    }
  }

  #[test]
  fn same_seed_same_data() {
    let catalog = Catalog::default();
    let plan = SeedPlan { end: end(), days: 2, per_combination: 1 };
    let a = generate(&catalog, &plan, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
    let b = generate(&catalog, &plan, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn negative_deviation_is_rejected() {
    let mut catalog = Catalog::default();
    catalog.states[0].price_std_dev = -1.0;
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let err = generate(&catalog, &SeedPlan::ending(end()), &mut rng).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(m) if m.contains("price_std_dev")));
  }

  #[test]
  fn non_finite_or_negative_mean_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut catalog = Catalog::default();
    catalog.states[1].price_mean = f64::NAN;
    let err = generate(&catalog, &SeedPlan::ending(end()), &mut rng).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(m) if m.contains("price_mean")));

    let mut catalog = Catalog::default();
    catalog.states[2].price_mean = -1.0;
    assert!(matches!(
      generate(&catalog, &SeedPlan::ending(end()), &mut rng),
      Err(Error::InvalidArgument(_))
    ));
  }

  #[test]
  fn zero_deviation_gives_constant_prices() {
    let mut catalog = Catalog::default();
    for state in &mut catalog.states {
      state.price_std_dev = 0.0;
    }
    let plan = SeedPlan { end: end(), days: 1, per_combination: 3 };
    let rows = generate(&catalog, &plan, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
    let texas_socks: Vec<_> = rows
      .iter()
      .filter(|r| r.state == "Texas" && r.item == "Wool Socks (Pair)")
      .collect();
    assert!(!texas_socks.is_empty());
    assert!(texas_socks.iter().all(|r| r.price.to_string() == "21.95"));
  }
}
