//! The catalog of selectable categories, items, states and cities, plus the
//! price model the seed generator draws from.
//!
//! Passed explicitly to whatever needs it; the store never does.

use serde::{Deserialize, Serialize};

use crate::observation::PRICE_SCALE;

/// An item that can be observed, with its reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
  pub name:       String,
  /// Nationwide average price used as the generator's starting point.
  pub base_price: f64,
  /// Fractional digits real-world prices for this item carry.
  #[serde(default = "default_precision")]
  pub precision:  u32,
}

fn default_precision() -> u32 { PRICE_SCALE }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
  pub name:  String,
  pub items: Vec<ItemSpec>,
}

/// A state, its cities, and how its prices deviate from the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
  pub name:          String,
  pub cities:        Vec<String>,
  /// Multiplier applied to an item's base price.
  pub price_mean:    f64,
  /// Standard deviation relative to the scaled price.
  pub price_std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
  #[serde(default)]
  pub categories: Vec<CategorySpec>,
  #[serde(default)]
  pub states:     Vec<StateSpec>,
}

impl Catalog {
  pub fn categories(&self) -> Vec<&str> {
    self.categories.iter().map(|c| c.name.as_str()).collect()
  }

  pub fn items(&self) -> Vec<&str> {
    self
      .categories
      .iter()
      .flat_map(|c| c.items.iter().map(|i| i.name.as_str()))
      .collect()
  }

  pub fn states(&self) -> Vec<&str> {
    self.states.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn cities(&self) -> Vec<&str> {
    self
      .states
      .iter()
      .flat_map(|s| s.cities.iter().map(String::as_str))
      .collect()
  }

  /// Items in `category`; empty if the category is unknown.
  pub fn items_in(&self, category: &str) -> Vec<&str> {
    self
      .categories
      .iter()
      .filter(|c| c.name == category)
      .flat_map(|c| c.items.iter().map(|i| i.name.as_str()))
      .collect()
  }

  /// Cities in `state`; empty if the state is unknown.
  pub fn cities_in(&self, state: &str) -> Vec<&str> {
    self
      .states
      .iter()
      .filter(|s| s.name == state)
      .flat_map(|s| s.cities.iter().map(String::as_str))
      .collect()
  }

  pub fn item(&self, name: &str) -> Option<&ItemSpec> {
    self
      .categories
      .iter()
      .flat_map(|c| c.items.iter())
      .find(|i| i.name == name)
  }

  pub fn state(&self, name: &str) -> Option<&StateSpec> {
    self.states.iter().find(|s| s.name == name)
  }
}

impl Default for Catalog {
  fn default() -> Self {
    let item = |name: &str, base_price, precision| ItemSpec {
      name: name.to_owned(),
      base_price,
      precision,
    };
    let category = |name: &str, items| CategorySpec { name: name.to_owned(), items };
    let state = |name: &str, cities: &[&str], price_mean, price_std_dev| StateSpec {
      name: name.to_owned(),
      cities: cities.iter().map(|c| (*c).to_owned()).collect(),
      price_mean,
      price_std_dev,
    };

    Self {
      categories: vec![
        category("Food", vec![item("USDA Grade-A eggs (Dozen)", 2.99, 2)]),
        category("Fuel", vec![item("Regular Gasoline (Gallon)", 4.65, 3)]),
        category("Clothing", vec![item("Wool Socks (Pair)", 21.95, 2)]),
      ],
      states:     vec![
        state("California", &["Los Angeles", "San Francisco"], 1.5, 0.15),
        state("New York", &["New York City"], 1.75, 0.25),
        state("Texas", &["Austin", "Dallas"], 1.0, 0.10),
      ],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_catalog_lists() {
    let c = Catalog::default();
    assert_eq!(c.categories(), vec!["Food", "Fuel", "Clothing"]);
    assert_eq!(c.states(), vec!["California", "New York", "Texas"]);
    assert_eq!(c.cities().len(), 5);
    assert_eq!(c.items().len(), 3);
  }

  #[test]
  fn nested_lookups() {
    let c = Catalog::default();
    assert_eq!(c.cities_in("Texas"), vec!["Austin", "Dallas"]);
    assert_eq!(c.items_in("Fuel"), vec!["Regular Gasoline (Gallon)"]);
    assert!(c.items_in("Toys").is_empty());
    assert_eq!(c.item("Regular Gasoline (Gallon)").map(|i| i.precision), Some(3));
    assert!(c.state("Ohio").is_none());
  }

  #[test]
  fn item_precision_defaults_to_storage_scale() {
    let spec: ItemSpec =
      serde_json::from_str(r#"{"name":"Bread","base_price":2.5}"#).unwrap();
    assert_eq!(spec.precision, PRICE_SCALE);
  }
}
