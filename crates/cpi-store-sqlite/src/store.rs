//! [`SqliteStore`] — the SQLite implementation of [`ObservationStore`].

use std::path::Path;

use chrono::Utc;
use cpi_core::{
  filter::{ObservationFilter, SortKey},
  observation::{NewObservation, Observation, round_price},
  outcome::DeleteOutcome,
  store::ObservationStore,
};
use rusqlite::types::Value;

use crate::{
  Result,
  encode::{
    RawObservation, SELECT_COLUMNS, encode_date, encode_dt, encode_price, encode_value,
  },
  schema::{DROP, SCHEMA},
};

const INSERT: &str = "INSERT INTO observations (date, item, price, category, state, city, added_on)
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// Bind-ready values for one `INSERT`.
type EncodedRow = (String, String, f64, String, String, String, String);

fn encode_row(o: &NewObservation, added_on: &str) -> Result<EncodedRow> {
  Ok((
    encode_date(o.date),
    o.item.clone(),
    encode_price(o.price)?,
    o.category.clone(),
    o.state.clone(),
    o.city.clone(),
    added_on.to_owned(),
  ))
}

/// Build `WHERE a = ?1 AND b = ?2 ...` and its parameters. Column names come
/// from [`cpi_core::observation::Column`], never from caller text.
fn where_clause(filter: &ObservationFilter) -> Result<(String, Vec<Value>)> {
  let conds = filter.conditions();
  if conds.is_empty() {
    return Ok((String::new(), Vec::new()));
  }

  let mut terms = Vec::with_capacity(conds.len());
  let mut params = Vec::with_capacity(conds.len());
  for (i, (column, value)) in conds.iter().enumerate() {
    terms.push(format!("{} = ?{}", column.name(), i + 1));
    params.push(encode_value(value)?);
  }
  Ok((format!("WHERE {}", terms.join(" AND ")), params))
}

fn order_clause(order_by: &[SortKey]) -> String {
  if order_by.is_empty() {
    return String::new();
  }
  let keys: Vec<String> = order_by
    .iter()
    .map(|k| format!("{} {}", k.column.name(), k.direction.sql()))
    .collect();
  format!("ORDER BY {}", keys.join(", "))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An observation store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening observation store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ObservationStore impl ───────────────────────────────────────────────────

impl ObservationStore for SqliteStore {
  type Error = crate::Error;

  async fn record(&self, input: NewObservation) -> Result<Observation> {
    let added_on = Utc::now();
    let row = encode_row(&input, &encode_dt(added_on))?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          INSERT,
          rusqlite::params![row.0, row.1, row.2, row.3, row.4, row.5, row.6],
        )?;
        Ok(())
      })
      .await?;

    Ok(Observation {
      date: input.date,
      item: input.item,
      price: round_price(input.price),
      category: input.category,
      state: input.state,
      city: input.city,
      added_on,
    })
  }

  async fn record_batch(&self, inputs: Vec<NewObservation>) -> Result<usize> {
    let rows: Vec<EncodedRow> = inputs
      .iter()
      .map(|o| encode_row(o, &encode_dt(Utc::now())))
      .collect::<Result<_>>()?;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(INSERT)?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.0, row.1, row.2, row.3, row.4, row.5, row.6
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::debug!(inserted, "batch recorded");
    Ok(inserted)
  }

  async fn list(&self) -> Result<Vec<Observation>> {
    let raws: Vec<RawObservation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SELECT_COLUMNS} FROM observations ORDER BY added_on, rowid"
        ))?;
        let rows = stmt
          .query_map([], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }

  async fn count_matching(&self, filter: &ObservationFilter) -> Result<u64> {
    let (where_sql, params) = where_clause(filter)?;

    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM observations {where_sql}");
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn delete_matching(
    &self,
    filter: &ObservationFilter,
    limit: u64,
    order_by: &[SortKey],
  ) -> Result<DeleteOutcome> {
    filter.ensure_not_empty()?;

    let (where_sql, mut params) = where_clause(filter)?;
    let order_sql = order_clause(order_by);
    let limit_idx = params.len() + 1;
    params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

    // Selection and deletion run as one statement, so the reported count is
    // exactly the number of rows removed.
    let sql = format!(
      "DELETE FROM observations WHERE rowid IN (
         SELECT rowid FROM observations {where_sql} {order_sql} LIMIT ?{limit_idx}
       )"
    );

    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;

    let outcome = DeleteOutcome::from_count(deleted as u64);
    tracing::debug!(deleted, limit, "matching delete finished");
    Ok(outcome)
  }

  async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(DROP)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::info!("observation table recreated");
    Ok(())
  }
}
