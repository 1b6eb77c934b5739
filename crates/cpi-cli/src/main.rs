//! `cpi` — record, delete and chart price observations.
//!
//! # Usage
//!
//! ```text
//! cpi init                                   # recreate the table with demo data
//! cpi add --item "Wool Socks (Pair)" --category Clothing --price 19.99 --state Texas --city Dallas
//! cpi delete --state Texas --city Dallas -n 2     # newest two first
//! cpi delete --item "Wool Socks (Pair)" --order price:desc
//! cpi chart average-price-by-city
//! cpi serve                                  # JSON API on http://127.0.0.1:8050
//! ```

mod render;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use cpi_api::ApiState;
use cpi_core::{
  chart::{Chart, ChartKind},
  filter::{ObservationFilter, SortKey, parse_limit},
  observation::{Column, DATE_FORMAT, NewObservation},
  outcome::WriteReport,
  store::ObservationStore,
  synth::{SeedPlan, generate},
};
use cpi_store_sqlite::SqliteStore;
use rand::{RngCore, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use settings::Settings;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cpi", version, about = "Price observation data entry and charts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cpi.toml")]
  config: PathBuf,

  /// SQLite file to use instead of the configured `store_path`.
  #[arg(long, env = "CPI_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Drop and recreate the table, then load synthetic observations.
  Init(InitArgs),
  /// Record one observation.
  Add(AddArgs),
  /// Delete observations matching every given field.
  Delete(DeleteArgs),
  /// Print the observation table.
  List,
  /// Print chart data (`prices-over-time` or `average-price-by-city`).
  Chart {
    #[arg(default_value = "prices-over-time")]
    kind: String,
  },
  /// Print the selectable categories, items, states and cities.
  Catalog,
}

#[derive(Args)]
struct InitArgs {
  /// Leave the table empty.
  #[arg(long)]
  empty:           bool,
  /// Days of data, ending today.
  #[arg(long, default_value_t = 10)]
  days:            u32,
  /// Observations per item, city and day.
  #[arg(long, default_value_t = 5)]
  per_combination: usize,
  /// Seed for reproducible data.
  #[arg(long)]
  seed:            Option<u64>,
}

#[derive(Args)]
struct AddArgs {
  /// Observation date (YYYY-MM-DD); defaults to today.
  #[arg(long)]
  date:     Option<String>,
  #[arg(long)]
  category: String,
  #[arg(long)]
  item:     String,
  #[arg(long)]
  price:    String,
  #[arg(long)]
  state:    String,
  #[arg(long)]
  city:     String,
}

#[derive(Args)]
struct DeleteArgs {
  #[arg(long)]
  date:              Option<String>,
  #[arg(long)]
  category:          Option<String>,
  #[arg(long)]
  item:              Option<String>,
  #[arg(long)]
  price:             Option<String>,
  #[arg(long)]
  state:             Option<String>,
  #[arg(long)]
  city:              Option<String>,
  /// Number of matching observations to delete.
  #[arg(short = 'n', long, default_value = "1")]
  limit:             String,
  /// Ordering keys, e.g. `price:asc`; applied in the order given.
  /// Without any, the newest matching observations go first.
  #[arg(long = "order", value_name = "COLUMN[:asc|:desc]")]
  order:             Vec<SortKey>,
  /// Let the store pick which matching observations go, instead of the
  /// newest first.
  #[arg(long, conflicts_with = "order")]
  store_order:       bool,
}

impl DeleteArgs {
  fn sort_keys(&self) -> Vec<SortKey> {
    match (self.order.is_empty(), self.store_order) {
      (false, _) => self.order.clone(),
      (true, true) => Vec::new(),
      (true, false) => vec![SortKey::most_recent_first()],
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let store_path = cli.store.clone().unwrap_or_else(|| settings.resolved_store_path());

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => serve(store, settings).await,
    Command::Init(args) => init(&store, &settings, args).await,
    Command::Add(args) => add(&store, args).await,
    Command::Delete(args) => delete(&store, args).await,
    Command::List => {
      let rows = store.list().await?;
      print!("{}", render::table(&rows));
      Ok(())
    }
    Command::Chart { kind } => {
      let kind: ChartKind = kind.parse()?;
      let rows = store.list().await?;
      print!("{}", render::chart(&Chart::build(kind, &rows)));
      Ok(())
    }
    Command::Catalog => {
      print!("{}", render::catalog(&settings.catalog));
      Ok(())
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn serve(store: SqliteStore, settings: Settings) -> anyhow::Result<()> {
  let address = format!("{}:{}", settings.host, settings.port);
  let state = ApiState {
    store:   Arc::new(store),
    catalog: Arc::new(settings.catalog),
  };
  let app = cpi_api::api_router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn init(store: &SqliteStore, settings: &Settings, args: InitArgs) -> anyhow::Result<()> {
  store.reset().await?;
  if args.empty {
    println!("Observation table recreated");
    return Ok(());
  }

  let plan = SeedPlan {
    end:             Local::now().date_naive(),
    days:            args.days,
    per_combination: args.per_combination,
  };
  let rows = {
    let mut rng: Box<dyn RngCore> = match args.seed {
      Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
      None => Box::new(rand::thread_rng()),
    };
    generate(&settings.catalog, &plan, &mut *rng)?
  };
  let inserted = store.record_batch(rows).await?;

  tracing::info!(inserted, days = plan.days, "synthetic observations loaded");
  println!("Observation table recreated with {inserted} synthetic observations");
  Ok(())
}

async fn add(store: &SqliteStore, args: AddArgs) -> anyhow::Result<()> {
  let date = args
    .date
    .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
  let input = NewObservation::from_fields([
    (Column::Date, date),
    (Column::Category, args.category),
    (Column::Item, args.item),
    (Column::Price, args.price),
    (Column::State, args.state),
    (Column::City, args.city),
  ]
  .map(|(c, v)| (c.label(), v)))?;

  let result = store.record(input).await;
  let report = WriteReport::from_result(&result);
  if !report.success {
    bail!(report.message);
  }
  println!("{}", report.message);
  Ok(())
}

async fn delete(store: &SqliteStore, args: DeleteArgs) -> anyhow::Result<()> {
  let filter = ObservationFilter::from_fields([
    (Column::Date, args.date.as_deref()),
    (Column::Category, args.category.as_deref()),
    (Column::Item, args.item.as_deref()),
    (Column::Price, args.price.as_deref()),
    (Column::State, args.state.as_deref()),
    (Column::City, args.city.as_deref()),
  ]
  .map(|(c, v)| (c.label(), v)))?;
  filter.ensure_not_empty()?;
  let limit = parse_limit(&args.limit)?;
  let order = args.sort_keys();

  let outcome = store.delete_matching(&filter, limit, &order).await?;
  if outcome.is_success() {
    println!("{}", outcome.message);
  } else {
    println!("warning: {}", outcome.message);
  }
  Ok(())
}
