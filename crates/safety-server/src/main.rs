//! safety-tracker binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and either serves the JSON API over HTTP or runs a one-off command
//! against the store.
//!
//! ```text
//! safety-tracker                                  # serve
//! safety-tracker import --establishment 1 --file log.csv --map employee_name=Name
//! safety-tracker export-log --establishment 1 --year 2026
//! ```

mod settings;

use std::{
  fs::File,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use safety_api::AppState;
use safety_core::{store::SafetyStore, validate};
use safety_import::{CanonicalField, ColumnMapping, CsvTable};
use safety_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Workplace safety incident tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,

  /// Import incidents from a CSV file.
  Import {
    /// Establishment the incidents belong to.
    #[arg(long)]
    establishment: i64,

    /// CSV file with a header row.
    #[arg(long)]
    file: PathBuf,

    /// Location for rows with no location column value.
    #[arg(long)]
    location: Option<i64>,

    /// Map a field to a column header, e.g. `employee_name="Worker"`.
    /// Unmapped fields are matched against the headers automatically.
    #[arg(long = "map", value_parser = parse_mapping)]
    map: Vec<(CanonicalField, String)>,
  },

  /// Write the injury and illness log for one year as CSV.
  ExportLog {
    #[arg(long)]
    establishment: i64,

    #[arg(long)]
    year: i32,

    /// Output directory. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
  },
}

fn parse_mapping(s: &str) -> Result<(CanonicalField, String), String> {
  let (field, header) = s
    .split_once('=')
    .ok_or_else(|| format!("expected FIELD=HEADER, got {s:?}"))?;
  let field = CanonicalField::from_str(field.trim())
    .map_err(|_| format!("unknown field {:?}", field.trim()))?;
  Ok((field, header.trim().to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;
  let store = open_store(&server_cfg.store_path()).await?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, &server_cfg).await,
    Command::Import { establishment, file, location, map } => {
      import(&store, establishment, &file, location, map).await
    }
    Command::ExportLog { establishment, year, out } => {
      export_log(&store, establishment, year, &out).await
    }
  }
}

async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {dir:?}"))?;
  }
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

async fn serve(store: SqliteStore, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = axum::Router::new()
    .nest("/api", safety_api::api_router(AppState::new(Arc::new(store))));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import(
  store: &SqliteStore,
  establishment_id: i64,
  file: &Path,
  default_location_id: Option<i64>,
  overrides: Vec<(CanonicalField, String)>,
) -> anyhow::Result<()> {
  let reader =
    File::open(file).with_context(|| format!("failed to open {file:?}"))?;
  let table = CsvTable::parse(reader)
    .with_context(|| format!("failed to parse {file:?}"))?;

  let mut mapping = ColumnMapping::auto(&table.headers);
  for (field, header) in overrides {
    mapping.set(field, header);
  }

  let report = safety_import::import(
    store,
    establishment_id,
    &table,
    &mapping,
    default_location_id,
  )
  .await
  .context("import failed")?;

  println!("Imported {} incident(s)", report.imported);
  for e in &report.errors {
    println!("  {e}");
  }
  Ok(())
}

async fn export_log(
  store: &SqliteStore,
  establishment_id: i64,
  year: i32,
  out: &Path,
) -> anyhow::Result<()> {
  validate::year(year)?;
  let est = store
    .get_establishment(establishment_id)
    .await?
    .with_context(|| format!("establishment {establishment_id} not found"))?;
  let rows = safety_report::fetch::osha_log(store, establishment_id, year)
    .await
    .context("failed to build the log")?;

  let stem = validate::sanitize_filename(&format!("OSHA_300_{}_{year}", est.name));
  let path = out.join(format!("{stem}.csv"));
  let writer =
    File::create(&path).with_context(|| format!("failed to create {path:?}"))?;
  safety_report::write_log_csv(&rows, writer)
    .with_context(|| format!("failed to write {path:?}"))?;

  println!("Wrote {} case(s) to {}", rows.len(), path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mapping_flag_parses_field_and_header() {
    assert_eq!(
      parse_mapping("employee_name = Worker Name").unwrap(),
      (CanonicalField::EmployeeName, "Worker Name".to_owned())
    );
    assert!(parse_mapping("employee_name").is_err());
    assert!(parse_mapping("shoe_size=Shoes").is_err());
  }
}
