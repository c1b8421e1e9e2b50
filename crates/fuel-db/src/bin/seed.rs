//! # Station Database Initializer
//!
//! Creates (or opens) a station database, seeds the default fleet if it is
//! empty and prints the current station status.
//!
//! ## Usage
//! ```bash
//! # Use $FUEL_DB_PATH or ./fuel_station.db
//! cargo run -p fuel-db --bin seed
//!
//! # Specify database path
//! cargo run -p fuel-db --bin seed -- --db ./data/station.db
//!
//! # Also run the low-level sweep before printing
//! cargo run -p fuel-db --bin seed -- --check-levels
//! ```

use std::env;
use std::path::PathBuf;

use fuel_core::Ledger;
use fuel_db::{AppConfig, Database, SqliteStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fuel=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config = AppConfig::from_env()?;
    let mut check_levels = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.db.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--check-levels" => check_levels = true,
            "--help" | "-h" => {
                println!("Fuel Station Database Initializer");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: $FUEL_DB_PATH or ./fuel_station.db)");
                println!("      --check-levels  Disable tanks below their minimum level");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    init_tracing();

    println!("Fuel Station Database Initializer");
    println!("=================================");
    println!("Station:  {}", config.station.station_name);
    println!("Database: {}", config.db.database_path.display());
    println!();

    let db = Database::new(config.db.clone()).await?;
    let store = SqliteStore::open(db).await?;
    let mut ledger = Ledger::open(store, config.station).await?;

    if check_levels {
        let low = ledger.check_low_levels().await?;
        info!(count = low.len(), "Low-level sweep finished");
    }

    println!("Cisterns:");
    for status in ledger.cistern_status() {
        println!("  {}", status);
    }

    println!();
    println!("Columns:");
    for status in ledger.column_status() {
        println!("  {}", status);
    }

    let stats = ledger.statistics();
    println!();
    println!("Cars served:  {}", stats.total_cars_served);
    println!("Total income: {}", ledger.config().format_money(stats.total_income));
    println!("Operations:   {}", ledger.history(0).len());

    ledger.store().database().close().await;

    println!();
    println!("✓ Done");

    Ok(())
}
