//! Station runtime configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable             | Default                  |
//! |----------------------|--------------------------|
//! | `FUEL_DB_PATH`       | `fuel_station.db`        |
//! | `FUEL_STATION_NAME`  | `SeverNeft`              |
//! | `FUEL_PRICES`        | built-in price table     |
//! | `FUEL_CURRENCY`      | `₽`                      |
//! | `FUEL_HISTORY_LIMIT` | `10`                     |

use std::env;

use fuel_core::validation::validate_history_limit;
use fuel_core::{PriceTable, StationConfig};

use crate::pool::DbConfig;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "fuel_station.db";

/// Database and ledger configuration for one station process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub station: StationConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("FUEL_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        if db_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue("FUEL_DB_PATH".to_string()));
        }

        let mut station = StationConfig::default();

        if let Some(name) = lookup("FUEL_STATION_NAME") {
            station.station_name = name;
        }

        if let Some(prices) = lookup("FUEL_PRICES") {
            let table: PriceTable = prices
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FUEL_PRICES".to_string()))?;
            station = station.with_prices(table);
        }

        if let Some(symbol) = lookup("FUEL_CURRENCY") {
            station.currency_symbol = symbol;
        }

        if let Some(limit) = lookup("FUEL_HISTORY_LIMIT") {
            let limit: usize = limit
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FUEL_HISTORY_LIMIT".to_string()))?;
            validate_history_limit(limit)
                .map_err(|_| ConfigError::InvalidValue("FUEL_HISTORY_LIMIT".to_string()))?;
            station = station.with_history_limit(limit);
        }

        Ok(AppConfig {
            db: DbConfig::new(db_path),
            station,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
