//! # fuel-db: SQLite Persistence for the Fuel Station
//!
//! Implements the station's persistence gateway ([`fuel_core::StationStore`])
//! on SQLite with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Station Data Flow                                │
//! │                                                                         │
//! │  Ledger operation (serve_customer, transfer_fuel, ...)                 │
//! │       │                                                                 │
//! │       ▼  StationStore::commit(Changeset)                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fuel-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  SqliteStore  │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │───►│ Cistern       │    │  (embedded)  │  │   │
//! │  │   │               │    │ Column        │    │              │  │   │
//! │  │   │  Database     │    │ Statistics    │    │ 001_initial  │  │   │
//! │  │   │  (pool.rs)    │    │ History       │    │              │  │   │
//! │  │   │               │    │ Sequence      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  $FUEL_DB_PATH (fuel_station.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fuel_core::Ledger;
//! use fuel_db::{AppConfig, Database, SqliteStore};
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::new(config.db).await?;
//! let store = SqliteStore::open(db).await?;
//! let mut ledger = Ledger::open(store, config.station).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::SqliteStore;

pub use repository::{
    CisternRepository, ColumnRepository, HistoryRepository, SequenceRepository,
    StatisticsRepository,
};
