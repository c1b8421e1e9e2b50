//! # fuel-core: Station Ledger for a Fuel Station
//!
//! Tanks (cisterns), dispensing columns, the sale/refuel/transfer rules,
//! the emergency lockdown and the operation log. Persistence goes through
//! the [`StationStore`] trait; this crate does no I/O of its own.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Fuel Station Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (menus, prompts, rendering)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ServiceResult / status views           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fuel-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │  monitor  │  │  status   │  │   types   │  │   │
//! │  │   │  sale     │  │ low-level │  │  queries  │  │  Cistern  │  │   │
//! │  │   │  refuel   │  │  sweep    │  │  history  │  │  Column   │  │   │
//! │  │   │  transfer │  └───────────┘  └───────────┘  │ Operation │  │   │
//! │  │   │ emergency │                                └───────────┘  │   │
//! │  │   └─────┬─────┘                                               │   │
//! │  │         │ StationStore trait (store)                          │   │
//! │  └─────────┼───────────────────────────────────────────────────────┘   │
//! │            │                                                            │
//! │  ┌─────────▼───────────────────────────────────────────────────────┐   │
//! │  │        fuel-db (SqliteStore)   or   MemoryStore (in-process)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ledger`] - The [`Ledger`] and its mutating operations
//! - [`monitor`] - Low-level sweep
//! - [`status`] - Read-only views
//! - [`store`] - Persistence gateway trait and the in-memory store
//! - [`types`] - Domain records
//! - [`money`] - Integer minor-unit money
//! - [`config`] - Price table and station settings
//! - [`seed`] - Default fleet for an empty store
//! - [`error`] / [`validation`] - Failure types and input checks
//!
//! ## Example Usage
//!
//! ```rust
//! use fuel_core::{FuelType, Ledger, MemoryStore, ServiceResult, StationConfig};
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let mut ledger = Ledger::open(MemoryStore::new(), StationConfig::default())
//!     .await
//!     .unwrap();
//!
//! let result: ServiceResult = ledger
//!     .serve_customer(1, &FuelType::from("AI-92"), 500.0)
//!     .await
//!     .into();
//!
//! assert!(result.success);
//! assert_eq!(result.message, "Success! Total: 28735.00 ₽");
//! # });
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod money;
pub mod monitor;
pub mod seed;
pub mod status;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{PriceTable, StationConfig};
pub use error::{FailureKind, LedgerError, LedgerResult, StoreError, StoreResult, ValidationError};
pub use ledger::{Ledger, Outcome, ServiceResult, StationMode};
pub use money::Money;
pub use monitor::LowLevelSweep;
pub use status::{CisternStatus, ColumnStatus, FuelRoute, Quote};
pub use store::{Changeset, MemorySnapshot, MemoryStore, StationStore};
pub use types::*;
