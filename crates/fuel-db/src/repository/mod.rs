//! # Repository Module
//!
//! Database repositories for the station's collections.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  SqliteStore (gateway)                                                 │
//! │       │                                                                 │
//! │       ├── reads  ──► db.cisterns().list_all()     (pool)               │
//! │       │                                                                 │
//! │       └── commit ──► BEGIN                                              │
//! │                      CisternRepository::replace_all(&mut tx, ..)       │
//! │                      HistoryRepository::append_operations(&mut tx, ..) │
//! │                      SequenceRepository::save(&mut tx, ..)             │
//! │                      COMMIT                                             │
//! │                                                                         │
//! │  Reads go through the pool; writes take a connection so several        │
//! │  repositories can share one transaction.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CisternRepository`] - Tanks
//! - [`ColumnRepository`] - Dispensing columns
//! - [`StatisticsRepository`] - Sales counters
//! - [`HistoryRepository`] - Operation log and sales journal
//! - [`SequenceRepository`] - Next-id counters

pub mod cistern;
pub mod column;
pub mod history;
pub mod sequence;
pub mod statistics;

pub use cistern::CisternRepository;
pub use column::ColumnRepository;
pub use history::HistoryRepository;
pub use sequence::SequenceRepository;
pub use statistics::StatisticsRepository;

use crate::error::{DbError, DbResult};

/// Ids and counters are `u64` in the core and `INTEGER` (i64) in SQLite.
pub(crate) fn to_db_id(value: u64, table: &str) -> DbResult<i64> {
    i64::try_from(value).map_err(|_| DbError::corrupt(table, format!("id {} out of range", value)))
}

pub(crate) fn from_db_id(value: i64, table: &str) -> DbResult<u64> {
    u64::try_from(value).map_err(|_| DbError::corrupt(table, format!("negative id {}", value)))
}
