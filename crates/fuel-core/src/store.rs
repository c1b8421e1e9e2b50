//! # Persistence Gateway
//!
//! The contract the ledger uses to load and save station state.
//!
//! ## Gateway Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StationStore                                      │
//! │                                                                         │
//! │  Ledger::open ──► load_cisterns / load_columns / load_statistics       │
//! │                   load_history / load_transactions / load_sequences    │
//! │                                                                         │
//! │  Every mutating ledger call                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit(Changeset) ← replaced collections + appended records + ids     │
//! │       │                                                                 │
//! │       ├── Ok  → ledger swaps the staged state in                        │
//! │       └── Err → ledger keeps its previous state, caller sees           │
//! │                 FailureKind::Infrastructure                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A gateway with no persisted state must answer the loads with the default
//! fleet from [`crate::seed`].
//!
//! The trait lives here so the core stays free of I/O; the SQLite
//! implementation lives in `fuel-db`. [`MemoryStore`] is the in-process
//! implementation used by tests and headless callers.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::seed;
use crate::types::{Cistern, Column, Operation, Sequences, Statistics, Transaction};

// =============================================================================
// Changeset
// =============================================================================

/// Everything one ledger operation writes.
///
/// Collections marked `Some` replace the stored collection; `operations`
/// and `transaction` are appended. A gateway must apply a changeset
/// completely or not at all.
#[derive(Debug, Clone, Copy)]
pub struct Changeset<'a> {
    pub cisterns: Option<&'a [Cistern]>,
    pub columns: Option<&'a [Column]>,
    pub statistics: Option<&'a Statistics>,
    pub operations: &'a [Operation],
    pub transaction: Option<&'a Transaction>,
    pub sequences: Sequences,
}

impl<'a> Changeset<'a> {
    /// An empty changeset that only records the id sequences.
    pub fn new(sequences: Sequences) -> Self {
        Changeset {
            cisterns: None,
            columns: None,
            statistics: None,
            operations: &[],
            transaction: None,
            sequences,
        }
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Persistence gateway for one station.
pub trait StationStore: Send + Sync {
    fn load_cisterns(&self) -> impl Future<Output = StoreResult<Vec<Cistern>>> + Send;

    fn load_columns(&self) -> impl Future<Output = StoreResult<Vec<Column>>> + Send;

    fn load_statistics(&self) -> impl Future<Output = StoreResult<Statistics>> + Send;

    /// Operations in insertion order.
    fn load_history(&self) -> impl Future<Output = StoreResult<Vec<Operation>>> + Send;

    /// Transactions in insertion order.
    fn load_transactions(&self) -> impl Future<Output = StoreResult<Vec<Transaction>>> + Send;

    /// Persisted id sequences, `None` when never written.
    fn load_sequences(&self) -> impl Future<Output = StoreResult<Option<Sequences>>> + Send;

    /// Applies a changeset atomically.
    fn commit(&self, changes: &Changeset<'_>) -> impl Future<Output = StoreResult<()>> + Send;
}

// =============================================================================
// Memory Store
// =============================================================================

/// Contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    pub cisterns: Vec<Cistern>,
    pub columns: Vec<Column>,
    pub statistics: Statistics,
    pub history: Vec<Operation>,
    pub transactions: Vec<Transaction>,
    pub sequences: Option<Sequences>,
}

/// In-memory gateway.
///
/// Starts with the default fleet. Commits can be made to fail on demand to
/// exercise the ledger's infrastructure-error path.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemorySnapshot>,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    /// A store holding the default fleet.
    pub fn new() -> Self {
        MemoryStore::with_state(
            seed::default_cisterns(),
            seed::default_columns(),
            seed::default_statistics(),
        )
    }

    /// A store holding the given tanks, columns and statistics.
    pub fn with_state(cisterns: Vec<Cistern>, columns: Vec<Column>, statistics: Statistics) -> Self {
        MemoryStore {
            state: Mutex::new(MemorySnapshot {
                cisterns,
                columns,
                statistics,
                ..MemorySnapshot::default()
            }),
            fail_commits: AtomicBool::new(false),
        }
    }

    /// Makes every following commit fail (or succeed again).
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// A copy of everything persisted so far.
    pub fn snapshot(&self) -> StoreResult<MemorySnapshot> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemorySnapshot>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl StationStore for MemoryStore {
    async fn load_cisterns(&self) -> StoreResult<Vec<Cistern>> {
        Ok(self.lock()?.cisterns.clone())
    }

    async fn load_columns(&self) -> StoreResult<Vec<Column>> {
        Ok(self.lock()?.columns.clone())
    }

    async fn load_statistics(&self) -> StoreResult<Statistics> {
        Ok(self.lock()?.statistics.clone())
    }

    async fn load_history(&self) -> StoreResult<Vec<Operation>> {
        Ok(self.lock()?.history.clone())
    }

    async fn load_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.lock()?.transactions.clone())
    }

    async fn load_sequences(&self) -> StoreResult<Option<Sequences>> {
        Ok(self.lock()?.sequences)
    }

    async fn commit(&self, changes: &Changeset<'_>) -> StoreResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }

        let mut state = self.lock()?;

        if let Some(cisterns) = changes.cisterns {
            state.cisterns = cisterns.to_vec();
        }
        if let Some(columns) = changes.columns {
            state.columns = columns.to_vec();
        }
        if let Some(statistics) = changes.statistics {
            state.statistics = statistics.clone();
        }
        state.history.extend_from_slice(changes.operations);
        if let Some(transaction) = changes.transaction {
            state.transactions.push(transaction.clone());
        }
        state.sequences = Some(changes.sequences);

        Ok(())
    }
}
