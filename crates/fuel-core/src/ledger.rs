//! # Station Ledger
//!
//! The operations engine. Owns the in-memory station state and runs every
//! state-changing use case against it.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Ledger Operation                                │
//! │                                                                         │
//! │  caller ──► validate (mode, ids, activation, bounds)                   │
//! │                │                                                        │
//! │                ├── any check fails → Err(LedgerError), nothing changed │
//! │                ▼                                                        │
//! │             stage: copy the affected collections, mutate the copies,   │
//! │                    build the Operation (and Transaction for a sale)    │
//! │                │                                                        │
//! │                ▼                                                        │
//! │             store.commit(Changeset)                                    │
//! │                │                                                        │
//! │                ├── Err → Err(Storage), in-memory state unchanged       │
//! │                ▼                                                        │
//! │             swap staged state in ──► Ok(Outcome { message, .. })       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Emergency State Machine
//! ```text
//!        trigger_emergency()                 disable_emergency()
//!  Normal ──────────────────► Emergency ──────────────────────► Normal
//!                             (all tanks off,                  (tanks STAY off)
//!                              sales rejected)
//! ```
//!
//! Operations take `&mut self`: one caller at a time per station. Callers
//! sharing a ledger across tasks wrap it in a single mutex.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::config::StationConfig;
use crate::error::{FailureKind, LedgerError, LedgerResult};
use crate::store::{Changeset, StationStore};
use crate::types::{
    Cistern, Column, EmergencyAction, FuelType, Operation, OperationDetails, OperationKind,
    Sequences, Statistics, ToggleAction, Transaction,
};
use crate::validation::{validate_cistern_id, validate_liters};

// =============================================================================
// Results
// =============================================================================

/// Emergency state of the station. Process-lifetime, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StationMode {
    #[default]
    Normal,
    Emergency,
}

/// Result of a successful mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Human-readable result for the operator.
    pub message: String,
    /// Id of the logged operation, `None` when the call changed nothing.
    pub operation_id: Option<u64>,
    /// The sale record, for sales only.
    pub transaction: Option<Transaction>,
}

impl Outcome {
    fn logged(message: String, operation_id: u64) -> Self {
        Outcome {
            message,
            operation_id: Some(operation_id),
            transaction: None,
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Outcome {
            message: message.into(),
            operation_id: None,
            transaction: None,
        }
    }
}

/// The `(success, message)` pair handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceResult {
    pub success: bool,
    pub message: String,
    /// Failure class, `None` on success.
    pub kind: Option<FailureKind>,
}

impl From<LedgerResult<Outcome>> for ServiceResult {
    fn from(result: LedgerResult<Outcome>) -> Self {
        match result {
            Ok(outcome) => ServiceResult {
                success: true,
                message: outcome.message,
                kind: None,
            },
            Err(err) => ServiceResult {
                success: false,
                message: err.to_string(),
                kind: Some(err.kind()),
            },
        }
    }
}

// =============================================================================
// Staging
// =============================================================================

/// Pending writes of one operation, applied only after a successful commit.
#[derive(Debug, Default)]
pub(crate) struct Staged {
    pub(crate) cisterns: Option<Vec<Cistern>>,
    pub(crate) columns: Option<Vec<Column>>,
    pub(crate) statistics: Option<Statistics>,
    pub(crate) operations: Vec<Operation>,
    pub(crate) transaction: Option<Transaction>,
}

pub(crate) fn log_rejection(kind: OperationKind, err: &LedgerError) {
    warn!(
        operation = %kind,
        failure = ?err.kind(),
        error = %err,
        "Operation rejected"
    );
}

// =============================================================================
// Ledger
// =============================================================================

/// One fuel station: tanks, columns, counters, history and emergency flag.
#[derive(Debug)]
pub struct Ledger<S> {
    pub(crate) store: S,
    pub(crate) config: StationConfig,
    pub(crate) cisterns: Vec<Cistern>,
    pub(crate) columns: Vec<Column>,
    pub(crate) statistics: Statistics,
    pub(crate) history: Vec<Operation>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) sequences: Sequences,
    pub(crate) mode: StationMode,
}

impl<S: StationStore> Ledger<S> {
    /// Loads the station from its gateway.
    ///
    /// Starts in [`StationMode::Normal`]. Id sequences come from the store;
    /// if it has none (or stale ones) they continue after the highest
    /// loaded id.
    pub async fn open(store: S, config: StationConfig) -> LedgerResult<Self> {
        let cisterns = store.load_cisterns().await?;
        let columns = store.load_columns().await?;
        let statistics = store.load_statistics().await?;
        let history = store.load_history().await?;
        let transactions = store.load_transactions().await?;

        let derived = Sequences::following(&history, &transactions);
        let sequences = match store.load_sequences().await? {
            Some(stored) => Sequences {
                next_operation_id: stored.next_operation_id.max(derived.next_operation_id),
                next_transaction_id: stored.next_transaction_id.max(derived.next_transaction_id),
            },
            None => derived,
        };

        info!(
            station = %config.station_name,
            cisterns = cisterns.len(),
            columns = columns.len(),
            operations = history.len(),
            transactions = transactions.len(),
            "Station ledger opened"
        );

        Ok(Ledger {
            store,
            config,
            cisterns,
            columns,
            statistics,
            history,
            transactions,
            sequences,
            mode: StationMode::Normal,
        })
    }

    // -------------------------------------------------------------------------
    // Sale
    // -------------------------------------------------------------------------

    /// Sells `liters` of `fuel_type` at column `column_id`.
    ///
    /// ## Checks (in order, each a distinct failure)
    /// 1. Emergency mode → `EmergencyActive`
    /// 2. Liters finite and positive → `Validation`
    /// 3. Column exists → `ColumnNotFound`
    /// 4. Column active → `ColumnInactive`
    /// 5. Column offers the fuel → `FuelNotOffered`
    /// 6. Routed tank exists → `CisternNotFound`
    /// 7. Tank active → `CisternInactive`
    /// 8. Tank holds enough → `InsufficientFuel`
    ///
    /// ## On Success
    /// Prices the sale from the configured table (unknown fuel → zero),
    /// appends a transaction and an operation, decrements the tank and
    /// updates the statistics.
    pub async fn serve_customer(
        &mut self,
        column_id: u32,
        fuel_type: &FuelType,
        liters: f64,
    ) -> LedgerResult<Outcome> {
        self.sell(column_id, fuel_type, liters)
            .await
            .inspect_err(|e| log_rejection(OperationKind::Sale, e))
    }

    async fn sell(
        &mut self,
        column_id: u32,
        fuel_type: &FuelType,
        liters: f64,
    ) -> LedgerResult<Outcome> {
        if self.mode == StationMode::Emergency {
            return Err(LedgerError::EmergencyActive);
        }
        validate_liters(liters)?;

        let column = self
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or(LedgerError::ColumnNotFound(column_id))?;
        if !column.is_active {
            return Err(LedgerError::ColumnInactive(column_id));
        }
        let cistern_id = column
            .cistern_for(fuel_type)
            .ok_or_else(|| LedgerError::FuelNotOffered {
                column_id,
                fuel_type: fuel_type.clone(),
            })?
            .to_string();

        let index = self.cistern_index(&cistern_id)?;
        let cistern = &self.cisterns[index];
        if !cistern.is_active {
            return Err(LedgerError::CisternInactive(cistern_id));
        }
        if !cistern.can_supply(liters) {
            return Err(LedgerError::InsufficientFuel {
                cistern_id,
                available: cistern.current_volume,
                requested: liters,
            });
        }

        let price_per_liter = self.config.prices.price_for(fuel_type);
        let total_price = price_per_liter.for_liters(liters);
        let timestamp = self.next_timestamp();

        let transaction = Transaction {
            id: self.sequences.next_transaction_id,
            timestamp,
            column_id,
            fuel_type: fuel_type.clone(),
            liters,
            price_per_liter,
            total_price,
        };

        let mut cisterns = self.cisterns.clone();
        cisterns[index].current_volume -= liters;

        let mut statistics = self.statistics.clone();
        statistics.record_sale(fuel_type, liters, total_price);

        let mut staged = Staged {
            cisterns: Some(cisterns),
            statistics: Some(statistics),
            transaction: Some(transaction.clone()),
            ..Staged::default()
        };
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            format!("Sale of {} L {} at column {}", liters, fuel_type, column_id),
            OperationDetails::Sale {
                column_id,
                fuel_type: fuel_type.clone(),
                liters,
                total_price,
            },
        );
        self.apply(staged).await?;

        info!(
            transaction_id = transaction.id,
            column_id,
            fuel_type = %fuel_type,
            liters,
            total = %total_price,
            cistern = %cistern_id,
            "Sale completed"
        );

        Ok(Outcome {
            message: format!(
                "Success! Total: {}",
                self.config.format_money(total_price)
            ),
            operation_id: Some(operation_id),
            transaction: Some(transaction),
        })
    }

    // -------------------------------------------------------------------------
    // Refuel
    // -------------------------------------------------------------------------

    /// Delivers `liters` into a tank.
    ///
    /// Supply-side only: statistics are untouched and a disabled tank stays
    /// disabled.
    pub async fn refuel_cistern(&mut self, cistern_id: &str, liters: f64) -> LedgerResult<Outcome> {
        self.refuel(cistern_id, liters)
            .await
            .inspect_err(|e| log_rejection(OperationKind::Refuel, e))
    }

    async fn refuel(&mut self, cistern_id: &str, liters: f64) -> LedgerResult<Outcome> {
        validate_cistern_id(cistern_id)?;
        validate_liters(liters)?;

        let index = self.cistern_index(cistern_id)?;
        let cistern = &self.cisterns[index];
        if !cistern.can_accept(liters) {
            return Err(LedgerError::Overflow {
                cistern_id: cistern_id.to_string(),
                headroom: cistern.headroom(),
                requested: liters,
            });
        }

        let mut cisterns = self.cisterns.clone();
        cisterns[index].current_volume += liters;
        let new_volume = cisterns[index].current_volume;

        let mut staged = Staged {
            cisterns: Some(cisterns),
            ..Staged::default()
        };
        let timestamp = self.next_timestamp();
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            format!("Refuel of cistern {} by {} L", cistern_id, liters),
            OperationDetails::Refuel {
                cistern_id: cistern_id.to_string(),
                liters,
            },
        );
        self.apply(staged).await?;

        info!(cistern = %cistern_id, liters, volume = new_volume, "Cistern refueled");

        Ok(Outcome::logged(
            format!("Cistern {} refueled with {} L", cistern_id, liters),
            operation_id,
        ))
    }

    // -------------------------------------------------------------------------
    // Transfer
    // -------------------------------------------------------------------------

    /// Pumps `liters` from one tank into another of the same fuel type.
    ///
    /// ## Checks (in order)
    /// 1. Liters finite and positive
    /// 2. Source and target are distinct tanks
    /// 3. Both tanks exist
    /// 4. Same fuel type
    /// 5. Source active
    /// 6. Source holds enough
    /// 7. Target will not overflow
    ///
    /// Both volumes change in the same commit; total fuel is conserved.
    pub async fn transfer_fuel(
        &mut self,
        source_id: &str,
        target_id: &str,
        liters: f64,
    ) -> LedgerResult<Outcome> {
        self.transfer(source_id, target_id, liters)
            .await
            .inspect_err(|e| log_rejection(OperationKind::Transfer, e))
    }

    async fn transfer(
        &mut self,
        source_id: &str,
        target_id: &str,
        liters: f64,
    ) -> LedgerResult<Outcome> {
        validate_liters(liters)?;
        if source_id == target_id {
            return Err(LedgerError::SelfTransfer(source_id.to_string()));
        }

        let source_index = self.cistern_index(source_id)?;
        let target_index = self.cistern_index(target_id)?;
        let source = &self.cisterns[source_index];
        let target = &self.cisterns[target_index];

        if source.fuel_type != target.fuel_type {
            return Err(LedgerError::FuelTypeMismatch {
                source_fuel: source.fuel_type.clone(),
                target_fuel: target.fuel_type.clone(),
            });
        }
        if !source.is_active {
            return Err(LedgerError::CisternInactive(source_id.to_string()));
        }
        if !source.can_supply(liters) {
            return Err(LedgerError::InsufficientFuel {
                cistern_id: source_id.to_string(),
                available: source.current_volume,
                requested: liters,
            });
        }
        if !target.can_accept(liters) {
            return Err(LedgerError::Overflow {
                cistern_id: target_id.to_string(),
                headroom: target.headroom(),
                requested: liters,
            });
        }

        let fuel_type = source.fuel_type.clone();
        let mut cisterns = self.cisterns.clone();
        cisterns[source_index].current_volume -= liters;
        cisterns[target_index].current_volume += liters;

        let mut staged = Staged {
            cisterns: Some(cisterns),
            ..Staged::default()
        };
        let timestamp = self.next_timestamp();
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            format!(
                "Transfer of {} L {} from {} to {}",
                liters, fuel_type, source_id, target_id
            ),
            OperationDetails::Transfer {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                liters,
                fuel_type: fuel_type.clone(),
            },
        );
        self.apply(staged).await?;

        info!(
            source = %source_id,
            target = %target_id,
            fuel_type = %fuel_type,
            liters,
            "Fuel transferred"
        );

        Ok(Outcome::logged(
            format!(
                "Transferred {} L from {} to {}",
                liters, source_id, target_id
            ),
            operation_id,
        ))
    }

    // -------------------------------------------------------------------------
    // Tank Toggle
    // -------------------------------------------------------------------------

    /// Enables or disables a tank by hand.
    ///
    /// Disabling always succeeds. Enabling is refused while the tank is
    /// below its safety floor.
    pub async fn toggle_cistern(&mut self, cistern_id: &str, enable: bool) -> LedgerResult<Outcome> {
        self.toggle(cistern_id, enable)
            .await
            .inspect_err(|e| log_rejection(OperationKind::ToggleCistern, e))
    }

    async fn toggle(&mut self, cistern_id: &str, enable: bool) -> LedgerResult<Outcome> {
        validate_cistern_id(cistern_id)?;

        let index = self.cistern_index(cistern_id)?;
        let cistern = &self.cisterns[index];
        if enable && cistern.is_below_min() {
            return Err(LedgerError::BelowMinLevel {
                cistern_id: cistern_id.to_string(),
                min_level: cistern.min_level,
            });
        }

        let (action, verb) = if enable {
            (ToggleAction::Enable, "enabled")
        } else {
            (ToggleAction::Disable, "disabled")
        };

        let mut cisterns = self.cisterns.clone();
        cisterns[index].is_active = enable;

        let mut staged = Staged {
            cisterns: Some(cisterns),
            ..Staged::default()
        };
        let timestamp = self.next_timestamp();
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            format!("Manual control: cistern {} {}", cistern_id, verb),
            OperationDetails::ToggleCistern {
                cistern_id: cistern_id.to_string(),
                action,
            },
        );
        self.apply(staged).await?;

        info!(cistern = %cistern_id, enabled = enable, "Cistern toggled");

        Ok(Outcome::logged(
            format!("Cistern {} {}", cistern_id, verb),
            operation_id,
        ))
    }

    // -------------------------------------------------------------------------
    // Emergency
    // -------------------------------------------------------------------------

    /// Normal → Emergency: every tank is forced off and sales are locked.
    ///
    /// Triggering while already in Emergency succeeds without a new log entry.
    pub async fn trigger_emergency(&mut self) -> LedgerResult<Outcome> {
        if self.mode == StationMode::Emergency {
            return Ok(Outcome::unchanged("Emergency mode is already active."));
        }

        let mut cisterns = self.cisterns.clone();
        for cistern in cisterns.iter_mut() {
            cistern.is_active = false;
        }

        let mut staged = Staged {
            cisterns: Some(cisterns),
            ..Staged::default()
        };
        let timestamp = self.next_timestamp();
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            "EMERGENCY MODE ACTIVATED! All systems locked.".to_string(),
            OperationDetails::Emergency {
                action: EmergencyAction::EmergencyActivated,
            },
        );
        self.apply(staged)
            .await
            .inspect_err(|e| log_rejection(OperationKind::Emergency, e))?;
        self.mode = StationMode::Emergency;

        warn!(cisterns = self.cisterns.len(), "Emergency mode activated");

        Ok(Outcome::logged(
            "EMERGENCY MODE! All cisterns are locked. Emergency services have been called."
                .to_string(),
            operation_id,
        ))
    }

    /// Emergency → Normal. Tanks stay disabled and must be re-enabled one
    /// by one, subject to the min-level rule.
    pub async fn disable_emergency(&mut self) -> LedgerResult<Outcome> {
        if self.mode == StationMode::Normal {
            return Ok(Outcome::unchanged("Emergency mode is not active."));
        }

        let mut staged = Staged::default();
        let timestamp = self.next_timestamp();
        let operation_id = self.stage_operation(
            &mut staged,
            timestamp,
            "Emergency mode disabled".to_string(),
            OperationDetails::Emergency {
                action: EmergencyAction::EmergencyDisabled,
            },
        );
        self.apply(staged)
            .await
            .inspect_err(|e| log_rejection(OperationKind::Emergency, e))?;
        self.mode = StationMode::Normal;

        info!("Emergency mode disabled");

        Ok(Outcome::logged(
            "Emergency mode disabled. Cisterns remain locked.".to_string(),
            operation_id,
        ))
    }

    // -------------------------------------------------------------------------
    // Flush
    // -------------------------------------------------------------------------

    /// Writes tanks, columns and statistics back to the store.
    pub async fn save_all(&mut self) -> LedgerResult<()> {
        let staged = Staged {
            cisterns: Some(self.cisterns.clone()),
            columns: Some(self.columns.clone()),
            statistics: Some(self.statistics.clone()),
            ..Staged::default()
        };
        self.apply(staged).await
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cisterns(&self) -> &[Cistern] {
        &self.cisterns
    }

    pub fn cistern(&self, id: &str) -> Option<&Cistern> {
        self.cisterns.iter().find(|c| c.id == id)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Every sale, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn sequences(&self) -> Sequences {
        self.sequences
    }

    pub fn mode(&self) -> StationMode {
        self.mode
    }

    pub fn emergency_mode(&self) -> bool {
        self.mode == StationMode::Emergency
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    pub(crate) fn cistern_index(&self, id: &str) -> LedgerResult<usize> {
        self.cisterns
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LedgerError::CisternNotFound(id.to_string()))
    }

    /// Wall-clock time, never earlier than the last logged operation.
    pub(crate) fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.history.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }

    /// Adds an operation to `staged` and returns the id it will get.
    pub(crate) fn stage_operation(
        &self,
        staged: &mut Staged,
        timestamp: DateTime<Utc>,
        description: String,
        details: OperationDetails,
    ) -> u64 {
        let id = self.sequences.next_operation_id + staged.operations.len() as u64;
        staged.operations.push(Operation {
            id,
            timestamp,
            description,
            details,
        });
        id
    }

    /// Commits `staged` through the store, then makes it the current state.
    pub(crate) async fn apply(&mut self, staged: Staged) -> LedgerResult<()> {
        let sequences = Sequences {
            next_operation_id: self.sequences.next_operation_id + staged.operations.len() as u64,
            next_transaction_id: self.sequences.next_transaction_id
                + u64::from(staged.transaction.is_some()),
        };

        {
            let changes = Changeset {
                cisterns: staged.cisterns.as_deref(),
                columns: staged.columns.as_deref(),
                statistics: staged.statistics.as_ref(),
                operations: &staged.operations,
                transaction: staged.transaction.as_ref(),
                sequences,
            };
            debug!(
                operations = changes.operations.len(),
                transaction = changes.transaction.is_some(),
                "Committing changeset"
            );
            self.store.commit(&changes).await?;
        }

        if let Some(cisterns) = staged.cisterns {
            self.cisterns = cisterns;
        }
        if let Some(columns) = staged.columns {
            self.columns = columns;
        }
        if let Some(statistics) = staged.statistics {
            self.statistics = statistics;
        }
        self.history.extend(staged.operations);
        if let Some(transaction) = staged.transaction {
            self.transactions.push(transaction);
        }
        self.sequences = sequences;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
