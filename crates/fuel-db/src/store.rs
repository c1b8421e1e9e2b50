//! # SQLite Station Store
//!
//! [`StationStore`] on top of the repositories.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit(Changeset)                                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    cisterns?     → DELETE + INSERT all                                  │
//! │    columns?      → DELETE + INSERT all                                  │
//! │    statistics?   → UPSERT row 1                                         │
//! │    operations    → INSERT each                                          │
//! │    transaction?  → INSERT                                               │
//! │    sequences     → UPSERT row 1                                         │
//! │  COMMIT          (any error → ROLLBACK, nothing written)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fresh database is seeded with the default fleet when the store opens.

use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{
    CisternRepository, ColumnRepository, HistoryRepository, SequenceRepository,
    StatisticsRepository,
};
use fuel_core::store::{Changeset, StationStore};
use fuel_core::{seed, Cistern, Column, Operation, Sequences, Statistics, StoreResult, Transaction};

/// Persistence gateway backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wraps a migrated database, seeding it if it holds no station yet.
    pub async fn open(db: Database) -> DbResult<Self> {
        let store = SqliteStore { db };
        store.seed_if_empty().await?;
        Ok(store)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Writes the default tanks, columns and statistics into an empty
    /// database. Returns whether anything was written.
    pub async fn seed_if_empty(&self) -> DbResult<bool> {
        let cisterns = self.db.cisterns().count().await?;
        let columns = self.db.columns().count().await?;
        if cisterns > 0 || columns > 0 {
            debug!(cisterns, columns, "Station already initialized");
            return Ok(false);
        }

        let has_statistics = self.db.statistics().get().await?.is_some();

        let mut tx = self.db.pool().begin().await?;
        CisternRepository::replace_all(&mut tx, &seed::default_cisterns()).await?;
        ColumnRepository::replace_all(&mut tx, &seed::default_columns()).await?;
        if !has_statistics {
            StatisticsRepository::save(&mut tx, &seed::default_statistics()).await?;
        }
        tx.commit().await?;

        info!("Seeded default station fleet");
        Ok(true)
    }

    async fn write(&self, changes: &Changeset<'_>) -> DbResult<()> {
        let mut tx = self.db.pool().begin().await?;

        if let Some(cisterns) = changes.cisterns {
            CisternRepository::replace_all(&mut tx, cisterns).await?;
        }
        if let Some(columns) = changes.columns {
            ColumnRepository::replace_all(&mut tx, columns).await?;
        }
        if let Some(statistics) = changes.statistics {
            StatisticsRepository::save(&mut tx, statistics).await?;
        }
        HistoryRepository::append_operations(&mut tx, changes.operations).await?;
        if let Some(transaction) = changes.transaction {
            HistoryRepository::append_transaction(&mut tx, transaction).await?;
        }
        SequenceRepository::save(&mut tx, changes.sequences).await?;

        tx.commit().await?;
        Ok(())
    }
}

impl StationStore for SqliteStore {
    async fn load_cisterns(&self) -> StoreResult<Vec<Cistern>> {
        Ok(self.db.cisterns().list_all().await?)
    }

    async fn load_columns(&self) -> StoreResult<Vec<Column>> {
        Ok(self.db.columns().list_all().await?)
    }

    async fn load_statistics(&self) -> StoreResult<Statistics> {
        Ok(self
            .db
            .statistics()
            .get()
            .await?
            .unwrap_or_else(seed::default_statistics))
    }

    async fn load_history(&self) -> StoreResult<Vec<Operation>> {
        Ok(self.db.history().list_operations().await?)
    }

    async fn load_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.db.history().list_transactions().await?)
    }

    async fn load_sequences(&self) -> StoreResult<Option<Sequences>> {
        Ok(self.db.sequences().get().await?)
    }

    async fn commit(&self, changes: &Changeset<'_>) -> StoreResult<()> {
        debug!(
            operations = changes.operations.len(),
            transaction = changes.transaction.is_some(),
            "Committing changeset to SQLite"
        );
        Ok(self.write(changes).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use fuel_core::seed::{AI_92_TANK, AI_95_TANK_1, AI_95_TANK_2};
    use fuel_core::{FailureKind, FuelType, Ledger, Money, StationConfig, StoreError};

    async fn store() -> SqliteStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteStore::open(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_is_seeded_once() {
        let store = store().await;
        assert_eq!(store.load_cisterns().await.unwrap(), seed::default_cisterns());
        assert_eq!(store.load_columns().await.unwrap(), seed::default_columns());
        assert_eq!(
            store.load_statistics().await.unwrap(),
            seed::default_statistics()
        );
        assert!(store.load_history().await.unwrap().is_empty());
        assert_eq!(store.load_sequences().await.unwrap(), None);

        assert!(!store.seed_if_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_ledger_sale_persists() {
        let mut ledger = Ledger::open(store().await, StationConfig::default())
            .await
            .unwrap();
        ledger
            .serve_customer(1, &FuelType::from("AI-92"), 500.0)
            .await
            .unwrap();

        let store = ledger.store();
        let tanks = store.load_cisterns().await.unwrap();
        assert_eq!(tanks[0].id, AI_92_TANK);
        assert_eq!(tanks[0].current_volume, 11900.0);

        let stats = store.load_statistics().await.unwrap();
        assert_eq!(stats.total_income, Money::from_major_minor(28735, 0));
        assert_eq!(store.load_transactions().await.unwrap().len(), 1);
        assert_eq!(store.load_history().await.unwrap().len(), 1);
        assert_eq!(
            store.load_sequences().await.unwrap(),
            Some(Sequences {
                next_operation_id: 2,
                next_transaction_id: 2,
            })
        );
    }

    #[tokio::test]
    async fn test_reopen_restores_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStore::open(db.clone()).await.unwrap();

        let mut ledger = Ledger::open(store, StationConfig::default()).await.unwrap();
        ledger
            .transfer_fuel(AI_95_TANK_1, AI_95_TANK_2, 800.0)
            .await
            .unwrap();
        ledger.trigger_emergency().await.unwrap();

        let reopened = Ledger::open(SqliteStore::open(db).await.unwrap(), StationConfig::default())
            .await
            .unwrap();

        assert!(!reopened.emergency_mode());
        assert!(reopened.cisterns().iter().all(|c| !c.is_active));
        assert_eq!(reopened.cistern(AI_95_TANK_2).unwrap().current_volume, 2000.0);
        assert_eq!(reopened.history(0).len(), 2);
        assert_eq!(reopened.sequences().next_operation_id, 3);
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let store = store().await;
        let mut tanks = store.load_cisterns().await.unwrap();
        tanks[0].current_volume = 1.0;

        let bad = Operation {
            id: 1,
            timestamp: chrono::Utc::now(),
            description: "dup".to_string(),
            details: fuel_core::OperationDetails::Refuel {
                cistern_id: AI_92_TANK.to_string(),
                liters: 1.0,
            },
        };
        // same id twice violates the primary key halfway through the write
        let ops = [bad.clone(), bad];
        let changes = Changeset {
            cisterns: Some(&tanks),
            operations: &ops,
            ..Changeset::new(Sequences::default())
        };

        let err = store.commit(&changes).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.load_cisterns().await.unwrap()[0].current_volume, 12400.0);
        assert!(store.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_database_is_infrastructure_failure() {
        let store = store().await;
        let mut ledger = Ledger::open(store, StationConfig::default()).await.unwrap();
        ledger.store().database().close().await;

        let err = ledger.refuel_cistern(AI_92_TANK, 100.0).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Infrastructure);
        assert_eq!(ledger.cistern(AI_92_TANK).unwrap().current_volume, 12400.0);
    }
}
