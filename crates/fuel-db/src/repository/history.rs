//! # History Repository
//!
//! The two append-only journals: the operation log and the sales journal.
//!
//! ```text
//! operations    id │ timestamp │ operation_type │ description │ details (JSON)
//! transactions  id │ timestamp │ column_id │ fuel_type │ liters │ prices (minor)
//! ```
//!
//! Rows are inserted, never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{from_db_id, to_db_id};
use fuel_core::{FuelType, Money, Operation, OperationDetails, Transaction};

const OPERATIONS: &str = "operations";
const TRANSACTIONS: &str = "transactions";

#[derive(Debug, FromRow)]
struct OperationRow {
    id: i64,
    timestamp: DateTime<Utc>,
    description: String,
    details: String,
}

impl TryFrom<OperationRow> for Operation {
    type Error = DbError;

    fn try_from(row: OperationRow) -> DbResult<Self> {
        let details: OperationDetails =
            serde_json::from_str(&row.details).map_err(|e| DbError::corrupt(OPERATIONS, e))?;

        Ok(Operation {
            id: from_db_id(row.id, OPERATIONS)?,
            timestamp: row.timestamp,
            description: row.description,
            details,
        })
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: i64,
    timestamp: DateTime<Utc>,
    column_id: i64,
    fuel_type: String,
    liters: f64,
    price_per_liter_minor: i64,
    total_price_minor: i64,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        let column_id = u32::try_from(row.column_id).map_err(|_| {
            DbError::corrupt(TRANSACTIONS, format!("column id {} out of range", row.column_id))
        })?;

        Ok(Transaction {
            id: from_db_id(row.id, TRANSACTIONS)?,
            timestamp: row.timestamp,
            column_id,
            fuel_type: FuelType::from(row.fuel_type),
            liters: row.liters,
            price_per_liter: Money::from_minor(row.price_per_liter_minor),
            total_price: Money::from_minor(row.total_price_minor),
        })
    }
}

/// Repository for the operation log and sales journal.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Every operation, oldest first.
    pub async fn list_operations(&self) -> DbResult<Vec<Operation>> {
        let rows: Vec<OperationRow> = sqlx::query_as(
            "SELECT id, timestamp, description, details FROM operations ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Operation::try_from).collect()
    }

    /// Every sale, oldest first.
    pub async fn list_transactions(&self) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, timestamp, column_id, fuel_type, liters,
                   price_per_liter_minor, total_price_minor
            FROM transactions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Number of logged operations of one type (e.g. `"sale"`).
    pub async fn count_operations(&self, operation_type: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM operations WHERE operation_type = ?1")
                .bind(operation_type)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Appends operations on `conn`.
    pub async fn append_operations(
        conn: &mut SqliteConnection,
        operations: &[Operation],
    ) -> DbResult<()> {
        for op in operations {
            debug!(id = op.id, operation_type = %op.operation_type(), "Appending operation");

            let details =
                serde_json::to_string(&op.details).map_err(|e| DbError::corrupt(OPERATIONS, e))?;

            sqlx::query(
                r#"
                INSERT INTO operations (id, timestamp, operation_type, description, details)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(to_db_id(op.id, OPERATIONS)?)
            .bind(op.timestamp)
            .bind(op.operation_type().as_str())
            .bind(&op.description)
            .bind(details)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Appends one sale on `conn`.
    pub async fn append_transaction(
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> DbResult<()> {
        debug!(id = transaction.id, "Appending transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, timestamp, column_id, fuel_type, liters,
                price_per_liter_minor, total_price_minor
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(to_db_id(transaction.id, TRANSACTIONS)?)
        .bind(transaction.timestamp)
        .bind(transaction.column_id)
        .bind(transaction.fuel_type.as_str())
        .bind(transaction.liters)
        .bind(transaction.price_per_liter.minor_units())
        .bind(transaction.total_price.minor_units())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use fuel_core::{EmergencyAction, ToggleAction};

    fn operation(id: u64, details: OperationDetails) -> Operation {
        Operation {
            id,
            timestamp: Utc::now(),
            description: format!("op {}", id),
            details,
        }
    }

    #[tokio::test]
    async fn test_operations_keep_details_and_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ops = vec![
            operation(
                1,
                OperationDetails::ToggleCistern {
                    cistern_id: "AI-92 #1".to_string(),
                    action: ToggleAction::AutoDisable,
                },
            ),
            operation(
                2,
                OperationDetails::Emergency {
                    action: EmergencyAction::EmergencyActivated,
                },
            ),
        ];

        {
            let mut conn = db.pool().acquire().await.unwrap();
            HistoryRepository::append_operations(&mut conn, &ops).await.unwrap();
        }

        let history = db.history();
        assert_eq!(history.list_operations().await.unwrap(), ops);
        assert_eq!(history.count_operations("emergency").await.unwrap(), 1);
        assert_eq!(history.count_operations("sale").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_operation_id_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let op = operation(
            7,
            OperationDetails::Refuel {
                cistern_id: "DT #1".to_string(),
                liters: 10.0,
            },
        );

        let mut conn = db.pool().acquire().await.unwrap();
        HistoryRepository::append_operations(&mut conn, &[op.clone()])
            .await
            .unwrap();
        assert!(HistoryRepository::append_operations(&mut conn, &[op])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_transaction_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tx = Transaction {
            id: 1,
            timestamp: Utc::now(),
            column_id: 3,
            fuel_type: FuelType::from("DT"),
            liters: 42.5,
            price_per_liter: Money::from_minor(5200),
            total_price: Money::from_minor(221_000),
        };

        {
            let mut conn = db.pool().acquire().await.unwrap();
            HistoryRepository::append_transaction(&mut conn, &tx).await.unwrap();
        }

        assert_eq!(db.history().list_transactions().await.unwrap(), vec![tx]);
    }
}
