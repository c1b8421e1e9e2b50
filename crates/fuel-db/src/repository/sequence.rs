//! # Sequence Repository
//!
//! Next operation and transaction ids, kept in a single row.

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::DbResult;
use crate::repository::{from_db_id, to_db_id};
use fuel_core::Sequences;

const TABLE: &str = "sequences";

#[derive(Debug, FromRow)]
struct SequenceRow {
    next_operation_id: i64,
    next_transaction_id: i64,
}

/// Repository for the id counters.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// The stored counters, `None` before the first commit.
    pub async fn get(&self) -> DbResult<Option<Sequences>> {
        let row: Option<SequenceRow> = sqlx::query_as(
            "SELECT next_operation_id, next_transaction_id FROM sequences WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Sequences {
                next_operation_id: from_db_id(row.next_operation_id, TABLE)?,
                next_transaction_id: from_db_id(row.next_transaction_id, TABLE)?,
            })),
            None => Ok(None),
        }
    }

    /// Upserts the counters on `conn`.
    pub async fn save(conn: &mut SqliteConnection, sequences: Sequences) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sequences (id, next_operation_id, next_transaction_id)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                next_operation_id = excluded.next_operation_id,
                next_transaction_id = excluded.next_transaction_id
            "#,
        )
        .bind(to_db_id(sequences.next_operation_id, TABLE)?)
        .bind(to_db_id(sequences.next_transaction_id, TABLE)?)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.sequences().get().await.unwrap(), None);

        let seq = Sequences {
            next_operation_id: 12,
            next_transaction_id: 4,
        };
        {
            let mut conn = db.pool().acquire().await.unwrap();
            SequenceRepository::save(&mut conn, Sequences::default()).await.unwrap();
            SequenceRepository::save(&mut conn, seq).await.unwrap();
        }

        assert_eq!(db.sequences().get().await.unwrap(), Some(seq));
    }

    #[tokio::test]
    async fn test_out_of_range_counter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = SequenceRepository::save(
            &mut conn,
            Sequences {
                next_operation_id: u64::MAX,
                next_transaction_id: 1,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }
}
