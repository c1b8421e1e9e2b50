//! # Cistern Repository
//!
//! Tank rows. The whole collection is replaced on every write; `position`
//! keeps the load order equal to the order the ledger saved.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use fuel_core::{Cistern, FuelType};

#[derive(Debug, FromRow)]
struct CisternRow {
    id: String,
    fuel_type: String,
    max_volume: f64,
    current_volume: f64,
    min_level: f64,
    is_active: bool,
}

impl From<CisternRow> for Cistern {
    fn from(row: CisternRow) -> Self {
        Cistern {
            id: row.id,
            fuel_type: FuelType::from(row.fuel_type),
            max_volume: row.max_volume,
            current_volume: row.current_volume,
            min_level: row.min_level,
            is_active: row.is_active,
        }
    }
}

/// Repository for tanks.
#[derive(Debug, Clone)]
pub struct CisternRepository {
    pool: SqlitePool,
}

impl CisternRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CisternRepository { pool }
    }

    /// All tanks in saved order.
    pub async fn list_all(&self) -> DbResult<Vec<Cistern>> {
        let rows: Vec<CisternRow> = sqlx::query_as(
            r#"
            SELECT id, fuel_type, max_volume, current_volume, min_level, is_active
            FROM cisterns
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cistern::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cistern>> {
        let row: Option<CisternRow> = sqlx::query_as(
            r#"
            SELECT id, fuel_type, max_volume, current_volume, min_level, is_active
            FROM cisterns
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cistern::from))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cisterns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces every stored tank, in its own transaction.
    pub async fn save_all(&self, cisterns: &[Cistern]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::replace_all(&mut tx, cisterns).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replaces every stored tank on `conn`.
    pub async fn replace_all(conn: &mut SqliteConnection, cisterns: &[Cistern]) -> DbResult<()> {
        debug!(count = cisterns.len(), "Replacing cisterns");

        sqlx::query("DELETE FROM cisterns")
            .execute(&mut *conn)
            .await?;

        for (position, cistern) in cisterns.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cisterns (
                    id, position, fuel_type,
                    max_volume, current_volume, min_level, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&cistern.id)
            .bind(position as i64)
            .bind(cistern.fuel_type.as_str())
            .bind(cistern.max_volume)
            .bind(cistern.current_volume)
            .bind(cistern.min_level)
            .bind(cistern.is_active)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use fuel_core::seed;

    #[tokio::test]
    async fn test_save_and_list_preserves_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cisterns();

        let mut tanks = seed::default_cisterns();
        tanks.reverse();
        repo.save_all(&tanks).await.unwrap();

        assert_eq!(repo.list_all().await.unwrap(), tanks);
        assert_eq!(repo.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_replace_drops_missing_tanks() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cisterns();

        let tanks = seed::default_cisterns();
        repo.save_all(&tanks).await.unwrap();
        repo.save_all(&tanks[..2]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.get_by_id(seed::DIESEL_TANK).await.unwrap().is_none());
        assert_eq!(
            repo.get_by_id(seed::AI_92_TANK).await.unwrap().unwrap().current_volume,
            12400.0
        );
    }

    #[tokio::test]
    async fn test_negative_volume_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cisterns();

        let mut tanks = seed::default_cisterns();
        repo.save_all(&tanks).await.unwrap();
        tanks[0].current_volume = -1.0;

        assert!(repo.save_all(&tanks).await.is_err());
        // the failed transaction rolled back
        assert_eq!(repo.count().await.unwrap(), 5);
    }
}
