//! # Column Repository
//!
//! Dispensing columns. The fuel → tank routing is a JSON object column.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fuel_core::{Column, FuelType};

const TABLE: &str = "fuel_columns";

#[derive(Debug, FromRow)]
struct ColumnRow {
    id: i64,
    available_fuels: String,
    is_active: bool,
}

impl TryFrom<ColumnRow> for Column {
    type Error = DbError;

    fn try_from(row: ColumnRow) -> DbResult<Self> {
        let id = u32::try_from(row.id)
            .map_err(|_| DbError::corrupt(TABLE, format!("column id {} out of range", row.id)))?;
        let available_fuels: BTreeMap<FuelType, String> =
            serde_json::from_str(&row.available_fuels).map_err(|e| DbError::corrupt(TABLE, e))?;

        Ok(Column {
            id,
            available_fuels,
            is_active: row.is_active,
        })
    }
}

/// Repository for dispensing columns.
#[derive(Debug, Clone)]
pub struct ColumnRepository {
    pool: SqlitePool,
}

impl ColumnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ColumnRepository { pool }
    }

    /// All columns by id.
    pub async fn list_all(&self) -> DbResult<Vec<Column>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT id, available_fuels, is_active FROM fuel_columns ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Column::try_from).collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fuel_columns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces every stored column, in its own transaction.
    pub async fn save_all(&self, columns: &[Column]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::replace_all(&mut tx, columns).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replaces every stored column on `conn`.
    pub async fn replace_all(conn: &mut SqliteConnection, columns: &[Column]) -> DbResult<()> {
        debug!(count = columns.len(), "Replacing columns");

        sqlx::query("DELETE FROM fuel_columns")
            .execute(&mut *conn)
            .await?;

        for column in columns {
            let fuels = serde_json::to_string(&column.available_fuels)
                .map_err(|e| DbError::corrupt(TABLE, e))?;

            sqlx::query(
                "INSERT INTO fuel_columns (id, available_fuels, is_active) VALUES (?1, ?2, ?3)",
            )
            .bind(column.id)
            .bind(fuels)
            .bind(column.is_active)
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
    async fn test_routing_survives_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.columns();

        let columns = seed::default_columns();
        repo.save_all(&columns).await.unwrap();

        let loaded = repo.list_all().await.unwrap();
        assert_eq!(loaded, columns);
        assert_eq!(
            loaded[4].cistern_for(&FuelType::from("AI-95")),
            Some(seed::AI_95_TANK_2)
        );
    }

    #[tokio::test]
    async fn test_malformed_routing_is_corrupt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO fuel_columns (id, available_fuels, is_active) VALUES (1, 'nope', 1)")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.columns().list_all().await.unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }
}
