//! # Statistics Repository
//!
//! The single statistics row. Per-fuel tallies are a JSON object column.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;

use crate::error::{DbError, DbResult};
use crate::repository::{from_db_id, to_db_id};
use fuel_core::{FuelTally, FuelType, Money, Statistics};

const TABLE: &str = "statistics";

#[derive(Debug, FromRow)]
struct StatisticsRow {
    total_cars_served: i64,
    total_income_minor: i64,
    fuel_stats: String,
}

impl TryFrom<StatisticsRow> for Statistics {
    type Error = DbError;

    fn try_from(row: StatisticsRow) -> DbResult<Self> {
        let fuel_stats: BTreeMap<FuelType, FuelTally> =
            serde_json::from_str(&row.fuel_stats).map_err(|e| DbError::corrupt(TABLE, e))?;

        Ok(Statistics {
            total_cars_served: from_db_id(row.total_cars_served, TABLE)?,
            total_income: Money::from_minor(row.total_income_minor),
            fuel_stats,
        })
    }
}

/// Repository for the sales counters.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    pool: SqlitePool,
}

impl StatisticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatisticsRepository { pool }
    }

    /// The stored counters, `None` before the first save.
    pub async fn get(&self) -> DbResult<Option<Statistics>> {
        let row: Option<StatisticsRow> = sqlx::query_as(
            r#"
            SELECT total_cars_served, total_income_minor, fuel_stats
            FROM statistics
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Statistics::try_from).transpose()
    }

    /// Upserts the counters on `conn`.
    pub async fn save(conn: &mut SqliteConnection, stats: &Statistics) -> DbResult<()> {
        let fuel_stats =
            serde_json::to_string(&stats.fuel_stats).map_err(|e| DbError::corrupt(TABLE, e))?;

        sqlx::query(
            r#"
            INSERT INTO statistics (id, total_cars_served, total_income_minor, fuel_stats)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                total_cars_served = excluded.total_cars_served,
                total_income_minor = excluded.total_income_minor,
                fuel_stats = excluded.fuel_stats
            "#,
        )
        .bind(to_db_id(stats.total_cars_served, TABLE)?)
        .bind(stats.total_income.minor_units())
        .bind(fuel_stats)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use fuel_core::seed;

    #[tokio::test]
    async fn test_missing_row_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.statistics().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_single_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut stats = seed::default_statistics();
        {
            let mut conn = db.pool().acquire().await.unwrap();
            StatisticsRepository::save(&mut conn, &stats).await.unwrap();
        }

        stats.record_sale(&FuelType::from("AI-92"), 500.0, Money::from_minor(2_873_500));
        {
            let mut conn = db.pool().acquire().await.unwrap();
            StatisticsRepository::save(&mut conn, &stats).await.unwrap();
        }

        let loaded = db.statistics().get().await.unwrap().unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(loaded.total_cars_served, 1);
    }
}
