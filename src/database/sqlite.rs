use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use super::{mine_triplets, HistoryStore};
use crate::error::StoreError;
use crate::types::{
    AggregatedStat, Animal, DailyCount, DateRange, HourlyCount, Outcome, SequentialPattern,
    WeekdayCount,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed draw history.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and ensure the schema exists.
    pub async fn new(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        info!("Initializing SQLite database at: {}", db_url);

        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;

        info!("Database initialized successfully");
        Ok(db)
    }

    /// Private in-memory database. Pinned to one connection, since every
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                draw_number TEXT NOT NULL UNIQUE,
                animal TEXT NOT NULL,
                draw_date TEXT NOT NULL,
                draw_time TEXT NOT NULL,
                drawn_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_outcomes_drawn_at ON outcomes(drawn_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_outcomes_animal ON outcomes(animal)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert one draw. Draw numbers are unique.
    pub async fn record_outcome(&self, outcome: &Outcome) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO outcomes (draw_number, animal, draw_date, draw_time, drawn_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&outcome.draw_number)
        .bind(outcome.animal.as_str())
        .bind(outcome.date.format(DATE_FORMAT).to_string())
        .bind(outcome.time.format(TIME_FORMAT).to_string())
        .bind(outcome.drawn_at().format(TIMESTAMP_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a batch of draws in one transaction.
    pub async fn record_outcomes(&self, outcomes: &[Outcome]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for outcome in outcomes {
            sqlx::query(
                r#"
                INSERT INTO outcomes (draw_number, animal, draw_date, draw_time, drawn_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&outcome.draw_number)
            .bind(outcome.animal.as_str())
            .bind(outcome.date.format(DATE_FORMAT).to_string())
            .bind(outcome.time.format(TIME_FORMAT).to_string())
            .bind(outcome.drawn_at().format(TIMESTAMP_FORMAT).to_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Recorded {} outcomes", outcomes.len());
        Ok(())
    }

    pub async fn outcome_count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM outcomes")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }
}

#[async_trait]
impl HistoryStore for Database {
    async fn aggregated_stats(&self, range: DateRange) -> Result<Vec<AggregatedStat>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT animal, COUNT(*) as count, MAX(drawn_at) as last_seen
            FROM outcomes
            WHERE drawn_at >= ? AND drawn_at <= ?
            GROUP BY animal
            "#,
        )
        .bind(range.start.format(TIMESTAMP_FORMAT).to_string())
        .bind(range.end.format(TIMESTAMP_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push((
                parse_animal(&row)?,
                count_of(&row)?,
                parse_timestamp(row.get("last_seen"))?,
            ));
        }

        Ok(AggregatedStat::rank(counts))
    }

    async fn frequency_by_hour(&self, range: DateRange) -> Result<Vec<HourlyCount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(strftime('%H', drawn_at) AS INTEGER) as hour, animal, COUNT(*) as count
            FROM outcomes
            WHERE drawn_at >= ? AND drawn_at <= ?
            GROUP BY hour, animal
            ORDER BY hour ASC, count DESC
            "#,
        )
        .bind(range.start.format(TIMESTAMP_FORMAT).to_string())
        .bind(range.end.format(TIMESTAMP_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(HourlyCount {
                hour: row.get::<i64, _>("hour") as u32,
                animal: parse_animal(&row)?,
                count: count_of(&row)?,
            });
        }

        Ok(counts)
    }

    async fn frequency_by_day(&self, range: DateRange) -> Result<Vec<WeekdayCount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(strftime('%w', drawn_at) AS INTEGER) as day_of_week, animal, COUNT(*) as count
            FROM outcomes
            WHERE drawn_at >= ? AND drawn_at <= ?
            GROUP BY day_of_week, animal
            ORDER BY day_of_week ASC, count DESC
            "#,
        )
        .bind(range.start.format(TIMESTAMP_FORMAT).to_string())
        .bind(range.end.format(TIMESTAMP_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(WeekdayCount {
                day_of_week: row.get::<i64, _>("day_of_week") as u32,
                animal: parse_animal(&row)?,
                count: count_of(&row)?,
            });
        }

        Ok(counts)
    }

    async fn daily_counts(
        &self,
        range: DateRange,
        animal: Option<Animal>,
    ) -> Result<Vec<DailyCount>, StoreError> {
        let filter = animal.map(|a| a.as_str());
        let rows = sqlx::query(
            r#"
            SELECT draw_date, animal, COUNT(*) as count
            FROM outcomes
            WHERE drawn_at >= ? AND drawn_at <= ?
              AND (? IS NULL OR animal = ?)
            GROUP BY draw_date, animal
            ORDER BY draw_date ASC
            "#,
        )
        .bind(range.start.format(TIMESTAMP_FORMAT).to_string())
        .bind(range.end.format(TIMESTAMP_FORMAT).to_string())
        .bind(filter)
        .bind(filter)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(DailyCount {
                date: parse_date(row.get("draw_date"))?,
                animal: parse_animal(&row)?,
                count: count_of(&row)?,
            });
        }

        Ok(counts)
    }

    async fn sequential_patterns(
        &self,
        sample_size: usize,
        min_frequency: u32,
    ) -> Result<Vec<SequentialPattern>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT animal
            FROM outcomes
            ORDER BY drawn_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(sample_size.saturating_add(2) as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut animals = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            animals.push(parse_animal(row)?);
        }

        Ok(mine_triplets(&animals, min_frequency))
    }

    async fn last_occurrence(&self, animal: Animal) -> Result<Option<Outcome>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT draw_number, animal, draw_date, draw_time
            FROM outcomes
            WHERE animal = ?
            ORDER BY drawn_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(animal.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(parse_outcome).transpose()
    }

    async fn recent_outcomes(&self, limit: usize) -> Result<Vec<Outcome>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT draw_number, animal, draw_date, draw_time
            FROM outcomes
            ORDER BY drawn_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_outcome).collect()
    }
}

fn parse_outcome(row: &SqliteRow) -> Result<Outcome, StoreError> {
    Ok(Outcome {
        draw_number: row.get("draw_number"),
        animal: parse_animal(row)?,
        date: parse_date(row.get("draw_date"))?,
        time: NaiveTime::parse_from_str(row.get("draw_time"), TIME_FORMAT)
            .map_err(|e| StoreError::Malformed(format!("draw_time: {}", e)))?,
    })
}

fn parse_animal(row: &SqliteRow) -> Result<Animal, StoreError> {
    let raw: String = row.get("animal");
    Animal::from_str(&raw).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StoreError::Malformed(format!("draw_date '{}': {}", raw, e)))
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::Malformed(format!("drawn_at '{}': {}", raw, e)))
}

fn count_of(row: &SqliteRow) -> Result<u64, StoreError> {
    let count: i64 = row.get("count");
    u64::try_from(count).map_err(|_| StoreError::Malformed(format!("negative count {}", count)))
}
