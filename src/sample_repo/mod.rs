// SQLite raw sample store + sensor catalog.
// Uses sqlx for async + connection pooling, WAL journal, busy timeout.
// Samples land here from the ingest side; this service only reads, except
// for the seeding helpers used by tools and tests.

use std::path::Path;
use std::str::FromStr;

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::instrument;

use crate::catalog::{BucketingStrategy, SensorCatalog, SensorInfo};
use crate::engine::SampleSource;
use crate::error::EngineError;
use crate::models::{Sample, SampleRecord, SensorFilter};

pub struct SampleRepo {
    pool: SqlitePool,
}

impl SampleRepo {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS raw_samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                sensor TEXT NOT NULL,
                value REAL,
                time INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_samples_category_sensor_time ON raw_samples(category, sensor, time)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_catalog (
                internal_name TEXT PRIMARY KEY,
                bucketing TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seeding helper for tools and tests.
    #[instrument(skip(self, samples), fields(repo = "samples", operation = "insert_samples", samples_count = samples.len()))]
    pub async fn insert_samples(&self, category: &str, samples: &[Sample]) -> anyhow::Result<()> {
        if samples.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for s in samples {
            sqlx::query(
                "INSERT INTO raw_samples (category, sensor, value, time) VALUES ($1, $2, $3, $4)",
            )
            .bind(category)
            .bind(&s.sensor_name)
            .bind(s.value)
            .bind(s.time)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn upsert_catalog_entry(
        &self,
        internal_name: &str,
        bucketing: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sensor_catalog (internal_name, bucketing) VALUES ($1, $2)",
        )
        .bind(internal_name)
        .bind(bucketing)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads the catalog; a row carrying a strategy this engine does not
    /// know fails with `UnknownBucketingStrategy`.
    pub async fn load_catalog(&self) -> Result<SensorCatalog, EngineError> {
        let rows =
            sqlx::query("SELECT internal_name, bucketing FROM sensor_catalog ORDER BY internal_name")
                .fetch_all(&self.pool)
                .await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("internal_name")?;
            let bucketing: String = row.try_get("bucketing")?;
            entries.push(SensorInfo {
                name,
                bucketing: BucketingStrategy::from_str(&bucketing)?,
            });
        }
        Ok(SensorCatalog::new(entries))
    }
}

/// Full emitted sensor names for a filter set: bare names, prefixed with the
/// head number when one is set (e.g. "H02" + "temperature" -> "H02_temperature").
pub fn stamped_names(filters: &[SensorFilter]) -> Vec<String> {
    filters
        .iter()
        .flat_map(|f| {
            f.sensor_names.iter().map(move |name| match &f.head_number {
                Some(head) => format!("{head}_{name}"),
                None => name.clone(),
            })
        })
        .collect()
}

impl SampleSource for SampleRepo {
    #[instrument(skip(self, filters), fields(repo = "samples", operation = "fetch"))]
    async fn fetch(
        &self,
        category: &str,
        filters: &[SensorFilter],
        min_time: i64,
        max_time: i64,
    ) -> Result<Vec<SampleRecord>, EngineError> {
        let names = stamped_names(filters);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = sqlx::QueryBuilder::new(
            "SELECT sensor, value, time FROM raw_samples WHERE category = ",
        );
        qb.push_bind(category);
        qb.push(" AND time >= ").push_bind(min_time);
        qb.push(" AND time < ").push_bind(max_time);
        qb.push(" AND sensor IN (");
        let mut separated = qb.separated(", ");
        for name in &names {
            separated.push_bind(name);
        }
        separated.push_unseparated(") ORDER BY time DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            samples.push(Sample {
                sensor_name: row.try_get("sensor")?,
                value: row.try_get("value")?,
                time: row.try_get("time")?,
            });
        }
        Ok(vec![SampleRecord::Named { samples }])
    }

    #[instrument(skip(self, filters), fields(repo = "samples", operation = "has_sample_before"))]
    async fn has_sample_before(
        &self,
        category: &str,
        filters: &[SensorFilter],
        time: i64,
    ) -> Result<bool, EngineError> {
        let names = stamped_names(filters);
        if names.is_empty() {
            return Ok(false);
        }

        let mut qb = sqlx::QueryBuilder::new(
            "SELECT EXISTS(SELECT 1 FROM raw_samples WHERE category = ",
        );
        qb.push_bind(category);
        qb.push(" AND time < ").push_bind(time);
        qb.push(" AND sensor IN (");
        let mut separated = qb.separated(", ");
        for name in &names {
            separated.push_bind(name);
        }
        separated.push_unseparated(")) AS present");

        let row = qb.build().fetch_one(&self.pool).await?;
        let present: i64 = row.try_get("present")?;
        Ok(present != 0)
    }
}
