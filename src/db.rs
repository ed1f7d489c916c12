//! Database module - SQLite prediction log
//!
//! Every operation opens its own connection and closes it before returning.
//! No handle is held across calls, so concurrent writers from other processes
//! are serialized by SQLite's file lock and nothing else.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::error::StorageError;
use crate::models::{NewPrediction, PredictionRecord};

/// Timestamp layout stored in the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only store of prediction records
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .connect()
            .await
            .map_err(|source| StorageError::Open {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Create the `predictions` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await?;
        sqlx::query(SCHEMA_SQL).execute(&mut conn).await?;
        conn.close().await?;

        tracing::debug!("Schema ready at {}", self.path.display());
        Ok(())
    }

    /// Insert one record, committing before returning
    pub async fn append(&self, record: &NewPrediction) -> Result<(), StorageError> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let features = &record.features;

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO predictions (
                timestamp, sleep_quality, headaches_per_week, academic_performance,
                study_load, extracurricular_activities, prediction_result, prediction_probability
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&timestamp)
        .bind(features.sleep_quality())
        .bind(features.headaches_per_week())
        .bind(features.academic_performance())
        .bind(features.study_load())
        .bind(features.extracurricular_activities())
        .bind(record.label.as_str())
        .bind(record.probability)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        conn.close().await?;

        tracing::debug!("Stored prediction #{} at {}", result.last_insert_rowid(), timestamp);
        Ok(())
    }

    /// Up to `limit` newest records, newest first.
    ///
    /// Read failures degrade to an empty history.
    pub async fn load_recent(&self, limit: i64) -> Vec<PredictionRecord> {
        match self.fetch_recent(limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("History unavailable, showing none: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_recent(&self, limit: i64) -> Result<Vec<PredictionRecord>, StorageError> {
        let mut conn = self.connect().await?;

        let records = sqlx::query_as::<_, PredictionRecord>(
            r#"
            SELECT id, timestamp, sleep_quality, headaches_per_week, academic_performance,
                   study_load, extracurricular_activities, prediction_result, prediction_probability
            FROM predictions
            ORDER BY id DESC
            LIMIT ?
            "#
        )
        .bind(limit.max(0))
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;
        Ok(records)
    }

    /// Total number of stored records
    pub async fn count(&self) -> Result<i64, StorageError> {
        let mut conn = self.connect().await?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM predictions")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(count)
    }
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    sleep_quality INTEGER NOT NULL,
    headaches_per_week INTEGER NOT NULL,
    academic_performance INTEGER NOT NULL,
    study_load INTEGER NOT NULL,
    extracurricular_activities INTEGER NOT NULL,
    prediction_result TEXT NOT NULL,
    prediction_probability REAL NOT NULL
)
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureVector, Label};
    use tempfile::tempdir;

    fn record(sleep: i64, label: Label, probability: f64) -> NewPrediction {
        NewPrediction {
            features: FeatureVector::clamped(sleep, 2, 3, 4, 5),
            label,
            probability,
        }
    }

    async fn table_count(store: &RecordStore) -> i64 {
        let mut conn = store.connect().await.unwrap();
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'predictions'",
        )
        .fetch_one(&mut conn)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("predictions.db"));

        for _ in 0..3 {
            store.ensure_schema().await.unwrap();
        }

        assert_eq!(table_count(&store).await, 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_then_load() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("predictions.db"));
        store.ensure_schema().await.unwrap();

        store.append(&record(4, Label::High, 0.73)).await.unwrap();

        let history = store.load_recent(1).await;
        assert_eq!(history.len(), 1);

        let row = &history[0];
        assert!(row.id > 0);
        assert!(chrono::NaiveDateTime::parse_from_str(&row.timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(row.sleep_quality, 4);
        assert_eq!(row.headaches_per_week, 2);
        assert_eq!(row.academic_performance, 3);
        assert_eq!(row.study_load, 4);
        assert_eq!(row.extracurricular_activities, 5);
        assert_eq!(row.prediction_result, "STRES TINGGI");
        assert_eq!(row.prediction_probability, 0.73);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("predictions.db"));
        store.ensure_schema().await.unwrap();

        store.append(&record(1, Label::LowOrNormal, 0.8)).await.unwrap();
        store.append(&record(2, Label::High, 0.6)).await.unwrap();

        let history = store.load_recent(2).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sleep_quality, 2);
        assert_eq!(history[1].sleep_quality, 1);
        assert!(history[0].id > history[1].id);
    }

    #[tokio::test]
    async fn test_limit_returns_most_recent() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("predictions.db"));
        store.ensure_schema().await.unwrap();

        for i in 0..15 {
            let mut r = record(1, Label::LowOrNormal, 0.5);
            r.probability = i as f64 / 100.0;
            store.append(&r).await.unwrap();
        }

        let history = store.load_recent(10).await;
        assert_eq!(history.len(), 10);

        let probabilities: Vec<f64> = history.iter().map(|r| r.prediction_probability).collect();
        let expected: Vec<f64> = (5..15).rev().map(|i| i as f64 / 100.0).collect();
        assert_eq!(probabilities, expected);
        assert_eq!(store.count().await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_load_without_schema_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("fresh.db"));

        assert!(store.load_recent(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_unopenable_store_fails_append() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        assert!(store.append(&record(3, Label::High, 0.9)).await.is_err());
        assert!(store.load_recent(10).await.is_empty());
    }
}
