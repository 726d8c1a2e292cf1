//! SQLite store backend
//!
//! Hierarchy and summary documents are stored as JSON columns next to the
//! keys the engine queries on; raw entries additionally index client and
//! timestamp so period fetches stay cheap. The schema is embedded and
//! idempotent (`IF NOT EXISTS` throughout).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use super::{HierarchyStore, MeasurementStore, SummaryStore};
use crate::aggregation_core::types::{EmissionSummary, ProcessHierarchy, RawEmissionEntry};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS process_hierarchies (
    client_id   TEXT PRIMARY KEY,
    document    TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS emission_entries (
    id                  TEXT PRIMARY KEY,
    client_id           TEXT NOT NULL,
    timestamp_ms        INTEGER NOT NULL,
    processing_status   TEXT NOT NULL,
    document            TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_emission_entries_client_ts
    ON emission_entries(client_id, timestamp_ms);

CREATE TABLE IF NOT EXISTS emission_summaries (
    client_id   TEXT NOT NULL,
    period_key  TEXT NOT NULL,
    document    TEXT NOT NULL,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL,
    PRIMARY KEY (client_id, period_key)
);
"#;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database and apply the embedded schema.
    pub fn open(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        log::info!("opened summary database at {}", db_path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Store a client's hierarchy document, replacing any previous one.
    /// Used by maintenance tooling and tests; hierarchy editing itself lives
    /// in an upstream service.
    pub fn put_hierarchy(
        &self,
        client_id: &str,
        hierarchy: &ProcessHierarchy,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO process_hierarchies (client_id, document, is_active, updated_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(client_id) DO UPDATE SET
                document = excluded.document,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
            rusqlite::params![
                client_id,
                serde_json::to_string(hierarchy)?,
                Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }

    /// Insert one raw measurement. Upstream ingestion owns these rows; this
    /// exists for tooling and test fixtures.
    pub fn insert_entry(
        &self,
        client_id: &str,
        entry: &RawEmissionEntry,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO emission_entries (id, client_id, timestamp_ms, processing_status, document)
            VALUES (?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                entry.id,
                client_id,
                entry.timestamp.timestamp_millis(),
                entry.processing_status,
                serde_json::to_string(entry)?
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl HierarchyStore for SqliteStore {
    async fn active_hierarchy(
        &self,
        client_id: &str,
    ) -> Result<Option<ProcessHierarchy>, Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT document FROM process_hierarchies WHERE client_id = ? AND is_active = 1",
        )?;

        let mut rows = stmt.query([client_id])?;
        match rows.next()? {
            Some(row) => {
                let document: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&document)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MeasurementStore for SqliteStore {
    async fn entries_in_range(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RawEmissionEntry>, Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT document FROM emission_entries
            WHERE client_id = ?
              AND timestamp_ms >= ? AND timestamp_ms <= ?
              AND processing_status = 'processed'
            ORDER BY timestamp_ms
            "#,
        )?;

        let documents = stmt.query_map(
            rusqlite::params![client_id, from.timestamp_millis(), to.timestamp_millis()],
            |row| row.get::<_, String>(0),
        )?;

        let mut entries = Vec::new();
        for document in documents {
            entries.push(serde_json::from_str(&document?)?);
        }
        Ok(entries)
    }
}

#[async_trait]
impl SummaryStore for SqliteStore {
    async fn upsert_summary(
        &self,
        summary: &EmissionSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().timestamp();
        conn.execute(
            r#"
            INSERT INTO emission_summaries (client_id, period_key, document, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(client_id, period_key) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
            rusqlite::params![
                summary.client_id,
                summary.period.storage_key(),
                serde_json::to_string(summary)?,
                now,
                now
            ],
        )?;
        Ok(())
    }

    async fn load_summary(
        &self,
        client_id: &str,
        period_key: &str,
    ) -> Result<Option<EmissionSummary>, Box<dyn std::error::Error>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT document FROM emission_summaries WHERE client_id = ? AND period_key = ?",
        )?;

        let mut rows = stmt.query([client_id, period_key])?;
        match rows.next()? {
            Some(row) => {
                let document: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&document)?))
            }
            None => Ok(None),
        }
    }
}
