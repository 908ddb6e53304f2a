//! SQLite Release Store
//!
//! File-based persistent storage using SQLite.
//! Suitable for local development, fixtures and testing.
//!
//! Schema:
//! - `releases`: release datasets of a project with their attempt
//! - `release_usages`: every usage of a release dataset
//! - `archived_usages`: usages of superseded releases kept for resurrection
//! - `project_usages`: the live, mutable project
//! - `id_map`: project usage id -> encoded stable id
//! - `id_reports`: created / deleted / resurrected ids per release
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::domain::models::{
    HistoricalUsage, IdReportType, MatchType, Rank, ReleaseInfo, TaxonomicStatus, UsageRecord,
};
use crate::domain::ports::{
    HistoryStream, IdMapWriter, IdReportSink, ReleaseHistory, UsageSource, UsageStream,
};
use crate::{Result, StorageError};

const USAGE_COLUMNS: &str = "id, canonical_nidx, nidx, rank, status, scientific_name, \
                             authorship, parent_label, name_phrase, match_type";

/// SQLite-based release store implementation
#[derive(Clone)]
pub struct SqliteReleaseStore {
    conn: Arc<Mutex<Connection>>,
    pending_mappings: Arc<Mutex<Vec<(u32, String, String)>>>,
    pending_reports: Arc<Mutex<Vec<(u32, IdReportType, u64)>>>,
}

impl SqliteReleaseStore {
    /// Create a new SQLite store at the given path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(db_path)?)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            pending_mappings: Arc::new(Mutex::new(Vec::new())),
            pending_reports: Arc::new(Mutex::new(Vec::new())),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::database("SQLite connection lock poisoned"))
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS releases (
                dataset_key INTEGER PRIMARY KEY,
                project_key INTEGER NOT NULL,
                attempt INTEGER,
                public BOOLEAN NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        for table in ["release_usages", "archived_usages", "project_usages"] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        owner_key INTEGER NOT NULL,
                        id TEXT NOT NULL,
                        canonical_nidx INTEGER,
                        nidx INTEGER,
                        rank TEXT NOT NULL,
                        status TEXT NOT NULL,
                        scientific_name TEXT NOT NULL,
                        authorship TEXT,
                        parent_label TEXT,
                        name_phrase TEXT,
                        match_type TEXT NOT NULL,
                        last_release_key INTEGER,
                        attempt INTEGER
                    )"
                ),
                [],
            )?;
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_owner
                     ON {table}(owner_key, canonical_nidx, nidx)"
                ),
                [],
            )?;
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS id_map (
                project_key INTEGER NOT NULL,
                usage_id TEXT NOT NULL,
                stable_id TEXT NOT NULL,
                PRIMARY KEY (project_key, usage_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS id_reports (
                dataset_key INTEGER NOT NULL,
                type TEXT NOT NULL,
                id INTEGER NOT NULL,
                PRIMARY KEY (dataset_key, type, id)
            )",
            [],
        )?;

        Ok(())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Fixture setup
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn insert_release(&self, project_key: u32, release: &ReleaseInfo) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO releases (dataset_key, project_key, attempt, public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                release.dataset_key,
                project_key,
                release.attempt,
                release.public,
                Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }

    pub fn insert_release_usages(&self, dataset_key: u32, usages: &[UsageRecord]) -> Result<()> {
        self.insert_usages("release_usages", dataset_key, usages.iter().map(|u| (u, None)))
    }

    pub fn insert_project_usages(&self, project_key: u32, usages: &[UsageRecord]) -> Result<()> {
        self.insert_usages("project_usages", project_key, usages.iter().map(|u| (u, None)))
    }

    pub fn insert_archived_usages(&self, project_key: u32, usages: &[HistoricalUsage]) -> Result<()> {
        self.insert_usages(
            "archived_usages",
            project_key,
            usages
                .iter()
                .map(|h| (&h.usage, Some((h.dataset_key, h.attempt)))),
        )
    }

    fn insert_usages<'u>(
        &self,
        table: &str,
        owner_key: u32,
        rows: impl Iterator<Item = (&'u UsageRecord, Option<(u32, u32)>)>,
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (owner_key, {USAGE_COLUMNS}, last_release_key, attempt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ))?;
            for (u, provenance) in rows {
                stmt.execute(params![
                    owner_key,
                    &u.usage_id,
                    u.canonical_name_index_id.map(to_sql_id),
                    u.name_index_id.map(to_sql_id),
                    u.rank.as_str(),
                    u.status.as_str(),
                    &u.scientific_name,
                    &u.authorship,
                    &u.parent_label,
                    &u.name_phrase,
                    u.match_type.as_str(),
                    provenance.map(|(key, _)| key),
                    provenance.map(|(_, attempt)| attempt),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Inspection
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Committed id map of a project, ordered by usage id
    pub fn id_map(&self, project_key: u32) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT usage_id, stable_id FROM id_map WHERE project_key = ?1 ORDER BY usage_id",
        )?;
        let rows = stmt
            .query_map(params![project_key], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Committed report ids of one type, ascending
    pub fn id_reports(&self, dataset_key: u32, kind: IdReportType) -> Result<Vec<u64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM id_reports WHERE dataset_key = ?1 AND type = ?2 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![dataset_key, kind.as_str()], |row| {
                row.get::<_, i64>(0).map(from_sql_id)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_usages(
        &self,
        sql: &str,
        key: u32,
    ) -> Result<Vec<(UsageRecord, Option<u32>, Option<u32>)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((read_usage(row)?, row.get(10)?, row.get(11)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn to_sql_id(id: u64) -> i64 {
    id as i64
}

fn from_sql_id(id: i64) -> u64 {
    id as u64
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = StorageError>,
{
    let text: String = row.get(idx)?;
    text.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads the usage columns in `USAGE_COLUMNS` order
fn read_usage(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    Ok(UsageRecord {
        usage_id: row.get(0)?,
        canonical_name_index_id: row.get::<_, Option<i64>>(1)?.map(from_sql_id),
        name_index_id: row.get::<_, Option<i64>>(2)?.map(from_sql_id),
        rank: parse_column::<Rank>(row, 3)?,
        status: parse_column::<TaxonomicStatus>(row, 4)?,
        scientific_name: row.get(5)?,
        authorship: row.get(6)?,
        parent_label: row.get(7)?,
        name_phrase: row.get(8)?,
        match_type: parse_column::<MatchType>(row, 9)?,
    })
}

impl UsageSource for SqliteReleaseStore {
    fn current_usages(&self, project_key: u32) -> Result<UsageStream<'_>> {
        let rows = self.query_usages(
            &format!(
                "SELECT {USAGE_COLUMNS}, last_release_key, attempt FROM project_usages
                 WHERE owner_key = ?1
                 ORDER BY canonical_nidx IS NULL, canonical_nidx, nidx IS NULL, nidx, rowid"
            ),
            project_key,
        )?;
        Ok(Box::new(rows.into_iter().map(|(usage, _, _)| Ok(usage))))
    }
}

impl ReleaseHistory for SqliteReleaseStore {
    fn latest_release(&self, project_key: u32) -> Result<Option<u32>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT dataset_key FROM releases
             WHERE project_key = ?1 AND public AND attempt IS NOT NULL
             ORDER BY attempt DESC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![project_key])?;
        let latest = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(latest)
    }

    fn release_attempts(&self, project_key: u32) -> Result<Vec<ReleaseInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT dataset_key, attempt, public FROM releases
             WHERE project_key = ?1 ORDER BY dataset_key",
        )?;
        let releases = stmt
            .query_map(params![project_key], |row| {
                Ok(ReleaseInfo {
                    dataset_key: row.get(0)?,
                    attempt: row.get(1)?,
                    public: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(releases)
    }

    fn release_usages(&self, dataset_key: u32) -> Result<HistoryStream<'_>> {
        let attempt: Option<u32> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare("SELECT attempt FROM releases WHERE dataset_key = ?1")?;
            let mut rows = stmt.query(params![dataset_key])?;
            let attempt = match rows.next()? {
                Some(row) => row.get(0)?,
                None => return Err(StorageError::release_not_found(dataset_key)),
            };
            attempt
        };
        let attempt = attempt.ok_or_else(|| {
            StorageError::database(format!("Release {} has no attempt", dataset_key))
        })?;

        let rows = self.query_usages(
            &format!(
                "SELECT {USAGE_COLUMNS}, last_release_key, attempt FROM release_usages
                 WHERE owner_key = ?1 ORDER BY rowid"
            ),
            dataset_key,
        )?;
        debug!("Read {} usages from release {}", rows.len(), dataset_key);
        Ok(Box::new(rows.into_iter().map(move |(usage, _, _)| {
            Ok(HistoricalUsage::new(usage, dataset_key, attempt))
        })))
    }

    fn archived_usages(&self, project_key: u32) -> Result<HistoryStream<'_>> {
        let rows = self.query_usages(
            &format!(
                "SELECT {USAGE_COLUMNS}, last_release_key, attempt FROM archived_usages
                 WHERE owner_key = ?1 ORDER BY attempt DESC, rowid"
            ),
            project_key,
        )?;
        Ok(Box::new(rows.into_iter().map(|(usage, release_key, attempt)| {
            match (release_key, attempt) {
                (Some(release_key), Some(attempt)) => {
                    Ok(HistoricalUsage::new(usage, release_key, attempt))
                }
                _ => Err(StorageError::database(format!(
                    "Archived usage {} without release provenance",
                    usage.usage_id
                ))),
            }
        })))
    }
}

impl IdMapWriter for SqliteReleaseStore {
    fn reset(&self, project_key: u32) -> Result<()> {
        self.pending_mappings
            .lock()
            .map_err(|_| StorageError::database("pending id map lock poisoned"))?
            .retain(|(key, _, _)| *key != project_key);
        self.conn()?
            .execute("DELETE FROM id_map WHERE project_key = ?1", params![project_key])?;
        Ok(())
    }

    fn map_usage(&self, project_key: u32, usage_id: &str, stable_id: &str) -> Result<()> {
        self.pending_mappings
            .lock()
            .map_err(|_| StorageError::database("pending id map lock poisoned"))?
            .push((project_key, usage_id.to_string(), stable_id.to_string()));
        Ok(())
    }

    fn commit(&self, project_key: u32) -> Result<()> {
        let pending: Vec<(u32, String, String)> = {
            let mut guard = self
                .pending_mappings
                .lock()
                .map_err(|_| StorageError::database("pending id map lock poisoned"))?;
            let (batch, rest) = std::mem::take(&mut *guard)
                .into_iter()
                .partition(|(key, _, _)| *key == project_key);
            *guard = rest;
            batch
        };
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::transaction(format!("BEGIN failed: {}", e)).with_source(e))?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO id_map (project_key, usage_id, stable_id) VALUES (?1, ?2, ?3)",
            )?;
            for (project_key, usage_id, stable_id) in &pending {
                stmt.execute(params![project_key, usage_id, stable_id])?;
            }
        }
        tx.commit()
            .map_err(|e| StorageError::transaction(format!("COMMIT failed: {}", e)).with_source(e))?;
        debug!("Committed {} id mappings", pending.len());
        Ok(())
    }
}

impl IdReportSink for SqliteReleaseStore {
    fn reset_reports(&self, dataset_key: u32) -> Result<()> {
        self.pending_reports
            .lock()
            .map_err(|_| StorageError::database("pending report lock poisoned"))?
            .retain(|(key, _, _)| *key != dataset_key);
        self.conn()?.execute(
            "DELETE FROM id_reports WHERE dataset_key = ?1",
            params![dataset_key],
        )?;
        Ok(())
    }

    fn record(&self, dataset_key: u32, kind: IdReportType, id: u64) -> Result<()> {
        self.pending_reports
            .lock()
            .map_err(|_| StorageError::database("pending report lock poisoned"))?
            .push((dataset_key, kind, id));
        Ok(())
    }

    fn commit_reports(&self, dataset_key: u32) -> Result<()> {
        let pending: Vec<(u32, IdReportType, u64)> = {
            let mut guard = self
                .pending_reports
                .lock()
                .map_err(|_| StorageError::database("pending report lock poisoned"))?;
            let (batch, rest) = std::mem::take(&mut *guard)
                .into_iter()
                .partition(|(key, _, _)| *key == dataset_key);
            *guard = rest;
            batch
        };
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO id_reports (dataset_key, type, id) VALUES (?1, ?2, ?3)",
            )?;
            for (dataset_key, kind, id) in &pending {
                stmt.execute(params![dataset_key, kind.as_str(), to_sql_id(*id)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
