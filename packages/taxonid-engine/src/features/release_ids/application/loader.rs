//! Builds the released id population of a project
//!
//! The latest public release is read first, archived usages of older
//! releases after it (newest attempt first). Together with the first-wins
//! store this keeps the latest published appearance of every id.

use std::fmt;

use serde::Serialize;
use taxonid_storage::{HistoricalUsage, HistoryStream, ReleaseHistory};
use tracing::{debug, info, warn};

use crate::errors::{ReconcileError, Result};
use crate::features::release_ids::domain::{ReleaseAttempts, ReleaseIdStore, ReleasedId};

/// Row counters of one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Rows read from storage
    pub rows: usize,
    /// Rows skipped for lacking a names index id
    pub no_match: usize,
    /// Rows skipped for carrying a temporary id
    pub temporary: usize,
    /// Rows ignored because a newer appearance of the id was loaded already
    pub duplicates: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} without names match, {} temporary, {} superseded",
            self.rows, self.no_match, self.temporary, self.duplicates
        )
    }
}

pub struct ReleaseIdLoader<'a, H: ReleaseHistory + ?Sized> {
    history: &'a H,
    project_key: u32,
}

impl<'a, H: ReleaseHistory + ?Sized> ReleaseIdLoader<'a, H> {
    pub fn new(history: &'a H, project_key: u32) -> Self {
        Self {
            history,
            project_key,
        }
    }

    /// Attempts of all releases of the project that have one
    pub fn load_attempts(&self) -> Result<ReleaseAttempts> {
        let mut attempts = ReleaseAttempts::new();
        for release in self.history.release_attempts(self.project_key)? {
            if let Some(attempt) = release.attempt {
                attempts.insert(release.dataset_key, attempt);
            }
        }
        debug!(
            project = self.project_key,
            releases = attempts.len(),
            "Loaded release attempts"
        );
        Ok(attempts)
    }

    /// Load every previously released id
    ///
    /// Returns an empty store when the project was never released.
    pub fn load(&self, attempts: &ReleaseAttempts) -> Result<(ReleaseIdStore, LoadStats)> {
        let mut store = ReleaseIdStore::new();
        let mut stats = LoadStats::default();

        let Some(latest) = self.history.latest_release(self.project_key)? else {
            info!(
                project = self.project_key,
                "No previous public release, starting with an empty id store"
            );
            return Ok((store, stats));
        };

        info!(
            project = self.project_key,
            release = latest,
            attempt = ?attempts.attempt_of(latest),
            "Loading ids from latest release"
        );
        self.consume(self.history.release_usages(latest)?, attempts, &mut store, &mut stats)?;
        let after_latest = store.len();

        info!(project = self.project_key, "Loading ids from archived releases");
        self.consume(
            self.history.archived_usages(self.project_key)?,
            attempts,
            &mut store,
            &mut stats,
        )?;

        info!(
            project = self.project_key,
            latest = after_latest,
            archived = store.len() - after_latest,
            "Loaded released ids: {}",
            stats
        );
        if stats.temporary > 0 {
            warn!(
                project = self.project_key,
                temporary = stats.temporary,
                "Release rows with temporary ids were skipped"
            );
        }
        store.log_summary();
        Ok((store, stats))
    }

    fn consume(
        &self,
        rows: HistoryStream<'_>,
        attempts: &ReleaseAttempts,
        store: &mut ReleaseIdStore,
        stats: &mut LoadStats,
    ) -> Result<()> {
        for row in rows {
            let row = row?;
            stats.rows += 1;
            self.add_row(&row, attempts, store, stats)?;
        }
        Ok(())
    }

    fn add_row(
        &self,
        row: &HistoricalUsage,
        attempts: &ReleaseAttempts,
        store: &mut ReleaseIdStore,
        stats: &mut LoadStats,
    ) -> Result<()> {
        if row.usage.name_index_id.is_none() {
            stats.no_match += 1;
            return Ok(());
        }
        let attempt = attempts.attempt_of(row.dataset_key).unwrap_or(row.attempt);
        match ReleasedId::from_history(row, attempt) {
            Ok(rid) => {
                if !store.add(rid) {
                    stats.duplicates += 1;
                }
                Ok(())
            }
            Err(ReconcileError::Encoding(msg)) => {
                debug!(dataset = row.dataset_key, "Skip temporary id: {}", msg);
                stats.temporary += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
