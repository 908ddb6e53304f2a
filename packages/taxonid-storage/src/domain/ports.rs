//! Storage Ports (Trait Interfaces)
//!
//! Port/Adapter pattern for backend flexibility:
//! - Production: the partitioned release database (outside this workspace)
//! - Development: SQLite (zero-config)
//! - Testing: InMemory (fast unit tests)
//!
//! Read streams are fallible per row so an upstream failure mid-way surfaces
//! to the engine, which aborts the run.

use super::models::{HistoricalUsage, IdReportType, ReleaseInfo, UsageRecord};
use crate::Result;

/// Stream of current project usages
pub type UsageStream<'a> = Box<dyn Iterator<Item = Result<UsageRecord>> + 'a>;

/// Stream of usages from earlier releases
pub type HistoryStream<'a> = Box<dyn Iterator<Item = Result<HistoricalUsage>> + 'a>;

/// Live project usages
pub trait UsageSource: Send + Sync {
    /// All usages of the project, ordered by canonical names index id and then
    /// by exact names index id, missing ids last in both keys.
    fn current_usages(&self, project_key: u32) -> Result<UsageStream<'_>>;
}

/// Previously published releases
pub trait ReleaseHistory: Send + Sync {
    /// Dataset key of the latest public release, if any
    fn latest_release(&self, project_key: u32) -> Result<Option<u32>>;

    /// All releases of a project
    fn release_attempts(&self, project_key: u32) -> Result<Vec<ReleaseInfo>>;

    /// Every usage of one release dataset
    fn release_usages(&self, dataset_key: u32) -> Result<HistoryStream<'_>>;

    /// Archived usages of superseded releases, newest attempt first
    fn archived_usages(&self, project_key: u32) -> Result<HistoryStream<'_>>;
}

/// Project usage id -> encoded stable id table
///
/// Writes are buffered until `commit`. Nothing written here is authoritative
/// until the surrounding release switches the table in.
pub trait IdMapWriter: Send + Sync {
    /// Drop all mappings of a project, committed or pending
    fn reset(&self, project_key: u32) -> Result<()>;

    fn map_usage(&self, project_key: u32, usage_id: &str, stable_id: &str) -> Result<()>;

    /// Commit the pending mappings of one project as one batch
    fn commit(&self, project_key: u32) -> Result<()>;
}

/// Persisted classification sets of a release
pub trait IdReportSink: Send + Sync {
    /// Drop all report entries of a release, committed or pending
    fn reset_reports(&self, dataset_key: u32) -> Result<()>;

    fn record(&self, dataset_key: u32, kind: IdReportType, id: u64) -> Result<()>;

    /// Commit the pending report entries of one release as one batch
    fn commit_reports(&self, dataset_key: u32) -> Result<()>;
}

/// Everything a reconciliation run needs from storage
pub trait ReleaseStorage: UsageSource + ReleaseHistory + IdMapWriter + IdReportSink {}

impl<T> ReleaseStorage for T where T: UsageSource + ReleaseHistory + IdMapWriter + IdReportSink {}
