//! Release storage ports for stable identifier reconciliation
//!
//! > "A name usage gets its identifier once, and keeps it for every release after."
//!
//! ## Core Principles
//!
//! 1. **Releases are immutable**: historical usages are only ever read
//! 2. **Sorted streams**: current usages arrive ordered by canonical then exact name index id
//! 3. **Nothing is authoritative until commit**: id map batches are discardable
//!
//! ## Layout
//!
//! - `domain::models`: vocabularies and the row shapes exchanged with storage
//! - `domain::ports`: traits the reconciliation engine talks to
//! - `infrastructure`: in-memory and SQLite adapters
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taxonid_storage::{ReleaseHistory, SqliteReleaseStore, UsageSource};
//!
//! let store = SqliteReleaseStore::in_memory()?;
//! let latest = store.latest_release(3)?;
//! for usage in store.current_usages(3)? {
//!     let usage = usage?;
//!     println!("{} {}", usage.usage_id, usage.label());
//! }
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    HistoricalUsage, HistoryStream, IdMapWriter, IdReportSink, IdReportType, MatchType, Rank,
    ReleaseHistory, ReleaseInfo, ReleaseStorage, TaxonomicStatus, UsageRecord, UsageSource,
    UsageStream,
};

pub use infrastructure::InMemoryReleaseStore;

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteReleaseStore;
