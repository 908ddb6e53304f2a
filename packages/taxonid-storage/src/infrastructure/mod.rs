//! Infrastructure layer - Storage adapters

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryReleaseStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteReleaseStore;
