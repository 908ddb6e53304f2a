//! Id Reconciliation
//!
//! Entry point of the engine: loads released ids, matches the current usages
//! against them and classifies every id as created, reused, resurrected or
//! deleted.
//!
//! ```text
//! application/ (IdReconciler - orchestrates one run)
//!           ↓
//! domain/ (ReconciliationResult, AuditLog, CancelToken)
//!           ↓
//! infrastructure/ (AuditReporter - report files)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use taxonid_engine::{IdReconciler, ReconcileConfig, ReconcileJob};
//! use taxonid_storage::InMemoryReleaseStore;
//!
//! let storage = InMemoryReleaseStore::new();
//! let result = IdReconciler::new(&storage, ReconcileJob::new(3, 1001, 1), ReconcileConfig::default())
//!     .run()
//!     .unwrap();
//! assert!(result.created.is_empty());
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{IdReconciler, ReconcileJob};
pub use domain::{AuditEntry, AuditLog, CancelToken, ReconciliationResult};
pub use infrastructure::{AuditReporter, NoMatchLog};
