/*
 * Taxonid Engine - Stable Identifier Reconciliation
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Id codec, text normalisation
 * - features/    : Vertical slices (release_ids → matching → reconciliation)
 * - pipeline/    : Multi-project runs
 * - config/      : Versioned YAML configuration
 *
 * Storage is reached only through the ports of `taxonid-storage`.
 */

#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

pub mod config;
pub mod errors;
pub mod features;
pub mod pipeline;
pub mod shared;

pub use config::{ConfigError, ReconcileConfig, Validatable};
pub use errors::{ReconcileError, Result};
pub use features::matching::{score, Candidate, IdSequence, SubgroupMatcher};
pub use features::reconciliation::{
    AuditReporter, CancelToken, IdReconciler, ReconcileJob, ReconciliationResult,
};
pub use features::release_ids::{LoadStats, ReleaseIdLoader, ReleaseIdStore, ReleasedId};
pub use pipeline::{reconcile_projects, ProjectOutcome, ProjectRun};
pub use shared::utils::IdConverter;
