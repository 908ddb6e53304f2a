//! Parallel reconciliation of independent projects
//!
//! Each project gets its own reconciler, store and sequence; the runs only
//! share the storage handle and the cancel token.

use rayon::prelude::*;
use taxonid_storage::ReleaseStorage;
use tracing::{error, info};

use crate::config::ReconcileConfig;
use crate::errors::Result;
use crate::features::reconciliation::{CancelToken, IdReconciler, ReconcileJob, ReconciliationResult};

/// One project release to reconcile
#[derive(Debug, Clone)]
pub struct ProjectRun {
    pub job: ReconcileJob,
    pub config: ReconcileConfig,
}

impl ProjectRun {
    pub fn new(job: ReconcileJob, config: ReconcileConfig) -> Self {
        Self { job, config }
    }
}

/// Outcome of one project run
#[derive(Debug)]
pub struct ProjectOutcome {
    pub project_key: u32,
    pub result: Result<ReconciliationResult>,
}

/// Reconcile several projects in parallel
///
/// A failing project does not stop the others. Outcomes come back in input
/// order.
pub fn reconcile_projects<S>(storage: &S, runs: Vec<ProjectRun>, cancel: &CancelToken) -> Vec<ProjectOutcome>
where
    S: ReleaseStorage + ?Sized,
{
    info!(projects = runs.len(), "Reconciling projects in parallel");
    runs.into_par_iter()
        .map(|run| {
            let project_key = run.job.project_key;
            let result = IdReconciler::new(storage, run.job, run.config)
                .with_cancel_token(cancel.clone())
                .run();
            if let Err(e) = &result {
                error!("Reconciliation of project {} failed: {}", project_key, e);
            }
            ProjectOutcome {
                project_key,
                result,
            }
        })
        .collect()
}
