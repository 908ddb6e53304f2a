//! Stable id reconciliation of one project release
//!
//! prepare → stream & match → persist id map → classify → report

use std::time::Instant;

use taxonid_storage::{IdReportType, ReleaseStorage, UsageRecord};
use tracing::{error, info, warn};

use crate::config::ReconcileConfig;
use crate::errors::{ReconcileError, Result};
use crate::features::matching::application::{
    deduplicate_name_index_ids, Assignment, CandidateGrouper, SubgroupMatcher,
};
use crate::features::matching::domain::{Candidate, IdSequence};
use crate::features::reconciliation::domain::{
    AuditEntry, AuditLog, CancelToken, ReconciliationResult,
};
use crate::features::reconciliation::infrastructure::{AuditReporter, NoMatchLog};
use crate::features::release_ids::application::{LoadStats, ReleaseIdLoader};
use crate::features::release_ids::domain::{ReleaseAttempts, ReleaseIdStore};
use crate::shared::utils::id_converter;

/// The release a run issues ids for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileJob {
    pub project_key: u32,
    /// Dataset key of the release being built
    pub release_dataset_key: u32,
    /// Attempt number of the release being built
    pub attempt: u32,
}

impl ReconcileJob {
    pub fn new(project_key: u32, release_dataset_key: u32, attempt: u32) -> Self {
        Self {
            project_key,
            release_dataset_key,
            attempt,
        }
    }
}

/// Orchestrates one reconciliation run
///
/// All run state lives here; nothing is shared with other runs besides the
/// storage handle.
pub struct IdReconciler<'a, S: ReleaseStorage + ?Sized> {
    storage: &'a S,
    job: ReconcileJob,
    config: ReconcileConfig,
    cancel: CancelToken,

    attempts: ReleaseAttempts,
    store: ReleaseIdStore,
    sequence: IdSequence,
    load_stats: LoadStats,
    /// Unclaimed ids of the latest attempt before matching
    last_release_ids: usize,

    result: ReconciliationResult,
    audit: AuditLog,
    no_match_log: Option<NoMatchLog>,
}

impl<'a, S: ReleaseStorage + ?Sized> IdReconciler<'a, S> {
    pub fn new(storage: &'a S, job: ReconcileJob, config: ReconcileConfig) -> Self {
        Self {
            storage,
            job,
            config,
            cancel: CancelToken::new(),
            attempts: ReleaseAttempts::new(),
            store: ReleaseIdStore::new(),
            sequence: IdSequence::new(0),
            load_stats: LoadStats::default(),
            last_release_ids: 0,
            result: ReconciliationResult::default(),
            audit: AuditLog::default(),
            no_match_log: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn job(&self) -> &ReconcileJob {
        &self.job
    }

    pub fn store(&self) -> &ReleaseIdStore {
        &self.store
    }

    pub fn sequence(&self) -> &IdSequence {
        &self.sequence
    }

    pub fn load_stats(&self) -> &LoadStats {
        &self.load_stats
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run all phases against the project's current usages
    pub fn run(mut self) -> Result<ReconciliationResult> {
        let start = Instant::now();
        info!(
            "Start stable id reconciliation for project {} release {} attempt {}",
            self.job.project_key, self.job.release_dataset_key, self.job.attempt
        );

        self.prepare()?;
        let storage = self.storage;
        let usages = storage.current_usages(self.job.project_key)?;
        self.reconcile(usages)?;
        let result = self.finish();
        self.report(&result);

        info!(
            "Reconciled project {} in {}ms: {} created, {} reused, {} resurrected, {} deleted, {} without names match",
            self.job.project_key,
            start.elapsed().as_millis(),
            result.created.len(),
            result.reused,
            result.resurrected.len(),
            result.deleted.len(),
            result.no_match
        );
        Ok(result)
    }

    /// Load release attempts and released ids, seed the id sequence
    pub fn prepare(&mut self) -> Result<()> {
        let loader = ReleaseIdLoader::new(self.storage, self.job.project_key);
        self.attempts = loader.load_attempts()?;
        if self.config.restart {
            warn!(
                project = self.job.project_key,
                "Restarting stable ids, previous releases are ignored"
            );
            self.store = ReleaseIdStore::new();
            self.load_stats = LoadStats::default();
        } else {
            let (store, stats) = loader.load(&self.attempts)?;
            self.store = store;
            self.load_stats = stats;
        }
        self.sequence = IdSequence::seeded(self.store.max_id(), self.config.start);
        info!(
            project = self.job.project_key,
            max_id = self.store.max_id(),
            floor = self.config.start,
            "Issuing new ids after {}",
            id_converter::encode(self.sequence.current())
        );
        Ok(())
    }

    /// Match a sorted usage stream and write the id map
    ///
    /// Earlier mappings of the project and report entries of the release are
    /// dropped first, so a release can be reconciled again from scratch.
    /// Mappings are committed whenever the running count crosses a batch
    /// boundary and once at the end. A failing stream, unsorted input or a
    /// cancelled token aborts without committing the open batch.
    pub fn reconcile<I, E>(&mut self, usages: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<UsageRecord, E>>,
        ReconcileError: From<E>,
    {
        info!(project = self.job.project_key, "Map name usage ids");
        self.last_release_ids = self.store.max_attempt_id_count();
        self.storage.reset(self.job.project_key)?;
        self.storage.reset_reports(self.job.release_dataset_key)?;
        self.open_no_match_log();

        let batch_size = self.config.batch_size.max(1);
        let mut counter = 0usize;
        for group in CandidateGrouper::new(usages.into_iter()) {
            let mut group = group?;
            self.check_cancelled()?;
            if group.canonical_name_index_id.is_none() {
                self.record_no_match(&group.candidates);
                continue;
            }
            if self.config.nidx_deduplication {
                deduplicate_name_index_ids(&mut group);
            }

            let before = counter / batch_size;
            for sub in group.into_subgroups() {
                self.check_cancelled()?;
                let Some(name_index_id) = sub.name_index_id else {
                    self.record_no_match(&sub.candidates);
                    continue;
                };
                let assignments = SubgroupMatcher::new(&mut self.store, &mut self.sequence)
                    .assign(name_index_id, sub.candidates)?;
                counter += assignments.len();
                for assignment in assignments {
                    self.persist(&assignment)?;
                    self.classify(assignment);
                }
            }
            if counter / batch_size != before {
                self.storage.commit(self.job.project_key)?;
            }
        }
        self.storage.commit(self.job.project_key)?;

        if let Some(log) = self.no_match_log.take() {
            if let Err(e) = log.finish() {
                warn!("Failed to write no-match log: {}", e);
            }
        }
        info!(
            project = self.job.project_key,
            mapped = counter,
            no_match = self.result.no_match,
            "Mapped name usage ids"
        );
        Ok(())
    }

    /// Derive deletions and reuse from what is left in the store
    pub fn finish(&mut self) -> ReconciliationResult {
        let max_attempt = self.store.max_attempt();
        for id in self.store.max_attempt_ids() {
            self.result.deleted.insert(id, max_attempt);
            if let Some(rid) = self.store.get(id) {
                self.audit.deleted.insert(id, AuditEntry::from_released(rid));
            }
        }
        self.result.reused = self
            .last_release_ids
            .saturating_sub(self.result.deleted.len());
        self.result.clone()
    }

    /// Persist the classification sets and write file reports
    ///
    /// Failures are logged and never abort the run.
    pub fn report(&self, result: &ReconciliationResult) {
        info!(
            "Persisting id reports for project release {}-{}",
            self.job.project_key, self.job.attempt
        );
        let sets: [(IdReportType, Vec<u64>); 3] = [
            (IdReportType::Deleted, result.deleted.keys().copied().collect()),
            (IdReportType::Resurrected, result.resurrected.keys().copied().collect()),
            (IdReportType::Created, result.created.iter().copied().collect()),
        ];
        for (kind, ids) in &sets {
            if let Err(e) = self.persist_report(*kind, ids) {
                error!(
                    "Failed to persist {} id report for release {}: {}",
                    kind, self.job.release_dataset_key, e
                );
            }
        }

        let Some(dir) = self
            .config
            .report_dir_for(self.job.project_key, self.job.attempt)
        else {
            return;
        };
        let written = AuditReporter::create(dir).and_then(|r| r.write_all(&self.audit, result));
        if let Err(e) = written {
            error!(
                "Failed to write id reports for project {}: {}",
                self.job.project_key, e
            );
        }
    }

    fn persist_report(&self, kind: IdReportType, ids: &[u64]) -> Result<()> {
        let batch_size = self.config.report_batch_size.max(1);
        let dataset_key = self.job.release_dataset_key;
        for (i, id) in ids.iter().enumerate() {
            self.storage.record(dataset_key, kind, *id)?;
            if (i + 1) % batch_size == 0 {
                self.storage.commit_reports(dataset_key)?;
            }
        }
        self.storage.commit_reports(dataset_key)?;
        Ok(())
    }

    fn persist(&self, assignment: &Assignment) -> Result<()> {
        self.storage.map_usage(
            self.job.project_key,
            &assignment.candidate.usage_id,
            &id_converter::encode(assignment.stable_id),
        )?;
        Ok(())
    }

    fn classify(&mut self, assignment: Assignment) {
        let id = assignment.stable_id;
        let max_attempt = self.store.max_attempt();
        match &assignment.claimed {
            None => {
                self.result.created.insert(id);
                self.audit.created.insert(
                    id,
                    AuditEntry::from_candidate(id, self.job.release_dataset_key, &assignment.candidate),
                );
            }
            Some(rid) if rid.source_attempt < max_attempt => {
                self.result.resurrected.insert(id, rid.source_attempt);
                self.audit.resurrected.insert(
                    id,
                    AuditEntry::from_candidate(id, self.job.release_dataset_key, &assignment.candidate),
                );
            }
            Some(_) => {}
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(project = self.job.project_key, "Reconciliation cancelled");
            return Err(ReconcileError::Cancelled(self.job.project_key));
        }
        Ok(())
    }

    fn open_no_match_log(&mut self) {
        let Some(dir) = self
            .config
            .report_dir_for(self.job.project_key, self.job.attempt)
        else {
            return;
        };
        match AuditReporter::create(dir).and_then(|r| r.no_match_log()) {
            Ok(log) => self.no_match_log = Some(log),
            Err(e) => warn!("Cannot open no-match log: {}", e),
        }
    }

    fn record_no_match(&mut self, candidates: &[Candidate]) {
        if let Some(first) = candidates.first() {
            info!(
                "{} usages with no name match, e.g. {} - keep temporary ids",
                candidates.len(),
                first.usage_id
            );
        }
        self.result.no_match += candidates.len();
        if let Some(log) = self.no_match_log.as_mut() {
            let written: std::io::Result<()> = candidates.iter().try_for_each(|c| log.write(c));
            if let Err(e) = written {
                warn!("Failed to write no-match log: {}", e);
                self.no_match_log = None;
            }
        }
    }
}
