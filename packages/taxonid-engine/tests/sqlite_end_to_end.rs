//! Reconciliation across consecutive releases stored in SQLite

mod common;

use common::{job, published, release_key, usage, PROJECT};
use pretty_assertions::assert_eq;
use taxonid_engine::shared::utils::id_converter;
use taxonid_engine::{reconcile_projects, CancelToken, IdReconciler, ProjectRun, ReconcileConfig};
use taxonid_storage::{HistoricalUsage, IdReportType, ReleaseInfo, SqliteReleaseStore, UsageRecord};

fn abies() -> UsageRecord {
    usage("p1", "Abies alba", "Mill.", 7, 5)
}

fn picea() -> UsageRecord {
    usage("p2", "Picea abies", "(L.) H.Karst.", 11, 10)
}

fn pinus() -> UsageRecord {
    usage("p3", "Pinus sylvestris", "L.", 21, 20)
}

fn decoded(store: &SqliteReleaseStore, project_key: u32) -> Vec<(String, u64)> {
    store
        .id_map(project_key)
        .unwrap()
        .into_iter()
        .map(|(usage, id)| (usage, id_converter::decode(&id).unwrap()))
        .collect()
}

#[test]
fn test_three_releases_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteReleaseStore::new(dir.path().join("releases.db")).unwrap();

    // attempt 1 published abies and picea, attempt 2 dropped abies
    store
        .insert_release(PROJECT, &ReleaseInfo::new(release_key(1), 1, true))
        .unwrap();
    store
        .insert_release(PROJECT, &ReleaseInfo::new(release_key(2), 2, true))
        .unwrap();
    store
        .insert_archived_usages(
            PROJECT,
            &[
                HistoricalUsage::new(published(1, &abies()), release_key(1), 1),
                HistoricalUsage::new(published(2, &picea()), release_key(1), 1),
            ],
        )
        .unwrap();
    store
        .insert_release_usages(release_key(2), &[published(2, &picea())])
        .unwrap();

    // attempt 3: abies is back, picea is gone, pinus is new
    store
        .insert_project_usages(PROJECT, &[pinus(), abies()])
        .unwrap();

    let reports = tempfile::tempdir().unwrap();
    let config = ReconcileConfig::default().with_report_dir(reports.path());
    let result = IdReconciler::new(&store, job(3), config).run().unwrap();

    assert_eq!(
        decoded(&store, PROJECT),
        vec![("p1".to_string(), 1), ("p3".to_string(), 3)]
    );
    assert_eq!(
        store.id_reports(release_key(3), IdReportType::Resurrected).unwrap(),
        vec![1]
    );
    assert_eq!(
        store.id_reports(release_key(3), IdReportType::Deleted).unwrap(),
        vec![2]
    );
    assert_eq!(
        store.id_reports(release_key(3), IdReportType::Created).unwrap(),
        vec![3]
    );
    assert_eq!(result.reused, 0);

    let unstable = std::fs::read_to_string(reports.path().join("3").join("3").join("unstable.txt")).unwrap();
    assert_eq!(unstable, "");
}

#[test]
fn test_rerun_of_a_release_replaces_its_reports() {
    let store = SqliteReleaseStore::in_memory().unwrap();
    store
        .insert_release(PROJECT, &ReleaseInfo::new(release_key(1), 1, true))
        .unwrap();
    store
        .insert_release_usages(release_key(1), &[published(42, &abies())])
        .unwrap();
    store.insert_project_usages(PROJECT, &[picea()]).unwrap();

    let first = IdReconciler::new(&store, job(2), ReconcileConfig::default())
        .run()
        .unwrap();
    assert_eq!(first.created.len(), 1);
    assert_eq!(
        store.id_reports(release_key(2), IdReportType::Deleted).unwrap(),
        vec![42]
    );

    // abies is back before the release is rebuilt
    store.insert_project_usages(PROJECT, &[abies()]).unwrap();
    let second = IdReconciler::new(&store, job(2), ReconcileConfig::default())
        .run()
        .unwrap();

    assert!(second.deleted.is_empty());
    assert_eq!(second.reused, 1);
    assert!(store
        .id_reports(release_key(2), IdReportType::Deleted)
        .unwrap()
        .is_empty());
    assert_eq!(
        store.id_reports(release_key(2), IdReportType::Created).unwrap(),
        second.created.iter().copied().collect::<Vec<_>>()
    );
    assert!(store
        .id_reports(release_key(2), IdReportType::Resurrected)
        .unwrap()
        .is_empty());
}

#[test]
fn test_projects_reconciled_in_parallel() {
    let store = SqliteReleaseStore::in_memory().unwrap();
    for project in [PROJECT, PROJECT + 1] {
        let key = 2000 + project;
        store
            .insert_release(project, &ReleaseInfo::new(key, 1, true))
            .unwrap();
        store
            .insert_release_usages(key, &[published(40 + u64::from(project), &abies())])
            .unwrap();
        store
            .insert_project_usages(project, &[abies(), picea()])
            .unwrap();
    }

    let runs = vec![
        ProjectRun::new(job(2), ReconcileConfig::default()),
        ProjectRun::new(
            taxonid_engine::ReconcileJob::new(PROJECT + 1, 3002, 2),
            ReconcileConfig::default(),
        ),
    ];
    let outcomes = reconcile_projects(&store, runs, &CancelToken::new());

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].project_key, PROJECT);
    for outcome in &outcomes {
        let result = outcome.result.as_ref().unwrap();
        assert_eq!(result.reused, 1);
        assert_eq!(result.created.len(), 1);
    }
    assert_eq!(
        decoded(&store, PROJECT),
        vec![("p1".to_string(), 43), ("p2".to_string(), 44)]
    );
    assert_eq!(
        decoded(&store, PROJECT + 1),
        vec![("p1".to_string(), 44), ("p2".to_string(), 45)]
    );
}

#[test]
fn test_cancelled_projects_report_errors() {
    let store = SqliteReleaseStore::in_memory().unwrap();
    store.insert_project_usages(PROJECT, &[abies()]).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let outcomes = reconcile_projects(
        &store,
        vec![ProjectRun::new(job(1), ReconcileConfig::default())],
        &cancel,
    );

    assert!(outcomes[0].result.is_err());
    assert!(store.id_map(PROJECT).unwrap().is_empty());
}
