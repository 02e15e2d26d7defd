//! Queue inspection through the SGE backend against fake `qstat` output
#![cfg(unix)]

mod common;

use common::{serial, FakeSge};
use qthrottle_core::application::QueueInspector;
use qthrottle_core::domain::{Principal, QueueSnapshot};
use qthrottle_core::port::queue_backend::QueryError;
use qthrottle_infra_system::SgeBackend;
use std::sync::Arc;

fn inspector(sge: &FakeSge, queue: Option<&str>) -> QueueInspector {
    QueueInspector::new(
        Arc::new(SgeBackend::new(sge.commands())),
        queue.map(str::to_string),
    )
}

fn alice() -> Principal {
    Principal::new("alice").unwrap()
}

#[tokio::test]
async fn test_snapshot_counts_outstanding_and_matching() {
    let _serial = serial();
    let sge = FakeSge::new();
    sge.seed_queue(&["job_42", "myjob_overflow", "other"]);

    let snapshot = inspector(&sge, Some("test.q"))
        .snapshot(&alice(), Some("job"))
        .await
        .unwrap();

    // substring matching counts "myjob_overflow" as well
    assert_eq!(
        snapshot,
        QueueSnapshot {
            total_count: 3,
            matching_count: Some(2),
        }
    );
    assert_eq!(
        sge.qstat_calls(),
        vec!["-u alice -q test.q", "-u alice -xml -q test.q"]
    );
}

#[tokio::test]
async fn test_empty_queue_counts_zero() {
    let _serial = serial();
    let sge = FakeSge::new();
    let inspector = inspector(&sge, None);

    assert_eq!(inspector.count_total(&alice()).await.unwrap(), 0);
    assert_eq!(
        inspector
            .count_by_name_fragment(&alice(), "anything")
            .await
            .unwrap(),
        0
    );
    assert_eq!(sge.qstat_calls(), vec!["-u alice", "-u alice -xml"]);
}

#[tokio::test]
async fn test_snapshot_without_fragment_skips_structured_listing() {
    let _serial = serial();
    let sge = FakeSge::new();
    sge.seed_queue(&["a", "b"]);

    let snapshot = inspector(&sge, None).snapshot(&alice(), None).await.unwrap();

    assert_eq!(snapshot.total_count, 2);
    assert_eq!(snapshot.matching_count, None);
    assert_eq!(sge.qstat_calls().len(), 1);
}

#[tokio::test]
async fn test_qstat_failure_carries_stderr() {
    let _serial = serial();
    let sge = FakeSge::new();
    sge.fail_queries("error: commlib error: access denied (client IP resolved to host name \"\")");

    let err = inspector(&sge, None)
        .count_total(&alice())
        .await
        .unwrap_err();

    match err {
        QueryError::NonZeroExit { code, stderr } => {
            assert_eq!(code, Some(2));
            assert!(stderr.starts_with("error: commlib error"), "stderr: {}", stderr);
        }
        other => panic!("expected non-zero exit, got {:?}", other),
    }
}
