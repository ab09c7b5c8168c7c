use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use line_verify::models::job::{JobSnapshot, LineStatus};
use line_verify::services::lookup::{CarrierLookup, LookupError, LookupOutcome};
use line_verify::services::store::{InMemoryJobStore, JobStore};
use line_verify::services::verifier::{BatchVerifier, SubmitError};
use tokio::sync::Notify;
use tokio_test::assert_ok;
use tokio::time::sleep;
use uuid::Uuid;

const DISPATCH_DELAY: Duration = Duration::from_millis(5);

/// Scripted provider: always reports a live carrier.
struct AlwaysPresent;

#[async_trait]
impl CarrierLookup for AlwaysPresent {
    async fn lookup(&self, _number: &str) -> Result<LookupOutcome, LookupError> {
        Ok(LookupOutcome::CarrierPresent)
    }
}

/// Scripted provider: always reports no carrier.
struct AlwaysAbsent;

#[async_trait]
impl CarrierLookup for AlwaysAbsent {
    async fn lookup(&self, _number: &str) -> Result<LookupOutcome, LookupError> {
        Ok(LookupOutcome::CarrierAbsent)
    }
}

/// Scripted provider: every call fails.
struct AlwaysFails;

#[async_trait]
impl CarrierLookup for AlwaysFails {
    async fn lookup(&self, _number: &str) -> Result<LookupOutcome, LookupError> {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json")
            .expect_err("string is not valid json");
        Err(LookupError::Parse(parse_err))
    }
}

/// Alternates present/absent across calls, with a small per-call delay so
/// sibling tasks genuinely interleave.
struct Alternating {
    calls: AtomicUsize,
}

#[async_trait]
impl CarrierLookup for Alternating {
    async fn lookup(&self, _number: &str) -> Result<LookupOutcome, LookupError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis((n % 7) as u64)).await;
        if n % 2 == 0 {
            Ok(LookupOutcome::CarrierPresent)
        } else {
            Ok(LookupOutcome::CarrierAbsent)
        }
    }
}

/// Holds every lookup until the test releases the gate, so intermediate
/// states stay observable for as long as the test needs.
struct Gated {
    gate: Arc<Notify>,
}

#[async_trait]
impl CarrierLookup for Gated {
    async fn lookup(&self, _number: &str) -> Result<LookupOutcome, LookupError> {
        self.gate.notified().await;
        Ok(LookupOutcome::CarrierPresent)
    }
}

fn verifier(lookup: Option<Arc<dyn CarrierLookup>>) -> BatchVerifier {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    BatchVerifier::new(store, lookup, DISPATCH_DELAY)
}

fn numbers(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

/// Poll until the batch stamps its completion timestamp.
async fn wait_for_completion(verifier: &BatchVerifier, job_id: Uuid) -> JobSnapshot {
    for _ in 0..500 {
        let snapshot = verifier
            .query_status(job_id)
            .await
            .expect("job should exist");
        if snapshot.completed_at.is_some() {
            return snapshot;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("batch never completed");
}

#[tokio::test]
async fn empty_batch_is_rejected_without_creating_a_job() {
    let verifier = verifier(Some(Arc::new(AlwaysPresent)));
    let result = verifier.submit(Vec::new()).await;
    assert!(matches!(result, Err(SubmitError::EmptyBatch)));
}

#[tokio::test]
async fn unknown_job_id_is_not_found() {
    let verifier = verifier(Some(Arc::new(AlwaysPresent)));
    assert!(verifier.query_status(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn submitted_job_is_immediately_queryable() {
    let verifier = verifier(Some(Arc::new(AlwaysPresent)));
    let job_id = verifier
        .submit(numbers(&["+15550001111", "+15550002222"]))
        .await
        .expect("submit succeeds");

    // The record exists before any task finishes.
    let snapshot = verifier
        .query_status(job_id)
        .await
        .expect("job visible right after submit");
    assert_eq!(snapshot.statuses.len(), 2);
    assert!(snapshot.statuses.contains_key("+15550001111"));
    assert!(snapshot.statuses.contains_key("+15550002222"));
}

#[tokio::test]
async fn carrier_present_resolves_to_active() {
    let verifier = verifier(Some(Arc::new(AlwaysPresent)));
    let job_id = verifier
        .submit(numbers(&["+15550001111"]))
        .await
        .expect("submit succeeds");

    let snapshot = wait_for_completion(&verifier, job_id).await;
    assert_eq!(snapshot.statuses["+15550001111"], LineStatus::Active);
}

#[tokio::test]
async fn carrier_absent_resolves_to_inactive() {
    let verifier = verifier(Some(Arc::new(AlwaysAbsent)));
    let job_id = verifier
        .submit(numbers(&["+15550001111"]))
        .await
        .expect("submit succeeds");

    let snapshot = wait_for_completion(&verifier, job_id).await;
    assert_eq!(snapshot.statuses["+15550001111"], LineStatus::Inactive);
}

#[tokio::test]
async fn provider_errors_fold_into_inactive() {
    // Fail-closed: a lookup failure is reported as an inactive line, never
    // as a job failure.
    let verifier = verifier(Some(Arc::new(AlwaysFails)));
    let job_id = verifier
        .submit(numbers(&["+15550001111"]))
        .await
        .expect("submit succeeds");

    let snapshot = wait_for_completion(&verifier, job_id).await;
    assert_eq!(snapshot.statuses["+15550001111"], LineStatus::Inactive);
    assert!(snapshot.completed_at.is_some());
}

#[tokio::test]
async fn disabled_provider_marks_lines_provider_disabled() {
    let verifier = verifier(None);
    let job_id = verifier
        .submit(numbers(&["+18005551234", "+18005551234", "+18009999999"]))
        .await
        .expect("submit succeeds");

    let snapshot = wait_for_completion(&verifier, job_id).await;

    // The duplicate collapses onto one status slot.
    assert_eq!(snapshot.numbers.len(), 3);
    assert_eq!(snapshot.statuses.len(), 2);
    assert_eq!(
        snapshot.statuses["+18005551234"],
        LineStatus::ProviderDisabled
    );
    assert_eq!(
        snapshot.statuses["+18009999999"],
        LineStatus::ProviderDisabled
    );
    assert!(snapshot.completed_at.is_some());
}

#[tokio::test]
async fn completed_snapshot_is_stable_across_polls() {
    let verifier = verifier(Some(Arc::new(AlwaysAbsent)));
    let job_id = verifier
        .submit(numbers(&["+15550001111", "+15550002222"]))
        .await
        .expect("submit succeeds");

    let first = wait_for_completion(&verifier, job_id).await;
    sleep(Duration::from_millis(50)).await;
    let second = verifier
        .query_status(job_id)
        .await
        .expect("job still exists");

    assert_eq!(first, second);
}

#[tokio::test]
async fn pollers_observe_in_progress_before_the_provider_answers() {
    let gate = Arc::new(Notify::new());
    let verifier = verifier(Some(Arc::new(Gated {
        gate: Arc::clone(&gate),
    })));
    let job_id = tokio_test::assert_ok!(verifier.submit(numbers(&["+15550001111"])).await);

    // Per-line transitions only move forward: nothing but Pending may
    // precede InProgress, and nothing is terminal while the gate is shut.
    let mut observed_in_progress = false;
    for _ in 0..500 {
        let snapshot = verifier
            .query_status(job_id)
            .await
            .expect("job should exist");
        assert!(snapshot.completed_at.is_none());

        let status = snapshot.statuses["+15550001111"];
        if status == LineStatus::InProgress {
            observed_in_progress = true;
            break;
        }
        assert_eq!(status, LineStatus::Pending);
        sleep(Duration::from_millis(2)).await;
    }
    assert!(observed_in_progress, "line never reached InProgress");

    gate.notify_one();
    let done = wait_for_completion(&verifier, job_id).await;
    assert_eq!(done.statuses["+15550001111"], LineStatus::Active);
}

#[tokio::test]
async fn concurrent_submissions_are_independent() {
    let verifier = verifier(Some(Arc::new(AlwaysAbsent)));

    let submissions = (0..8).map(|i| verifier.submit(vec![format!("+1555{i:07}")]));
    let job_ids: Vec<Uuid> = futures::future::join_all(submissions)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("every submission succeeds");

    for job_id in job_ids {
        let snapshot = wait_for_completion(&verifier, job_id).await;
        assert_eq!(snapshot.statuses.len(), 1);
        assert!(snapshot
            .statuses
            .values()
            .all(|s| *s == LineStatus::Inactive));
    }
}

#[tokio::test]
async fn interleaved_tasks_produce_exactly_one_completion_stamp() {
    let lookup = Arc::new(Alternating {
        calls: AtomicUsize::new(0),
    });
    let verifier = verifier(Some(lookup));

    let batch: Vec<String> = (0..50).map(|i| format!("+1555000{i:04}")).collect();
    let job_id = verifier.submit(batch).await.expect("submit succeeds");

    let snapshot = wait_for_completion(&verifier, job_id).await;
    assert_eq!(snapshot.statuses.len(), 50);
    assert!(snapshot.statuses.values().all(|s| s.is_terminal()));

    // The stamp never moves once set, regardless of task interleaving.
    let stamp = snapshot.completed_at;
    for _ in 0..5 {
        sleep(Duration::from_millis(10)).await;
        let again = verifier
            .query_status(job_id)
            .await
            .expect("job still exists");
        assert_eq!(again.completed_at, stamp);
    }
}
