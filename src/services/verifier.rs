use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use uuid::Uuid;

use crate::models::job::{JobSnapshot, LineStatus};
use crate::services::lookup::{CarrierLookup, LookupOutcome};
use crate::services::store::JobStore;

/// Orchestrates batch verification: one fire-and-forget task per submitted
/// number, all updating the shared job record through the store.
pub struct BatchVerifier {
    store: Arc<dyn JobStore>,
    lookup: Option<Arc<dyn CarrierLookup>>,
    dispatch_delay: Duration,
}

impl BatchVerifier {
    /// `lookup` is `None` when the provider is not configured; every line in
    /// every batch then resolves to `ProviderDisabled`.
    pub fn new(
        store: Arc<dyn JobStore>,
        lookup: Option<Arc<dyn CarrierLookup>>,
        dispatch_delay: Duration,
    ) -> Self {
        Self {
            store,
            lookup,
            dispatch_delay,
        }
    }

    /// Submit a batch and return its job id without waiting for any check.
    ///
    /// The job record is created synchronously with every status `Pending`,
    /// so a poll issued immediately after submission never sees NotFound.
    pub async fn submit(&self, numbers: Vec<String>) -> Result<Uuid, SubmitError> {
        if numbers.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let job_id = self.store.create(numbers.clone()).await;

        metrics::counter!("verification_batches_submitted").increment(1);
        tracing::info!(job_id = %job_id, lines = numbers.len(), "Batch submitted");

        // Duplicates get their own task; both write to the same status slot.
        for number in numbers {
            let store = Arc::clone(&self.store);
            let lookup = self.lookup.clone();
            let delay = self.dispatch_delay;
            tokio::spawn(async move {
                check_line(store, lookup, job_id, number, delay).await;
            });
        }

        Ok(job_id)
    }

    /// Read-only view of a job's progress.
    pub async fn query_status(&self, job_id: Uuid) -> Option<JobSnapshot> {
        self.store.snapshot(job_id).await
    }
}

/// Drive one number through its state machine to exactly one terminal status.
///
/// Provider failures of any kind fold into `Inactive` rather than surfacing
/// to the caller; the batch therefore always reaches completion. This lossy
/// folding is the documented caller contract, not an oversight.
async fn check_line(
    store: Arc<dyn JobStore>,
    lookup: Option<Arc<dyn CarrierLookup>>,
    job_id: Uuid,
    number: String,
    dispatch_delay: Duration,
) {
    if !store
        .set_status(job_id, &number, LineStatus::InProgress)
        .await
    {
        // Job disappeared before the task started.
        return;
    }

    // Models dial/ring latency so polling clients can observe InProgress.
    sleep(dispatch_delay).await;

    let status = match lookup {
        None => LineStatus::ProviderDisabled,
        Some(client) => match client.lookup(&number).await {
            Ok(LookupOutcome::CarrierPresent) => LineStatus::Active,
            Ok(LookupOutcome::CarrierAbsent) => LineStatus::Inactive,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Lookup failed, reporting line inactive");
                LineStatus::Inactive
            }
        },
    };

    metrics::counter!("line_checks_total", "status" => status.to_string()).increment(1);
    store.set_status(job_id, &number, status).await;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Batch contains no phone numbers")]
    EmptyBatch,
}
