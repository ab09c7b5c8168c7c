use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::job::{JobRecord, JobSnapshot, LineStatus};

/// Process-wide registry of verification jobs.
///
/// Injectable so the in-memory map can be swapped for a persistent backend
/// without touching the orchestrator.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Allocate a fresh job with every number pre-seeded `Pending`.
    async fn create(&self, numbers: Vec<String>) -> Uuid;

    /// Point-in-time copy of a job, or `None` for an unknown id.
    async fn snapshot(&self, job_id: Uuid) -> Option<JobSnapshot>;

    /// Write one line's status and re-run completion detection.
    ///
    /// Returns false when the job id is unknown, so a task whose job has
    /// disappeared can exit with no effect.
    async fn set_status(&self, job_id: Uuid, number: &str, status: LineStatus) -> bool;
}

/// In-memory `JobStore`.
///
/// The outer map is only touched on create/lookup; all per-job mutation goes
/// through the record's own mutex, so updates to different jobs never contend
/// and the `completed_at` read-modify-write is serialized per job. Records
/// are never evicted (see DESIGN.md).
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Arc<Mutex<JobRecord>>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, job_id: Uuid) -> Option<Arc<Mutex<JobRecord>>> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&job_id)
            .cloned()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, numbers: Vec<String>) -> Uuid {
        let job_id = Uuid::new_v4();
        let record = Arc::new(Mutex::new(JobRecord::new(job_id, numbers)));
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_id, record);
        job_id
    }

    async fn snapshot(&self, job_id: Uuid) -> Option<JobSnapshot> {
        let record = self.record(job_id)?;
        let guard = record.lock().unwrap_or_else(|e| e.into_inner());
        Some(JobSnapshot::from(&*guard))
    }

    async fn set_status(&self, job_id: Uuid, number: &str, status: LineStatus) -> bool {
        let Some(record) = self.record(job_id) else {
            return false;
        };

        let mut guard = record.lock().unwrap_or_else(|e| e.into_inner());
        guard.statuses.insert(number.to_string(), status);
        if guard.refresh_completion(Utc::now()) {
            metrics::counter!("verification_batches_completed").increment(1);
            tracing::info!(job_id = %job_id, "Batch verification complete");
        }
        true
    }
}
