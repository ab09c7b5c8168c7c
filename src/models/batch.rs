use std::collections::HashMap;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{JobSnapshot, LineStatus};

/// Request to submit a batch of numbers for verification (JSON variant).
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[garde(length(min = 1))]
    pub numbers: Vec<String>,
}

/// Response after submitting a batch.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub total: usize,
    pub message: String,
}

/// Response for polling a batch's progress.
#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub job_id: Uuid,
    pub statuses: HashMap<String, LineStatus>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<JobSnapshot> for BatchStatusResponse {
    fn from(snapshot: JobSnapshot) -> Self {
        Self {
            job_id: snapshot.id,
            statuses: snapshot.statuses,
            completed_at: snapshot.completed_at,
        }
    }
}
