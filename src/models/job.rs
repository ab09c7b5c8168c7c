use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single phone line within a verification batch.
///
/// Transitions only move forward: `Pending` → `InProgress` → one of the
/// terminal states, which is never revisited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
pub enum LineStatus {
    Pending,
    InProgress,
    Active,
    Inactive,
    ProviderDisabled,
}

impl LineStatus {
    /// Whether this status ends the line's state machine.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LineStatus::Active | LineStatus::Inactive | LineStatus::ProviderDisabled
        )
    }

    /// Human-facing label used in report rows.
    pub fn label(self) -> &'static str {
        match self {
            LineStatus::Pending => "Testing...",
            LineStatus::InProgress => "Ringing",
            LineStatus::Active => "Active",
            LineStatus::Inactive => "Inactive",
            LineStatus::ProviderDisabled => "Provider Disabled",
        }
    }
}

/// In-memory state for one verification batch.
///
/// `numbers` keeps the submitted order including duplicates; `statuses` is
/// keyed by the literal number string, so duplicate submissions share one
/// status slot.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub numbers: Vec<String>,
    pub statuses: HashMap<String, LineStatus>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(id: Uuid, numbers: Vec<String>) -> Self {
        let statuses = numbers
            .iter()
            .map(|n| (n.clone(), LineStatus::Pending))
            .collect();
        Self {
            id,
            numbers,
            statuses,
            completed_at: None,
        }
    }

    /// Completion detector: stamp `completed_at` once every line is terminal.
    ///
    /// Idempotent — a timestamp, once set, is never overwritten or cleared.
    /// Returns true only on the call that performs the stamp.
    pub fn refresh_completion(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed_at.is_some() {
            return false;
        }
        if self.statuses.values().all(|s| s.is_terminal()) {
            self.completed_at = Some(now);
            return true;
        }
        false
    }

    /// Distinct numbers in first-occurrence order, for report rows.
    pub fn distinct_numbers(&self) -> Vec<&str> {
        distinct(&self.numbers)
    }
}

/// Point-in-time view of a job handed to API handlers and report renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub numbers: Vec<String>,
    pub statuses: HashMap<String, LineStatus>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&JobRecord> for JobSnapshot {
    fn from(record: &JobRecord) -> Self {
        Self {
            id: record.id,
            numbers: record.numbers.clone(),
            statuses: record.statuses.clone(),
            completed_at: record.completed_at,
        }
    }
}

impl JobSnapshot {
    pub fn distinct_numbers(&self) -> Vec<&str> {
        distinct(&self.numbers)
    }
}

fn distinct(numbers: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    numbers
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .map(|n| n.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(numbers: &[&str]) -> JobRecord {
        JobRecord::new(
            Uuid::new_v4(),
            numbers.iter().map(|n| n.to_string()).collect(),
        )
    }

    #[test]
    fn new_record_seeds_all_pending() {
        let job = record(&["+15550001111", "+15550002222"]);
        assert_eq!(job.statuses.len(), 2);
        assert!(job.statuses.values().all(|s| *s == LineStatus::Pending));
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn duplicates_collapse_to_one_status_slot() {
        let job = record(&["+18005551234", "+18005551234", "+18009999999"]);
        assert_eq!(job.numbers.len(), 3);
        assert_eq!(job.statuses.len(), 2);
        assert_eq!(job.distinct_numbers(), vec!["+18005551234", "+18009999999"]);
    }

    #[test]
    fn completion_requires_every_line_terminal() {
        let mut job = record(&["a", "b"]);
        job.statuses.insert("a".into(), LineStatus::Active);
        assert!(!job.refresh_completion(Utc::now()));
        assert!(job.completed_at.is_none());

        job.statuses.insert("b".into(), LineStatus::Inactive);
        assert!(job.refresh_completion(Utc::now()));
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn completion_stamp_is_set_exactly_once() {
        let mut job = record(&["a"]);
        job.statuses.insert("a".into(), LineStatus::ProviderDisabled);
        assert!(job.refresh_completion(Utc::now()));
        let first = job.completed_at;

        assert!(!job.refresh_completion(Utc::now()));
        assert_eq!(job.completed_at, first);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!LineStatus::Pending.is_terminal());
        assert!(!LineStatus::InProgress.is_terminal());
        assert!(LineStatus::Active.is_terminal());
        assert!(LineStatus::Inactive.is_terminal());
        assert!(LineStatus::ProviderDisabled.is_terminal());
    }
}
