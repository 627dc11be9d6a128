//! Scan job state shared between the HTTP handlers and the scan task.
//!
//! At most one scan runs at a time: `ScanJob::try_start` is an atomic
//! compare-and-set on the running flag, and the returned `ScanTicket`
//! is the only handle that can publish results. Dropping the ticket
//! always returns the job to idle, even if the scan task panicked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::types::SetEvaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// What a polling observer sees.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub scan_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Latest ranked results; replaced wholesale on every publish.
    pub results: Vec<SetEvaluation>,
}

impl Default for JobSnapshot {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            scan_id: None,
            started_at: None,
            finished_at: None,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanJob {
    running: AtomicBool,
    snapshot: RwLock<JobSnapshot>,
}

impl ScanJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Claim the job for a new scan. Returns `None` if one is running.
    /// Results of the previous scan are cleared.
    pub fn try_start(self: &Arc<Self>) -> Option<ScanTicket> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let scan_id = Uuid::new_v4();
        self.update(|s| {
            *s = JobSnapshot {
                status: JobStatus::Running,
                scan_id: Some(scan_id),
                started_at: Some(Utc::now()),
                finished_at: None,
                results: Vec::new(),
            };
        });

        Some(ScanTicket {
            job: Arc::clone(self),
            scan_id,
            finished: false,
        })
    }

    fn update(&self, f: impl FnOnce(&mut JobSnapshot)) {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    fn release(&self, results: Option<Vec<SetEvaluation>>) {
        self.update(|s| {
            if let Some(results) = results {
                s.results = results;
            }
            s.status = JobStatus::Idle;
            s.finished_at = Some(Utc::now());
        });
        self.running.store(false, Ordering::Release);
    }
}

/// Exclusive right to report on the running scan.
#[derive(Debug)]
pub struct ScanTicket {
    job: Arc<ScanJob>,
    scan_id: Uuid,
    finished: bool,
}

impl ScanTicket {
    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    /// Replace the visible results with a newer snapshot.
    pub fn publish(&self, results: Vec<SetEvaluation>) {
        self.job.update(|s| s.results = results);
    }

    /// Store the final results and return the job to idle.
    pub fn finish(mut self, results: Vec<SetEvaluation>) {
        self.finished = true;
        self.job.release(Some(results));
    }
}

impl Drop for ScanTicket {
    fn drop(&mut self) {
        if !self.finished {
            self.job.release(None);
        }
    }
}
