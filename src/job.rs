use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::printer::PrinterHandle;

/// The lifecycle state of a tracked print job (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Running,
    Paused,
    Finished,
    Aborted,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Finished => "finished",
            JobStatus::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Aborted)
    }
}

/// A single tracked print job (spec §3). `pgid` is set iff the job is
/// Running or Paused; `assigned_printer` is set iff the job has ever been
/// dispatched (Running, Paused, Finished, or Aborted).
pub struct Job {
    pub id: u64,
    pub input_path: String,
    pub assigned_printer: Option<PrinterHandle>,
    pub status: JobStatus,
    pub pgid: Option<i32>,
    pub created_at: Instant,
    pub status_changed_at: Instant,
}

impl Job {
    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
        self.status_changed_at = Instant::now();
    }
}

/// Job Store (spec §4.4): bounded by `capacity`, ids are assigned
/// monotonically and never reused (Open Question resolved in DESIGN.md —
/// ids are stable for a job's lifetime and the store stays a sparse map,
/// the same policy the teacher's `JobTable` already uses for background
/// jobs rather than a compacted, renumbered array).
pub struct JobStore {
    jobs: HashMap<u64, Job>,
    next_id: u64,
    capacity: usize,
}

impl JobStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: HashMap::new(),
            next_id: 0,
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    /// Allocate a new Created job. Caller has already validated capacity
    /// and path.
    pub fn create(&mut self, input_path: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let now = Instant::now();
        self.jobs.insert(
            id,
            Job {
                id,
                input_path,
                assigned_printer: None,
                status: JobStatus::Created,
                pgid: None,
                created_at: now,
                status_changed_at: now,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub fn remove(&mut self, id: u64) -> Option<Job> {
        self.jobs.remove(&id)
    }

    /// All jobs in Created state, sorted by id ascending, for the
    /// scheduler's pass order (spec §4.4).
    pub fn created_jobs_sorted(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .jobs
            .values()
            .filter(|j| j.status == JobStatus::Created)
            .map(|j| j.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All jobs sorted by id, for the `jobs` listing command.
    pub fn all_sorted(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.jobs.values().collect();
        jobs.sort_by_key(|j| j.id);
        jobs
    }

    /// Find the job whose pgid matches a reaped supervisor pid.
    pub fn find_by_pgid(&mut self, pgid: i32) -> Option<&mut Job> {
        self.jobs.values_mut().find(|j| j.pgid == Some(pgid))
    }

    /// Ids of Finished/Aborted jobs whose grace period has elapsed
    /// (spec §4.4 `sweep()`).
    pub fn expired(&self, retention: Duration, now: Instant) -> Vec<u64> {
        self.jobs
            .values()
            .filter(|j| {
                j.status.is_terminal() && now.duration_since(j.status_changed_at) >= retention
            })
            .map(|j| j.id)
            .collect()
    }
}
