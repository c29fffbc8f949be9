use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Unit of work executed by a worker.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Mutex-guarded FIFO of pending jobs.
///
/// Jobs are pushed before the workers start and popped without blocking
/// from the worker loop.
#[derive(Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl JobQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a job at the back of the queue.
    pub fn push(&self, job: Job) {
        self.lock().push_back(job);
    }

    /// Removes the job at the front of the queue, if any.
    pub fn try_pop(&self) -> Option<Job> {
        self.lock().pop_front()
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no job is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every pending job, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut jobs = self.lock();
        let discarded = jobs.len();
        jobs.clear();
        discarded
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("pending", &self.len())
            .finish()
    }
}
