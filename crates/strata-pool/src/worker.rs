use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use strata_core::{ErrorInfo, StrataError};
use tracing::{debug, info_span, Span};

use crate::queue::JobQueue;

/// Lifecycle of a pooled worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// No thread is running; [`Worker::start`] is allowed.
    Idle,
    /// The thread is polling the queue; [`Worker::stop`] is allowed.
    Working,
    /// Termination was requested and the thread is being joined.
    ShouldTerminate,
}

/// A pooled OS thread that pulls jobs from a shared [`JobQueue`].
#[derive(Debug)]
pub struct Worker {
    id: usize,
    state: WorkerState,
    terminate: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Creates an idle worker.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            terminate: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Returns the worker identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Spawns the worker thread. Only valid from [`WorkerState::Idle`].
    ///
    /// The thread runs each job it pops to completion and keeps polling the
    /// queue until [`Worker::stop`] raises the termination flag.
    pub fn start(&mut self, queue: Arc<JobQueue>, parent: &Span) -> Result<(), StrataError> {
        if self.state != WorkerState::Idle {
            return Err(self.invalid_state("start"));
        }
        self.terminate.store(false, Ordering::Release);
        let terminate = Arc::clone(&self.terminate);
        let span = info_span!(parent: parent, "worker", id = self.id);
        let handle = thread::Builder::new()
            .name(format!("strata-worker-{}", self.id))
            .spawn(move || {
                let _entered = span.enter();
                debug!("worker started");
                poll_jobs(&queue, &terminate);
                debug!("worker stopped");
            })
            .map_err(|err| {
                StrataError::Worker(
                    ErrorInfo::new("worker-spawn", err.to_string()).with_context("worker", self.id),
                )
            })?;
        self.handle = Some(handle);
        self.state = WorkerState::Working;
        Ok(())
    }

    /// Requests termination and blocks until the thread exits. Only valid from
    /// [`WorkerState::Working`].
    ///
    /// A job already in progress runs to completion before the thread notices
    /// the flag.
    pub fn stop(&mut self) -> Result<(), StrataError> {
        if self.state != WorkerState::Working {
            return Err(self.invalid_state("stop"));
        }
        self.state = WorkerState::ShouldTerminate;
        self.terminate.store(true, Ordering::Release);
        let joined = self.handle.take().map(JoinHandle::join);
        self.state = WorkerState::Idle;
        match joined {
            Some(Err(_)) => Err(StrataError::Worker(
                ErrorInfo::new("worker-panicked", "worker thread panicked")
                    .with_context("worker", self.id),
            )),
            _ => Ok(()),
        }
    }

    fn invalid_state(&self, operation: &str) -> StrataError {
        StrataError::Worker(
            ErrorInfo::new("invalid-worker-state", "operation not allowed in current state")
                .with_context("worker", self.id)
                .with_context("operation", operation)
                .with_context("state", format!("{:?}", self.state)),
        )
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.state == WorkerState::Working {
            let _ = self.stop();
        }
    }
}

fn poll_jobs(queue: &JobQueue, terminate: &AtomicBool) {
    while !terminate.load(Ordering::Acquire) {
        match queue.try_pop() {
            Some(job) => job(),
            None => thread::yield_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    fn wait_for(counter: &AtomicUsize, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while counter.load(Ordering::SeqCst) < expected {
            assert!(Instant::now() < deadline, "jobs did not run in time");
            thread::yield_now();
        }
    }

    #[test]
    fn start_then_stop_runs_queued_jobs() {
        let queue = Arc::new(JobQueue::new());
        let runs = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let runs = Arc::clone(&runs);
            queue.push(Box::new(move || {
                runs.fetch_add(1, Ordering::SeqCst);
            }));
        }
        let mut worker = Worker::new(0);
        worker.start(Arc::clone(&queue), &Span::none()).unwrap();
        assert_eq!(worker.state(), WorkerState::Working);
        wait_for(&runs, 5);
        worker.stop().unwrap();
        assert_eq!(worker.state(), WorkerState::Idle);
        assert!(queue.is_empty());
    }

    #[test]
    fn lifecycle_rejects_out_of_order_calls() {
        let queue = Arc::new(JobQueue::new());
        let mut worker = Worker::new(3);
        let err = worker.stop().unwrap_err();
        assert_eq!(err.code(), "invalid-worker-state");
        assert_eq!(err.info().context.get("state"), Some(&"Idle".to_string()));

        worker.start(Arc::clone(&queue), &Span::none()).unwrap();
        let err = worker.start(Arc::clone(&queue), &Span::none()).unwrap_err();
        assert_eq!(err.info().context.get("operation"), Some(&"start".to_string()));
        worker.stop().unwrap();

        // Idle again, so the worker can be restarted.
        worker.start(queue, &Span::none()).unwrap();
        worker.stop().unwrap();
    }
}
