use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use strata_core::{derive_substream_seed, ErrorInfo, RngHandle, StrataError};
use strata_graph::{GraphStore, LayeredGraphGenerator};
use tracing::{error, info, info_span, Span};

use crate::config::ControllerConfig;
use crate::latch::CompletionLatch;
use crate::queue::{Job, JobQueue};
use crate::worker::{Worker, WorkerState};

/// Outcome of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of jobs enqueued.
    pub requested: usize,
    /// Number of jobs whose graph reached the finished callback.
    pub completed: usize,
}

/// Runs many independent generations on a fixed pool of worker threads.
///
/// Callbacks are serialized through a single lock: no two `on_started` or
/// `on_finished` bodies ever run at the same time, while the generation work
/// between them runs in parallel. There is no ordering guarantee between
/// jobs.
#[derive(Debug)]
pub struct GenerationController {
    config: ControllerConfig,
    workers: Vec<Worker>,
    queue: Arc<JobQueue>,
    span: Span,
}

impl GenerationController {
    /// Creates a controller with `config.threads_count` idle workers.
    pub fn new(config: ControllerConfig) -> Result<Self, StrataError> {
        if config.threads_count == 0 {
            return Err(StrataError::invalid_parameter(
                "threads_count",
                0,
                "thread count must be positive",
            ));
        }
        Ok(Self {
            config,
            workers: (0..config.threads_count).map(Worker::new).collect(),
            queue: Arc::new(JobQueue::new()),
            span: Span::none(),
        })
    }

    /// Parents every worker and job span to `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Returns the state of every worker.
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(Worker::state).collect()
    }

    /// Generates `graphs_count` graphs, blocking until all of them are done.
    ///
    /// `on_started(index)` runs before job `index` generates and
    /// `on_finished(index, graph)` receives its graph. The first job failure
    /// (a generator error or a panic in a job or callback) is returned once
    /// the remaining jobs have drained and the workers have stopped.
    pub fn generate<S, F>(&mut self, on_started: S, on_finished: F) -> Result<BatchReport, StrataError>
    where
        S: Fn(usize) + Send + Sync + 'static,
        F: Fn(usize, GraphStore) + Send + Sync + 'static,
    {
        let requested = self.config.graphs_count;
        let batch = Arc::new(Batch::new(
            self.config,
            Box::new(on_started),
            Box::new(on_finished),
        ));
        info!(
            graphs = requested,
            threads = self.config.threads_count,
            max_depth = self.config.params.max_depth,
            fan_out = self.config.params.fan_out,
            "starting generation batch"
        );

        for index in 0..requested {
            self.queue.push(job(Arc::clone(&batch), index, self.span.clone()));
        }
        for position in 0..self.workers.len() {
            let started = self.workers[position].start(Arc::clone(&self.queue), &self.span);
            if let Err(err) = started {
                let discarded = self.queue.clear();
                error!(error = %err, discarded, "worker failed to start, aborting batch");
                return Err(match self.stop_workers() {
                    Ok(()) => err,
                    Err(stop) => err.with_context("stop_error", stop),
                });
            }
        }

        batch.latch.wait();
        self.stop_workers()?;

        if let Some(err) = lock(&batch.failure).take() {
            return Err(err);
        }
        let completed = batch.completed.load(Ordering::Acquire);
        info!(completed, "generation batch finished");
        Ok(BatchReport {
            requested,
            completed,
        })
    }

    fn stop_workers(&mut self) -> Result<(), StrataError> {
        let mut first = None;
        for worker in &mut self.workers {
            if worker.state() == WorkerState::Working {
                if let Err(err) = worker.stop() {
                    first.get_or_insert(err);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

type StartedCallback = Box<dyn Fn(usize) + Send + Sync>;
type FinishedCallback = Box<dyn Fn(usize, GraphStore) + Send + Sync>;

struct Batch {
    config: ControllerConfig,
    on_started: StartedCallback,
    on_finished: FinishedCallback,
    callbacks: Mutex<()>,
    latch: CompletionLatch,
    completed: AtomicUsize,
    failure: Mutex<Option<StrataError>>,
}

impl Batch {
    fn new(config: ControllerConfig, on_started: StartedCallback, on_finished: FinishedCallback) -> Self {
        Self {
            config,
            on_started,
            on_finished,
            callbacks: Mutex::new(()),
            latch: CompletionLatch::new(config.graphs_count),
            completed: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    fn run(&self, index: usize) -> Result<(), StrataError> {
        {
            let _serialized = lock(&self.callbacks);
            (self.on_started)(index);
        }

        let draws = match self.config.seed {
            Some(master) => RngHandle::from_seed(derive_substream_seed(master, index as u64)),
            None => RngHandle::from_entropy(),
        };
        let graph = LayeredGraphGenerator::new(self.config.params, draws)
            .generate()
            .map_err(|err| err.with_context("job", index))?;
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            depth = graph.max_depth(),
            "graph generated"
        );

        let _serialized = lock(&self.callbacks);
        (self.on_finished)(index, graph);
        Ok(())
    }

    fn settle(&self, index: usize, outcome: thread::Result<Result<(), StrataError>>) {
        match outcome {
            Ok(Ok(())) => {
                self.completed.fetch_add(1, Ordering::AcqRel);
            }
            Ok(Err(err)) => self.record_failure(err),
            Err(payload) => self.record_failure(job_panicked(index, payload.as_ref())),
        }
        self.latch.count_down();
    }

    fn record_failure(&self, err: StrataError) {
        error!(error = %err, "generation job failed");
        lock(&self.failure).get_or_insert(err);
    }
}

fn job(batch: Arc<Batch>, index: usize, parent: Span) -> Job {
    Box::new(move || {
        let span = info_span!(parent: &parent, "job", index);
        let _entered = span.enter();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| batch.run(index)));
        batch.settle(index, outcome);
    })
}

fn job_panicked(index: usize, payload: &(dyn Any + Send)) -> StrataError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "job panicked".to_string());
    StrataError::Worker(ErrorInfo::new("job-panicked", message).with_context("job", index))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_graph::GeneratorParams;

    fn batch(graphs: usize) -> Batch {
        let config = ControllerConfig::new(GeneratorParams::new(3, 2), graphs, 1).unwrap();
        Batch::new(config, Box::new(|_: usize| {}), Box::new(|_: usize, _: GraphStore| {}))
    }

    #[test]
    fn generator_error_is_recorded_and_counted_down() {
        let batch = batch(2);
        let failure = StrataError::UndeterminedColor(ErrorInfo::new("undetermined-color", "bad shape"));
        batch.settle(0, Ok(Err(failure.clone())));
        batch.settle(1, Ok(Ok(())));

        batch.latch.wait();
        assert_eq!(batch.completed.load(Ordering::Acquire), 1);
        assert_eq!(lock(&batch.failure).take(), Some(failure));
    }

    #[test]
    fn first_failure_wins() {
        let batch = batch(2);
        batch.settle(1, Ok(Err(StrataError::invalid_parameter("fan_out", -1, "first"))));
        batch.settle(0, Err(Box::new("later panic")));

        let recorded = lock(&batch.failure).take().unwrap();
        assert_eq!(recorded.code(), "invalid-parameter");
        assert_eq!(batch.completed.load(Ordering::Acquire), 0);
    }

    #[test]
    fn start_failure_aborts_batch_and_idles_workers() {
        let mut controller = GenerationController::new(
            ControllerConfig::new(GeneratorParams::new(3, 1), 4, 2).unwrap(),
        )
        .unwrap();
        // A worker that is already running cannot be started again.
        let queue = Arc::clone(&controller.queue);
        controller.workers[1].start(queue, &Span::none()).unwrap();

        let err = controller.generate(|_| {}, |_, _| {}).unwrap_err();
        assert_eq!(err.code(), "invalid-worker-state");
        assert_eq!(err.info().context.get("worker"), Some(&"1".to_string()));
        assert!(!err.info().context.contains_key("stop_error"));
        assert!(controller
            .worker_states()
            .iter()
            .all(|state| *state == WorkerState::Idle));
        assert!(controller.queue.is_empty());
    }
}
