#![deny(missing_docs)]

//! Concurrent batch generation of layered graphs.
//!
//! A [`GenerationController`] owns a fixed pool of [`Worker`] threads that
//! poll a shared [`JobQueue`]. Each job builds one graph with its own RNG and
//! reports through start/finish callbacks that never run concurrently with
//! each other.

/// YAML configuration schema and validation.
pub mod config;
/// Batch controller and callback serialization.
pub mod controller;
/// Countdown latch signalled by the last finishing job.
pub mod latch;
/// Shared job queue.
pub mod queue;
/// Worker thread lifecycle.
pub mod worker;

pub use config::{BatchConfig, ControllerConfig};
pub use controller::{BatchReport, GenerationController};
pub use latch::CompletionLatch;
pub use queue::{Job, JobQueue};
pub use worker::{Worker, WorkerState};
