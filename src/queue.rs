//! Serialized execution of incorporation batches.
//!
//! Independently-triggered batches (a user expanding a second node before the
//! first expansion finished) would otherwise interleave their upserts.
//! Interleaving is safe for distinct ids, but two batches racing to be first
//! for the *same* id pick a winner nondeterministically. A single worker
//! thread removes the race: batches apply strictly in submission order.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use miette::Diagnostic;
use thiserror::Error;

use crate::error::LoomError;
use crate::graph::store::GraphStore;
use crate::incorporate::{IncorporationReport, Incorporator};
use crate::results::ResultRow;

/// Errors specific to the batch queue.
#[derive(Debug, Error, Diagnostic)]
pub enum QueueError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Batch(#[from] LoomError),

    #[error("incorporation worker is no longer running")]
    #[diagnostic(
        code(loom::queue::worker_gone),
        help(
            "The queue was shut down or its worker thread panicked. Create a \
             fresh IncorporationQueue; the graph store itself is unaffected."
        )
    )]
    WorkerGone,
}

/// Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

struct Job {
    rows: Vec<ResultRow>,
    done: mpsc::Sender<Result<IncorporationReport, LoomError>>,
}

/// Handle to one submitted batch.
pub struct BatchHandle {
    outcome: mpsc::Receiver<Result<IncorporationReport, LoomError>>,
}

impl BatchHandle {
    /// Block until the batch has been applied (or failed).
    pub fn wait(self) -> QueueResult<IncorporationReport> {
        match self.outcome.recv() {
            Ok(result) => result.map_err(QueueError::from),
            Err(_) => Err(QueueError::WorkerGone),
        }
    }
}

/// Single-worker queue applying incorporation batches in submission order.
pub struct IncorporationQueue {
    sender: Option<mpsc::Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl IncorporationQueue {
    /// Spawn the worker thread over the given incorporator and store.
    pub fn spawn(incorporator: Incorporator, store: Arc<GraphStore>) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker = thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                let result = incorporator.incorporate(&job.rows, &store);
                if let Err(ref e) = result {
                    tracing::warn!(error = %e, "incorporation batch failed");
                }
                // The submitter may have dropped its handle; the batch still ran.
                let _ = job.done.send(result);
            }
        });
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Enqueue a batch, returning a handle to its outcome.
    ///
    /// Batches run to completion or failure in submission order; there is no
    /// cancellation.
    pub fn submit(&self, rows: Vec<ResultRow>) -> BatchHandle {
        let (done, outcome) = mpsc::channel();
        if let Some(sender) = &self.sender {
            // A send failure means the worker is gone; the handle will report
            // WorkerGone because `done` is dropped with the job.
            let _ = sender.send(Job { rows, done });
        }
        BatchHandle { outcome }
    }

    /// Drain pending batches and stop the worker.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for IncorporationQueue {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for IncorporationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncorporationQueue")
            .field("running", &self.sender.is_some())
            .finish()
    }
}
