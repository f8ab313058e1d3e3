//! Bounded worker pool
//!
//! A fixed number of workers drain one bounded queue. Submission waits for
//! queue space and gives up when the caller's token fires. Closing the pool
//! stops intake; workers drain what was already queued and then exit.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::tasks::panic_message;

/// Unit of work accepted by the pool
pub type Task = BoxFuture<'static, anyhow::Result<()>>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool is closed")]
    Closed,
    #[error("task submission cancelled")]
    Cancelled,
}

/// Dispatch seam used by the reconciler
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task, waiting for capacity until `cancel` fires
    async fn submit(&self, task: Task, cancel: &CancellationToken) -> Result<(), PoolError>;

    /// Stop accepting tasks. Idempotent.
    fn close(&self);
}

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::Receiver<Task>>>;

pub struct WorkerPool {
    sender: Mutex<Option<mpsc::Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Spawn `workers` workers over a queue of `capacity` slots.
    /// Both are clamped to at least one. Must be called inside a tokio runtime.
    pub fn new(workers: usize, capacity: usize) -> Self {
        let size = workers.max(1);
        let (tx, rx) = mpsc::channel::<Task>(capacity.max(1));
        let rx: SharedReceiver = Arc::new(tokio::sync::Mutex::new(rx));

        let handles = (0..size)
            .map(|id| tokio::spawn(worker_loop(id, rx.clone())))
            .collect();

        tracing::info!(workers = size, capacity = capacity.max(1), "Worker pool started");

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Wait for every worker to exit. Only returns once the pool is closed
    /// and the queue has been drained.
    pub async fn join(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = ?e, "Worker join failed");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}

#[async_trait]
impl TaskQueue for WorkerPool {
    async fn submit(&self, task: Task, cancel: &CancellationToken) -> Result<(), PoolError> {
        let sender = self.sender.lock().clone().ok_or(PoolError::Closed)?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PoolError::Cancelled),
            sent = sender.send(task) => sent.map_err(|_| PoolError::Closed),
        }
    }

    fn close(&self) {
        if self.sender.lock().take().is_some() {
            tracing::debug!("Worker pool closed for submissions");
        }
    }
}

async fn worker_loop(id: usize, rx: SharedReceiver) {
    loop {
        let next = { rx.lock().await.recv().await };
        let Some(task) = next else { break };

        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let error = format!("{e:#}");
                tracing::error!(worker = id, error = %error, "Task failed");
            }
            Err(payload) => {
                tracing::error!(
                    worker = id,
                    panic = %panic_message(payload.as_ref()),
                    "Task panicked"
                );
            }
        }
    }
    tracing::debug!(worker = id, "Worker exited");
}
