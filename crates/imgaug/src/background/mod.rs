//! Background augmentation: worker threads feeding a bounded queue.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────┐
//!                  │ BatchSource  │ (shared, pulled under a mutex)
//!                  └──────┬───────┘
//!                         │ raw batches
//!                         ↓
//!                  [Worker Threads] ← each with its own RandomState
//!                         │ augmenter.transform(batch)
//!                         ↓
//!              ┌─────────────────────┐
//!              │ bounded queue       │ (capacity = maxlen, backpressure)
//!              └──────────┬──────────┘
//!                         │ WorkerMessage
//!                         ↓
//!                     get_batch()
//! ```
//!
//! Batches arrive in completion order. With more than one worker that
//! order is not the order of the source.
//!
//! # Module Structure
//!
//! ```text
//! background/
//! ├── mod.rs     # BackgroundAugmenter, BatchSource
//! ├── config.rs  # BackgroundConfig and builder
//! └── worker.rs  # worker loop and queue messages
//! ```
//!
//! # Example
//! ```
//! use imgaug::augmenters::Fliplr;
//! use imgaug::background::BackgroundAugmenter;
//! use imgaug::Batch;
//! use ndarray::Array4;
//! use std::sync::Arc;
//!
//! let images = Array4::<u8>::zeros((2, 8, 8, 3));
//! let source = (0..3).map(move |_| Ok::<_, anyhow::Error>(Batch::new(images.clone())));
//! let mut bg = BackgroundAugmenter::new(source, Arc::new(Fliplr::new(0.5)?), 2, 1)?;
//!
//! let mut seen = 0;
//! while let Some(batch) = bg.get_batch()? {
//!     assert_eq!(batch.nb_images(), 2);
//!     seen += 1;
//! }
//! assert_eq!(seen, 3);
//! bg.join()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod config;
mod worker;

pub use config::{BackgroundConfig, BackgroundConfigBuilder};
pub use worker::WorkerMessage;

use crate::augmenters::Augmenter;
use crate::batch::Batch;
use crate::random::RandomState;
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use worker::{run_worker, WorkerContext};

/// Anything that hands out raw batches, one at a time.
///
/// `None` ends the stream. Any iterator over `Result<Batch>` is a source.
pub trait BatchSource: Send {
    fn next_batch(&mut self) -> Option<Result<Batch>>;
}

impl<I> BatchSource for I
where
    I: Iterator<Item = Result<Batch>> + Send,
{
    fn next_batch(&mut self) -> Option<Result<Batch>> {
        self.next()
    }
}

/// Augments batches on worker threads ahead of the consumer.
///
/// Lifecycle: workers start in the constructor and run until the source is
/// exhausted or [`shutdown`](Self::shutdown) is called. Dropping the
/// augmenter shuts it down and joins the workers.
pub struct BackgroundAugmenter {
    workers: Vec<thread::JoinHandle<()>>,
    queue_rx: Receiver<WorkerMessage>,
    shutdown: Arc<AtomicBool>,
    nb_workers: usize,
    nb_finished: usize,
    config: BackgroundConfig,
}

impl BackgroundAugmenter {
    /// Starts `nb_workers` workers feeding a queue of capacity `maxlen`.
    pub fn new<S>(
        source: S,
        augmenter: Arc<dyn Augmenter>,
        maxlen: usize,
        nb_workers: usize,
    ) -> Result<Self>
    where
        S: BatchSource + 'static,
    {
        let config = BackgroundConfig::builder()
            .maxlen(maxlen)
            .nb_workers(nb_workers)
            .build();
        Self::with_config(source, augmenter, config)
    }

    pub fn with_config<S>(
        source: S,
        augmenter: Arc<dyn Augmenter>,
        config: BackgroundConfig,
    ) -> Result<Self>
    where
        S: BatchSource + 'static,
    {
        config
            .validate()
            .context("Invalid background augmenter configuration")?;

        let (queue_tx, queue_rx) = bounded(config.maxlen);
        let source: Arc<Mutex<Box<dyn BatchSource>>> = Arc::new(Mutex::new(Box::new(source)));
        let shutdown = Arc::new(AtomicBool::new(false));
        let base_seed = config
            .seed
            .unwrap_or_else(|| RandomState::from_entropy().next_seed());

        let mut this = Self {
            workers: Vec::with_capacity(config.nb_workers),
            queue_rx,
            shutdown,
            nb_workers: config.nb_workers,
            nb_finished: 0,
            config,
        };

        for worker_id in 0..this.nb_workers {
            let ctx = WorkerContext {
                worker_id,
                source: source.clone(),
                augmenter: augmenter.clone(),
                queue_tx: queue_tx.clone(),
                shutdown: this.shutdown.clone(),
                rng: RandomState::for_worker(base_seed, worker_id),
                poll_interval: this.config.poll_interval,
            };

            // On failure `this` is dropped, which stops the workers spawned so far.
            let handle = thread::Builder::new()
                .name(format!("augment-worker-{}", worker_id))
                .spawn(move || run_worker(ctx))
                .with_context(|| format!("Failed to spawn worker thread {}", worker_id))?;
            this.workers.push(handle);
        }

        info!(
            "Started {} background worker(s), queue capacity {}, base seed {}",
            this.nb_workers, this.config.maxlen, base_seed
        );
        Ok(this)
    }

    /// Next augmented batch, blocking while the queue is empty.
    ///
    /// Returns `Ok(None)` once every worker has finished and the queue is
    /// drained. A failure reported by a worker is returned as `Err`; later
    /// calls keep delivering the other batches.
    pub fn get_batch(&mut self) -> Result<Option<Batch>> {
        loop {
            if self.is_exhausted() {
                return Ok(None);
            }
            match self.queue_rx.recv() {
                Ok(message) => {
                    if let Some(result) = self.handle(message) {
                        return result.map(Some);
                    }
                }
                // Every sender is gone, so no worker is left running.
                Err(_) => {
                    self.nb_finished = self.nb_workers;
                    return Ok(None);
                }
            }
        }
    }

    /// Like [`get_batch`](Self::get_batch) but gives up after `timeout`.
    pub fn get_batch_timeout(&mut self, timeout: Duration) -> Result<Option<Batch>> {
        loop {
            if self.is_exhausted() {
                return Ok(None);
            }
            match self.queue_rx.recv_timeout(timeout) {
                Ok(message) => {
                    if let Some(result) = self.handle(message) {
                        return result.map(Some);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(anyhow!(
                        "No batch received within {:?}; {} of {} worker(s) still running, \
                        they may be stuck",
                        timeout,
                        self.nb_workers - self.nb_finished,
                        self.nb_workers
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.nb_finished = self.nb_workers;
                    return Ok(None);
                }
            }
        }
    }

    /// [`get_batch_timeout`](Self::get_batch_timeout) with the configured timeout.
    pub fn get_batch_with_default_timeout(&mut self) -> Result<Option<Batch>> {
        self.get_batch_timeout(self.config.timeout)
    }

    /// `None` for bookkeeping messages, which the caller skips.
    fn handle(&mut self, message: WorkerMessage) -> Option<Result<Batch>> {
        match message {
            WorkerMessage::Batch(batch) => Some(Ok(batch)),
            WorkerMessage::Failed { worker_id, error } => {
                debug!("Surfacing failure of worker {}", worker_id);
                Some(Err(error))
            }
            WorkerMessage::Finished { worker_id } => {
                self.nb_finished += 1;
                debug!(
                    "Worker {} finished ({}/{})",
                    worker_id, self.nb_finished, self.nb_workers
                );
                None
            }
        }
    }

    /// Whether every worker has reported the end of the source.
    pub fn is_exhausted(&self) -> bool {
        self.nb_finished >= self.nb_workers
    }

    /// Number of messages currently buffered in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue_rx.len()
    }

    pub fn nb_workers(&self) -> usize {
        self.nb_workers
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    /// Asks the workers to stop. Workers notice between batches and while
    /// waiting on a full queue; batches already queued stay readable.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::Relaxed) {
            info!("Shutting down {} background worker(s)", self.nb_workers);
        }
    }

    /// Blocks until every worker thread has exited.
    ///
    /// Without a prior [`shutdown`](Self::shutdown) this waits for the source
    /// to run dry, so the queue has to be drained concurrently or be large
    /// enough for the remaining batches.
    pub fn join(&mut self) -> Result<()> {
        let mut panicked = Vec::new();
        for (worker_id, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() {
                error!("Worker {} panicked", worker_id);
                panicked.push(worker_id);
            }
        }
        if panicked.is_empty() {
            debug!("All background workers joined");
            Ok(())
        } else {
            Err(anyhow!("Background worker(s) {:?} panicked", panicked))
        }
    }
}

impl Drop for BackgroundAugmenter {
    fn drop(&mut self) {
        self.shutdown();
        if let Err(e) = self.join() {
            error!("{:#}", e);
        }
    }
}
