//! Worker loop for the background pipeline.
//!
//! Each worker repeatedly pulls a batch from the shared source, runs the
//! augmenter on it and pushes the outcome onto the bounded queue. Every
//! outcome travels as a [`WorkerMessage`], so failures reach the consumer
//! instead of killing the worker.
//!
//! # Queue Protocol
//! - `Batch`: an augmented batch
//! - `Failed`: the source or the augmenter failed on one batch; the worker
//!   keeps going with the next one
//! - `Finished`: sent once, when the source is exhausted

use super::BatchSource;
use crate::augmenters::Augmenter;
use crate::batch::Batch;
use crate::random::RandomState;
use anyhow::{Context, Error};
use crossbeam_channel::{SendTimeoutError, Sender};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Entries of the shared queue.
#[derive(Debug)]
pub enum WorkerMessage {
    Batch(Batch),
    Failed { worker_id: usize, error: Error },
    Finished { worker_id: usize },
}

/// Everything a worker thread owns.
pub(crate) struct WorkerContext {
    pub(crate) worker_id: usize,
    pub(crate) source: Arc<Mutex<Box<dyn BatchSource>>>,
    pub(crate) augmenter: Arc<dyn Augmenter>,
    pub(crate) queue_tx: Sender<WorkerMessage>,
    pub(crate) shutdown: Arc<AtomicBool>,
    pub(crate) rng: RandomState,
    pub(crate) poll_interval: Duration,
}

pub(crate) fn run_worker(ctx: WorkerContext) {
    let WorkerContext {
        worker_id,
        source,
        augmenter,
        queue_tx,
        shutdown,
        mut rng,
        poll_interval,
    } = ctx;
    debug!("Worker {} started ({})", worker_id, augmenter.name());

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Worker {} stopping: shutdown requested", worker_id);
            return;
        }

        // The lock is only held while pulling, augmentation runs unlocked.
        let next = source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_batch();

        let message = match next {
            None => break,
            Some(Ok(batch)) => match augmenter
                .transform(batch, &mut rng)
                .with_context(|| format!("Worker {} failed to augment a batch", worker_id))
            {
                Ok(batch) => WorkerMessage::Batch(batch),
                Err(error) => {
                    warn!("{:#}", error);
                    WorkerMessage::Failed { worker_id, error }
                }
            },
            Some(Err(error)) => {
                let error = error.context(format!(
                    "Worker {} failed to load a batch from the source",
                    worker_id
                ));
                warn!("{:#}", error);
                WorkerMessage::Failed { worker_id, error }
            }
        };

        if !push(&queue_tx, message, &shutdown, poll_interval) {
            info!("Worker {} stopping: queue closed or shutdown requested", worker_id);
            return;
        }
    }

    info!("Worker {} finished: source exhausted", worker_id);
    push(
        &queue_tx,
        WorkerMessage::Finished { worker_id },
        &shutdown,
        poll_interval,
    );
}

/// Blocks until `message` is queued. Returns `false` if the consumer is gone
/// or shutdown was requested while waiting for a free slot.
fn push(
    queue_tx: &Sender<WorkerMessage>,
    mut message: WorkerMessage,
    shutdown: &AtomicBool,
    poll_interval: Duration,
) -> bool {
    loop {
        match queue_tx.send_timeout(message, poll_interval) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(pending)) => {
                if shutdown.load(Ordering::Relaxed) {
                    return false;
                }
                message = pending;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
