//! Parallel executor: fan items out to a bounded pool of worker threads and return results
//! in input order.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::debug;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::error::BuildError;
use crate::pipeline::WarningSink;
use crate::types::Warning;
use crate::utils::config::{ExecutorConsts, WorkerLimits};

/// An item whose worker returned an error or panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub index: usize,
    pub message: String,
    /// A listener failed: the configuration is broken, so the whole run must stop.
    /// Panics and other errors only cost their own slot.
    pub fatal: bool,
}

/// `results[i]` belongs to `items[i]`; failed items leave `None`.
#[derive(Debug)]
pub struct ParallelOutcome<R> {
    pub results: Vec<Option<R>>,
    /// Sorted by item index; per-item order preserved.
    pub warnings: Vec<Warning>,
    pub failures: Vec<Failure>,
}

impl<R> ParallelOutcome<R> {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Error side of one item before it is tied to its index.
struct Failed {
    message: String,
    fatal: bool,
}

type Done<R> = (usize, Result<R, Failed>);

/// Run `worker_fn` over every item. `workers: None` picks a multiple of available
/// parallelism; `Some(1)`, or fewer items than the parallel threshold, runs sequentially on
/// the calling thread. `on_done` is called once per finished item.
pub fn run_in_parallel<T, R, F>(
    items: &[T],
    worker_fn: F,
    workers: Option<usize>,
    on_done: Option<&(dyn Fn() + Sync)>,
) -> ParallelOutcome<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T, &WarningSink) -> anyhow::Result<R> + Sync,
{
    let workers = workers
        .unwrap_or_else(|| WorkerLimits::detect().default_workers())
        .max(1);
    let (warn_tx, warn_rx) = unbounded::<(usize, Warning)>();
    let mut results: Vec<Option<R>> = items.iter().map(|_| None).collect();
    let mut failures = Vec::new();

    let mut record = |index: usize, outcome: Result<R, Failed>| {
        match outcome {
            Ok(r) => results[index] = Some(r),
            Err(Failed { message, fatal }) => {
                debug!("item {index} failed: {message}");
                failures.push(Failure {
                    index,
                    message,
                    fatal,
                });
            }
        }
        if let Some(cb) = on_done {
            cb();
        }
    };

    if workers == 1 || items.len() < ExecutorConsts::MIN_ITEMS_FOR_PARALLEL {
        debug!("executor: {} items, sequential", items.len());
        for (index, item) in items.iter().enumerate() {
            let sink = WarningSink::new(index, warn_tx.clone());
            record(index, run_item(&worker_fn, item, &sink));
        }
    } else {
        let pool = workers.min(items.len());
        let cap = pool * ExecutorConsts::CHANNEL_CAP_PER_WORKER;
        debug!("executor: {} items, {} workers", items.len(), pool);
        let (job_tx, job_rx) = bounded::<usize>(cap);
        let (done_tx, done_rx) = bounded::<Done<R>>(cap);
        thread::scope(|s| {
            for _ in 0..pool {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                let warn_tx = warn_tx.clone();
                let worker_fn = &worker_fn;
                s.spawn(move || worker_loop(job_rx, done_tx, warn_tx, items, worker_fn));
            }
            // Dropping the last sender closes the channel so the receive loop ends.
            drop(done_tx);
            drop(job_rx);
            s.spawn(move || {
                for index in 0..items.len() {
                    if job_tx.send(index).is_err() {
                        break;
                    }
                }
            });
            for (index, outcome) in done_rx.iter() {
                record(index, outcome);
            }
        });
    }

    drop(warn_tx);
    let mut tagged: Vec<(usize, Warning)> = warn_rx.try_iter().collect();
    tagged.sort_by_key(|(index, _)| *index);
    failures.sort_by_key(|f| f.index);
    ParallelOutcome {
        results,
        warnings: tagged.into_iter().map(|(_, w)| w).collect(),
        failures,
    }
}

/// Single worker: take indices from `job_rx`, run the item, send the outcome on `done_tx`.
fn worker_loop<T, R, F>(
    job_rx: Receiver<usize>,
    done_tx: Sender<Done<R>>,
    warn_tx: Sender<(usize, Warning)>,
    items: &[T],
    worker_fn: &F,
) where
    F: Fn(&T, &WarningSink) -> anyhow::Result<R>,
{
    while let Ok(index) = job_rx.recv() {
        let sink = WarningSink::new(index, warn_tx.clone());
        let outcome = run_item(worker_fn, &items[index], &sink);
        if done_tx.send((index, outcome)).is_err() {
            break;
        }
    }
}

/// Run one item, turning both errors and panics into a message.
fn run_item<T, R, F>(worker_fn: &F, item: &T, sink: &WarningSink) -> Result<R, Failed>
where
    F: Fn(&T, &WarningSink) -> anyhow::Result<R>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| worker_fn(item, sink))) {
        Ok(Ok(r)) => Ok(r),
        Ok(Err(e)) => Err(Failed {
            fatal: is_fatal(&e),
            message: format!("{e:#}"),
        }),
        Err(payload) => Err(Failed {
            message: format!("worker panicked: {}", panic_message(payload.as_ref())),
            fatal: false,
        }),
    }
}

/// True when a non-soft [`BuildError`] sits anywhere in the error chain.
fn is_fatal(e: &anyhow::Error) -> bool {
    e.chain()
        .any(|cause| cause.downcast_ref::<BuildError>().is_some_and(|b| !b.is_soft()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
