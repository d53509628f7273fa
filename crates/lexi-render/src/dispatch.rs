// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Order-preserving parallel map over scoped worker threads.
//!
//! Items are striped across workers (worker `w` takes `w, w + s, w + 2s, …`)
//! so neighbouring entries, which tend to cost about the same, spread over
//! the pool. Each worker owns its own state (a generator with its schema
//! cache). A failure does not stop the other workers; the failure with the
//! lowest item index is reported once every worker has joined.
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::debug;

/// Hard cap on render workers.
pub const MAX_WORKERS: usize = 16;

/// Worker count for `items` entries: `min(cap, ceil(1.5 × cores), items)`,
/// at least one.
pub fn pool_size(items: usize, cap: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    (cores * 3).div_ceil(2).min(cap).min(items).max(1)
}

/// Progress counter and cancellation flag shared with a running render.
#[derive(Debug, Default)]
pub struct ProgressHandle {
    cancelled: AtomicBool,
    completed: AtomicUsize,
}

impl ProgressHandle {
    /// Handle with nothing completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks workers to stop before their next item.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`Self::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Items finished so far (including failed ones).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Why [`parallel_map_ordered`] produced no results.
#[derive(Debug)]
pub enum DispatchFailure<E> {
    /// The item at `index` failed; no lower-indexed item did.
    Failed {
        /// Index of the failing item.
        index: usize,
        /// Its error.
        error: E,
    },
    /// The run was cancelled before every item finished.
    Cancelled,
}

/// Maps `f` over `items` on `workers` scoped threads, returning results in
/// input order.
///
/// `init` builds each worker's private state. A worker panic is resumed on
/// the caller after the scope joins.
pub fn parallel_map_ordered<T, S, R, E, I, F>(
    items: &[T],
    workers: usize,
    progress: &ProgressHandle,
    init: I,
    f: F,
) -> Result<Vec<R>, DispatchFailure<E>>
where
    T: Sync,
    R: Send,
    E: Send,
    I: Fn() -> S + Sync,
    F: Fn(&mut S, usize, &T) -> Result<R, E> + Sync,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let workers = workers.clamp(1, items.len());
    debug!(items = items.len(), workers, "dispatching");

    let lanes: Vec<(Vec<Option<R>>, Option<(usize, E)>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|lane| {
                let (init, f) = (&init, &f);
                scope.spawn(move || {
                    let mut state = init();
                    let mut out = Vec::with_capacity(items.len() / workers + 1);
                    let mut failure = None;
                    for index in (lane..items.len()).step_by(workers) {
                        if progress.is_cancelled() {
                            break;
                        }
                        match f(&mut state, index, &items[index]) {
                            Ok(result) => out.push(Some(result)),
                            Err(error) => {
                                if failure.is_none() {
                                    failure = Some((index, error));
                                }
                                out.push(None);
                            }
                        }
                        progress.record();
                    }
                    (out, failure)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(lane) => lane,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut lane_results = Vec::with_capacity(workers);
    let mut first_failure: Option<(usize, E)> = None;
    for (results, failure) in lanes {
        if let Some((index, error)) = failure {
            if first_failure.as_ref().is_none_or(|(best, _)| index < *best) {
                first_failure = Some((index, error));
            }
        }
        lane_results.push(results.into_iter());
    }
    if let Some((index, error)) = first_failure {
        return Err(DispatchFailure::Failed { index, error });
    }

    let mut ordered = Vec::with_capacity(items.len());
    for index in 0..items.len() {
        match lane_results[index % workers].next().flatten() {
            Some(result) => ordered.push(result),
            None => return Err(DispatchFailure::Cancelled),
        }
    }
    Ok(ordered)
}
