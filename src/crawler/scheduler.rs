//! Trail scheduler
//!
//! This module handles:
//! - Turning the page target into a number of trails
//! - Feeding trail ids through a bounded channel to a fixed pool of workers
//! - Isolating each trail so that an error or panic never reaches its siblings
//! - Collecting every trail's report before returning

use crate::config::CrawlerConfig;
use crate::crawler::trail::{run_trail, TrailContext, TrailReport};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// A trail that ended with an error or panicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailFailure {
    pub trail_id: usize,
    pub message: String,
}

/// Result of running every trail
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    /// Reports of trails that finished normally
    pub completed: Vec<TrailReport>,

    /// Trails that failed
    pub failures: Vec<TrailFailure>,
}

impl ScheduleReport {
    /// Number of trails that ran
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }
}

/// Dispatches trails across a bounded pool of workers
///
/// The scheduler coordinates:
/// - Trail count: `ceil(pages_to_visit / cluster_size)`
/// - Parallelism: at most `max_workers` trails run at the same time; the rest
///   wait in the queue for a free worker
#[derive(Debug, Clone)]
pub struct TrailScheduler {
    trail_count: usize,
    max_workers: usize,
}

impl TrailScheduler {
    pub fn new(trail_count: usize, max_workers: usize) -> Self {
        Self {
            trail_count,
            max_workers: max_workers.max(1),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.trail_count(), config.max_workers as usize)
    }

    pub fn trail_count(&self) -> usize {
        self.trail_count
    }

    /// Runs every trail and waits for all of them
    ///
    /// Never fails as a whole: a trail error or panic is recorded in the
    /// returned report and the remaining trails keep running.
    pub async fn run(&self, ctx: TrailContext) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        if self.trail_count == 0 {
            return report;
        }

        let worker_count = self.max_workers.min(self.trail_count);
        let (tx, rx) = mpsc::channel::<usize>(worker_count);
        let rx = Arc::new(Mutex::new(rx));

        tracing::info!(
            "Dispatching {} trails across {} workers",
            self.trail_count,
            worker_count
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let rx = Arc::clone(&rx);
            let ctx = ctx.clone();
            workers.spawn(worker_loop(worker_id, rx, ctx));
        }
        drop(ctx);

        for trail_id in 0..self.trail_count {
            if tx.send(trail_id).await.is_err() {
                tracing::error!("All workers stopped before trail {} was queued", trail_id);
                break;
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome {
                            Ok(trail) => report.completed.push(trail),
                            Err(failure) => report.failures.push(failure),
                        }
                    }
                }
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        report.completed.sort_by_key(|trail| trail.trail_id);
        report.failures.sort_by_key(|failure| failure.trail_id);
        report
    }
}

/// Pulls trail ids until the queue is closed and drained
async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<usize>>>,
    ctx: TrailContext,
) -> Vec<Result<TrailReport, TrailFailure>> {
    let mut outcomes = Vec::new();

    loop {
        let next = rx.lock().await.recv().await;
        let Some(trail_id) = next else {
            break;
        };

        tracing::debug!("Worker {} starting trail {}", worker_id, trail_id);

        // Each trail runs as its own task so that a panic is caught here.
        let trail_ctx = ctx.clone();
        let joined = tokio::spawn(async move { run_trail(trail_id, &trail_ctx).await }).await;

        let outcome = match joined {
            Ok(Ok(trail)) => Ok(trail),
            Ok(Err(e)) => {
                tracing::error!("Trail {} failed: {}", trail_id, e);
                Err(TrailFailure {
                    trail_id,
                    message: e.to_string(),
                })
            }
            Err(e) => {
                tracing::error!("Trail {} panicked: {}", trail_id, e);
                Err(TrailFailure {
                    trail_id,
                    message: format!("panicked: {}", e),
                })
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}
