//! Harvest coordinator - main orchestration logic
//!
//! This module contains the top-level run, including:
//! - Opening (or resuming) the store and replaying it into shared state
//! - Building the HTTP client, page fetcher and classifier
//! - Running every trail through the scheduler
//! - Shutting the store writer down and summarizing the run

use crate::config::Config;
use crate::crawler::classifier::LexicalAuthorityClassifier;
use crate::crawler::fetcher::{build_http_client, HttpPageFetcher};
use crate::crawler::scheduler::{TrailFailure, TrailScheduler};
use crate::crawler::trail::TrailContext;
use crate::output::{HarvestStats, StatsSnapshot};
use crate::state::HarvestState;
use crate::storage::{open_store, StoreHandle, StoreWriter};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Path of the CSV store
    pub output_path: PathBuf,

    /// First id this run could assign (existing records + 1)
    pub first_id: u64,

    /// Records the writer persisted during this run
    pub records_written: u64,

    pub trails_run: usize,
    pub failures: Vec<TrailFailure>,
    pub stats: StatsSnapshot,
}

impl HarvestSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Turns trail failures into an error, now that every trail has finished
    pub fn ensure_success(&self) -> Result<(), HarvestError> {
        match self.failures.first() {
            None => Ok(()),
            Some(first) => Err(HarvestError::TrailsFailed {
                failed: self.failures.len(),
                total: self.trails_run,
                first: HarvestError::Trail {
                    trail_id: first.trail_id,
                    message: first.message.clone(),
                }
                .to_string(),
            }),
        }
    }
}

/// Main harvest coordinator structure
pub struct Harvester {
    config: Arc<Config>,
    state: Arc<HarvestState>,
    stats: Arc<HarvestStats>,
    store: StoreHandle,
    writer: StoreWriter,
    client: Client,
    first_id: u64,
}

impl Harvester {
    /// Creates a new harvester
    ///
    /// Opens the store before anything else so that every existing sentence and
    /// classification is loaded before the first trail starts. Must be called
    /// from within a tokio runtime, since the store writer is spawned here.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The store or HTTP client could not be set up
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let state = Arc::new(HarvestState::new());

        let output_path = config.output.path();
        let (store, writer, first_id) = open_store(&output_path, &state)?;
        if state.sentences.is_empty() && state.memo.is_empty() {
            tracing::info!("Store {} is new, starting at id 1", output_path.display());
        } else {
            tracing::info!(
                "Store {} ready: {} known sentences, {} memoized words, next id {}",
                output_path.display(),
                state.sentences.len(),
                state.memo.len(),
                first_id
            );
        }

        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;

        Ok(Self {
            config: Arc::new(config),
            state,
            stats: Arc::new(HarvestStats::new()),
            store,
            writer,
            client,
            first_id,
        })
    }

    /// Shared dedup and memo state
    pub fn state(&self) -> &Arc<HarvestState> {
        &self.state
    }

    /// Id the first record of this run will receive
    pub fn first_id(&self) -> u64 {
        self.first_id
    }

    /// Runs every trail and waits for all of them
    ///
    /// Trail failures do not abort the run; they are listed in the returned
    /// summary (see [`HarvestSummary::ensure_success`]).
    pub async fn run(self) -> Result<HarvestSummary, HarvestError> {
        let started_at = Utc::now();
        let crawler = &self.config.crawler;

        let ctx = TrailContext {
            source: Arc::new(HttpPageFetcher::new(self.client.clone())),
            classifier: Arc::new(LexicalAuthorityClassifier::new(
                self.client.clone(),
                &self.config.lookup,
            )?),
            sink: Arc::new(self.store.clone()),
            state: Arc::clone(&self.state),
            stats: Arc::clone(&self.stats),
            entry_url: Url::parse(&crawler.entry_url)?,
            cluster_size: crawler.cluster_size,
            delay: crawler.delay(),
        };

        let output_path = self.store.path().clone();
        // The writer stops once the last handle is gone.
        drop(self.store);

        let scheduler = TrailScheduler::from_config(crawler);
        let report = scheduler.run(ctx).await;

        let records_written = self.writer.finish().await?;
        let finished_at = Utc::now();

        tracing::info!(
            "Harvest finished: {} trails, {} failed, {} records written in {}s",
            report.total(),
            report.failures.len(),
            records_written,
            (finished_at - started_at).num_seconds()
        );

        Ok(HarvestSummary {
            started_at,
            finished_at,
            output_path,
            first_id: self.first_id,
            records_written,
            trails_run: report.total(),
            failures: report.failures,
            stats: self.stats.snapshot(),
        })
    }
}

/// Runs a complete harvest
///
/// # Example
///
/// ```no_run
/// use slang_harvest::config::load_config;
/// use slang_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_harvest(config).await?;
/// summary.ensure_success()?;
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<HarvestSummary, HarvestError> {
    Harvester::new(config)?.run().await
}
