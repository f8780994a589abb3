//! Crawl trail worker
//!
//! A trail starts at the random entry point and follows "next" links for at
//! most `cluster_size` pages. For every entry on a page it claims the sentence,
//! resolves the word's classification (memo first, classifier on a miss) and
//! appends the record.

use crate::crawler::classifier::{Classifier, LookupOutcome};
use crate::crawler::fetcher::{FetchOutcome, PageSource};
use crate::crawler::parser::PageEntry;
use crate::output::HarvestStats;
use crate::state::HarvestState;
use crate::storage::RecordSink;
use crate::HarvestError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Everything a trail needs, shared by all trails of a run
#[derive(Clone)]
pub struct TrailContext {
    pub source: Arc<dyn PageSource>,
    pub classifier: Arc<dyn Classifier>,
    pub sink: Arc<dyn RecordSink>,
    pub state: Arc<HarvestState>,
    pub stats: Arc<HarvestStats>,
    pub entry_url: Url,
    pub cluster_size: u32,
    pub delay: Duration,
}

/// What one trail did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailReport {
    pub trail_id: usize,
    pub pages_visited: u32,
    pub records_saved: u64,
    pub duplicates_skipped: u64,
    /// The trail stopped because a fetch failed
    pub ended_on_fetch_failure: bool,
}

/// Position of a trail along its chain of pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailCursor {
    url: Option<Url>,
    hops_remaining: u32,
}

impl TrailCursor {
    pub fn new(entry_url: Url, cluster_size: u32) -> Self {
        let url = (cluster_size > 0).then_some(entry_url);
        Self {
            url,
            hops_remaining: cluster_size,
        }
    }

    /// The page to fetch next, or None once the trail is done
    pub fn current(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn hops_remaining(&self) -> u32 {
        self.hops_remaining
    }

    /// Consumes one hop and moves to `next`
    ///
    /// # Returns
    ///
    /// * `true` - There is another page to visit
    /// * `false` - The hop budget is spent or the page had no next link
    pub fn advance(&mut self, next: Option<Url>) -> bool {
        self.hops_remaining = self.hops_remaining.saturating_sub(1);
        self.url = if self.hops_remaining == 0 { None } else { next };
        self.url.is_some()
    }
}

/// Runs one trail to completion
///
/// Fetch and lookup failures are absorbed: a failed fetch simply ends the
/// trail. Only a store failure is returned as an error.
pub async fn run_trail(trail_id: usize, ctx: &TrailContext) -> Result<TrailReport, HarvestError> {
    let mut report = TrailReport {
        trail_id,
        ..TrailReport::default()
    };
    let mut cursor = TrailCursor::new(ctx.entry_url.clone(), ctx.cluster_size);

    while let Some(url) = cursor.current().cloned() {
        let outcome = ctx.source.fetch(&url).await;
        if let FetchOutcome::Failed { error } = &outcome {
            tracing::warn!("Trail {}: fetch of {} failed: {}", trail_id, url, error);
            ctx.stats.record_fetch_failure();
            report.ended_on_fetch_failure = true;
        } else {
            ctx.stats.record_page();
            report.pages_visited += 1;
        }

        let page = outcome.into_page();
        tracing::debug!(
            "Trail {}: {} entries on {} ({} hops left)",
            trail_id,
            page.entries.len(),
            url,
            cursor.hops_remaining()
        );

        for entry in &page.entries {
            process_entry(trail_id, ctx, entry, &mut report).await?;
        }

        if !cursor.advance(page.next_url) {
            break;
        }
        tokio::time::sleep(ctx.delay).await;
    }

    tracing::debug!(
        "Trail {} done: {} pages, {} records saved",
        trail_id,
        report.pages_visited,
        report.records_saved
    );

    Ok(report)
}

/// Dedup check, classification and append for a single entry
async fn process_entry(
    trail_id: usize,
    ctx: &TrailContext,
    entry: &PageEntry,
    report: &mut TrailReport,
) -> Result<(), HarvestError> {
    if !ctx.state.claim_sentence(&entry.sentence) {
        ctx.stats.record_duplicate();
        report.duplicates_skipped += 1;
        return Ok(());
    }

    let classification = match ctx.state.get_or_none(&entry.word) {
        Some(classification) => {
            ctx.stats.record_memo_hit();
            classification
        }
        None => {
            let outcome = ctx.classifier.classify(&entry.word).await;
            ctx.stats.record_lookup(outcome.is_failed());
            if let LookupOutcome::Failed { token, error } = &outcome {
                tracing::warn!(
                    "Trail {}: lookup of {:?} failed on token {:?}: {}; recording as unknown",
                    trail_id,
                    entry.word,
                    token,
                    error
                );
            }
            let classification = outcome.classification();
            ctx.state.put(&entry.word, classification);
            classification
        }
    };

    ctx.sink
        .append(&entry.word, &entry.sentence, classification)
        .await?;
    ctx.stats.record_saved();
    report.records_saved += 1;

    Ok(())
}
