//! Harvest statistics
//!
//! This module provides the counters trails update while they run, and
//! statistics computed from an existing store.

use crate::state::Classification;
use crate::storage::{load_records, StorageResult};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every trail of a run
#[derive(Debug, Default)]
pub struct HarvestStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    lookups: AtomicU64,
    lookup_failures: AtomicU64,
    memo_hits: AtomicU64,
    duplicates_skipped: AtomicU64,
    records_saved: AtomicU64,
}

/// Point-in-time copy of [`HarvestStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub lookups: u64,
    pub lookup_failures: u64,
    pub memo_hits: u64,
    pub duplicates_skipped: u64,
    pub records_saved: u64,
}

impl HarvestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self, failed: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.lookup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_memo_hit(&self) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_saved(&self) {
        self.records_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            records_saved: self.records_saved.load(Ordering::Relaxed),
        }
    }
}

/// Statistics of the records already in a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    pub total_records: u64,
    pub known: u64,
    pub unknown: u64,
    pub distinct_words: u64,
}

/// Loads statistics from an existing CSV store
///
/// # Arguments
///
/// * `path` - Path to the CSV store
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully read the store
/// * `Err(StorageError)` - The store could not be read
pub fn load_store_statistics(path: &Path) -> StorageResult<StoreStatistics> {
    let records = load_records(path)?;

    let mut stats = StoreStatistics::default();
    let mut words = HashSet::new();
    for record in &records {
        stats.total_records += 1;
        match record.classification {
            Classification::Known => stats.known += 1,
            Classification::Unknown => stats.unknown += 1,
        }
        words.insert(record.slang_word.as_str());
    }
    stats.distinct_words = words.len() as u64;

    Ok(stats)
}

/// Prints store statistics to stdout
pub fn print_store_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");
    println!("  Records: {}", stats.total_records);
    println!("  Distinct words: {}", stats.distinct_words);

    for (label, count) in [("Known (N)", stats.known), ("Unknown (U)", stats.unknown)] {
        let share = if stats.total_records > 0 {
            (count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, share);
    }
}

/// Prints the end-of-run tally to stdout
pub fn print_harvest_tally(stats: &StatsSnapshot) {
    println!("=== Harvest Tally ===\n");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Lookups: {}", stats.lookups);
    println!("  Lookup failures: {}", stats.lookup_failures);
    println!("  Memo hits: {}", stats.memo_hits);
    println!("  Duplicate sentences skipped: {}", stats.duplicates_skipped);
    println!("  Records saved: {}", stats.records_saved);
}
