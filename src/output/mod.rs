//! Output module for reporting harvest results
//!
//! This module handles:
//! - Live counters shared by all trails
//! - The end-of-run tally
//! - Statistics of an existing store

pub mod stats;

pub use stats::{
    load_store_statistics, print_harvest_tally, print_store_statistics, HarvestStats,
    StatsSnapshot, StoreStatistics,
};
