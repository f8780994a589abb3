//! Crawler module for harvesting slang sentences
//!
//! This module contains the core harvesting logic, including:
//! - HTTP page fetching and entry extraction
//! - Word classification against the lexical authority
//! - Crawl trails that follow "next" links
//! - Trail scheduling across a bounded worker pool
//! - Overall run coordination

mod classifier;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod trail;

pub use classifier::{reports_no_results, Classifier, LexicalAuthorityClassifier, LookupOutcome};
pub use coordinator::{run_harvest, HarvestSummary, Harvester};
pub use fetcher::{build_http_client, fetch_page, FetchOutcome, HttpPageFetcher, PageSource};
pub use parser::{parse_page, PageEntry, ParsedPage};
pub use scheduler::{ScheduleReport, TrailFailure, TrailScheduler};
pub use trail::{run_trail, TrailContext, TrailCursor, TrailReport};
