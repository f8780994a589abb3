//! State module for sharing harvest progress between trails
//!
//! # Components
//!
//! - `Classification`: Known (`N`) or Unknown (`U`) to the lexical authority
//! - `SeenSentences`: sentences already persisted, used to deduplicate
//! - `WordMemo`: cache of classified words so each word is looked up once
//! - `HarvestState`: both of the above, shared behind an `Arc`

mod classification;
mod harvest_state;

// Re-export main types
pub use classification::Classification;
pub use harvest_state::{HarvestState, SeenSentences, WordMemo};
