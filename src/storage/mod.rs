//! Storage module for persisting harvested records
//!
//! This module handles the output store, including:
//! - Creating the CSV file with its header row
//! - Resuming an existing file: replaying sentences and classifications and
//!   continuing the id sequence
//! - Serializing appends through a single writer task

mod csv_store;
mod traits;
mod writer;

pub use csv_store::{load_records, CsvStore, StoredRecord, HEADER};
pub use traits::{RecordSink, StorageError, StorageResult};
pub use writer::{StoreHandle, StoreWriter};

use crate::state::HarvestState;
use std::path::Path;

/// Opens the store and starts its writer task
///
/// # Arguments
///
/// * `path` - Path to the CSV file
/// * `state` - Shared dedup and memo state, filled from existing rows
///
/// # Returns
///
/// * `Ok((StoreHandle, StoreWriter, u64))` - Handle for trails, the writer task and
///   the next id that will be assigned
/// * `Err(StorageError)` - Failed to prepare the store
pub fn open_store(
    path: &Path,
    state: &HarvestState,
) -> StorageResult<(StoreHandle, StoreWriter, u64)> {
    let store = CsvStore::initialize(path, state)?;
    let next_id = store.next_id();
    let (handle, writer) = StoreWriter::spawn(store);
    Ok((handle, writer, next_id))
}
