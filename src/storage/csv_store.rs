//! CSV store implementation
//!
//! The store is a plain CSV file with the header `id,slang_word,sentence,type`.
//! Existing rows are never rewritten: the file is only ever opened for append.

use crate::state::{Classification, HarvestState};
use crate::storage::traits::{StorageError, StorageResult};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names written as the first row of a new store
pub const HEADER: [&str; 4] = ["id", "slang_word", "sentence", "type"];

/// One persisted row of the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub slang_word: String,
    pub sentence: String,
    #[serde(rename = "type")]
    pub classification: Classification,
}

/// Append-only CSV store
pub struct CsvStore {
    path: PathBuf,
    writer: Writer<File>,
    next_id: u64,
}

impl CsvStore {
    /// Opens the store at `path`, creating it if needed
    ///
    /// A missing or empty file gets a fresh header and starts at id 1. An
    /// existing file is read back: every sentence and word classification is
    /// replayed into `state`, and ids continue after the existing rows.
    ///
    /// # Returns
    ///
    /// * `Ok(CsvStore)` - Store ready for appends
    /// * `Err(StorageError)` - The directory or file could not be prepared, or an
    ///   existing row could not be parsed
    pub fn initialize(path: &Path, state: &HarvestState) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let existing_len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let next_id = if existing_len == 0 {
            1
        } else {
            let records = load_records(path)?;
            for record in &records {
                state.replay(&record.slang_word, &record.sentence, record.classification);
            }
            tracing::info!(
                "Resuming store {} with {} existing records",
                path.display(),
                records.len()
            );
            records.len() as u64 + 1
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if existing_len == 0 {
            writer.write_record(HEADER)?;
            writer.flush()?;
            writer.get_ref().sync_data()?;
            tracing::info!("Created store {}", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            next_id,
        })
    }

    /// Wraps an already-open file without reading or writing a header
    #[cfg(test)]
    pub(crate) fn from_file(path: PathBuf, file: File, next_id: u64) -> Self {
        Self {
            path,
            writer: WriterBuilder::new().has_headers(false).from_writer(file),
            next_id,
        }
    }

    /// Id the next appended record will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one record and syncs it to disk
    ///
    /// The id counter only moves after the row is durable, so a failed write
    /// never leaves a gap.
    pub fn append(
        &mut self,
        word: &str,
        sentence: &str,
        classification: Classification,
    ) -> StorageResult<StoredRecord> {
        let record = StoredRecord {
            id: self.next_id,
            slang_word: word.to_string(),
            sentence: sentence.to_string(),
            classification,
        };

        self.writer.serialize(&record)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.next_id += 1;

        Ok(record)
    }
}

/// Reads every record of an existing store
///
/// An empty file holds no records, the same as a store that was never written.
pub fn load_records(path: &Path) -> StorageResult<Vec<StoredRecord>> {
    if fs::metadata(path)?.len() == 0 {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(StorageError::InvalidRecord(format!(
            "unexpected header in {}: {:?}",
            path.display(),
            headers
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
