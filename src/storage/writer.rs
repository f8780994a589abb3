//! Single-writer actor for the CSV store
//!
//! All appends flow through one blocking task that owns the [`CsvStore`] and
//! its id counter. Trails hold cheap [`StoreHandle`] clones and wait for an
//! acknowledgement carrying the assigned id.

use crate::state::Classification;
use crate::storage::csv_store::CsvStore;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Pending append requests buffered before trails start waiting
const QUEUE_DEPTH: usize = 256;

struct AppendRequest {
    word: String,
    sentence: String,
    classification: Classification,
    reply: oneshot::Sender<StorageResult<u64>>,
}

/// Cloneable sender side of the store writer
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<AppendRequest>,
    path: PathBuf,
}

impl StoreHandle {
    /// Location of the underlying CSV file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl RecordSink for StoreHandle {
    async fn append(
        &self,
        word: &str,
        sentence: &str,
        classification: Classification,
    ) -> StorageResult<u64> {
        let (reply, response) = oneshot::channel();
        let request = AppendRequest {
            word: word.to_string(),
            sentence: sentence.to_string(),
            classification,
            reply,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| StorageError::WriterClosed("writer task has stopped".to_string()))?;

        response
            .await
            .map_err(|_| StorageError::WriterClosed("writer dropped the request".to_string()))?
    }
}

/// The running writer task
pub struct StoreWriter {
    task: JoinHandle<u64>,
}

impl StoreWriter {
    /// Moves the store onto a dedicated blocking task and returns a handle to it
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: CsvStore) -> (StoreHandle, StoreWriter) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let path = store.path().to_path_buf();
        let task = tokio::task::spawn_blocking(move || writer_loop(store, rx));

        (StoreHandle { tx, path }, StoreWriter { task })
    }

    /// Waits for the writer to drain and stop
    ///
    /// The writer stops once every [`StoreHandle`] has been dropped.
    ///
    /// # Returns
    ///
    /// The number of records written during this run
    pub async fn finish(self) -> StorageResult<u64> {
        self.task
            .await
            .map_err(|e| StorageError::WriterClosed(format!("writer task failed: {}", e)))
    }
}

fn writer_loop(mut store: CsvStore, mut rx: mpsc::Receiver<AppendRequest>) -> u64 {
    let mut written = 0u64;
    let mut failure: Option<String> = None;

    while let Some(request) = rx.blocking_recv() {
        if let Some(reason) = &failure {
            let _ = request
                .reply
                .send(Err(StorageError::WriterClosed(reason.clone())));
            continue;
        }

        let result = store
            .append(&request.word, &request.sentence, request.classification)
            .map(|record| record.id);

        match &result {
            Ok(id) => {
                written += 1;
                tracing::info!(
                    "Saved: ID {} -> {:?}: {:?} [{}]",
                    id,
                    request.word,
                    request.sentence,
                    request.classification
                );
            }
            Err(e) => {
                tracing::error!("Write to {} failed: {}", store.path().display(), e);
                failure = Some(format!("earlier write failed: {}", e));
            }
        }

        // The requesting trail may have been aborted; the row is already on disk.
        let _ = request.reply.send(result);
    }

    written
}
