use crate::state::Classification;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Sentences already persisted to the store
///
/// Claiming a sentence is the only authorization to persist a record for it,
/// so two trails can never write the same sentence.
#[derive(Debug, Default)]
pub struct SeenSentences {
    inner: Mutex<HashSet<String>>,
}

impl SeenSentences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the sentence if it was not seen before
    ///
    /// # Returns
    ///
    /// * `true` - The caller now owns the sentence and must persist it
    /// * `false` - The sentence is a duplicate and must be skipped
    pub fn claim(&self, sentence: &str) -> bool {
        let mut seen = lock(&self.inner);
        if seen.contains(sentence) {
            return false;
        }
        seen.insert(sentence.to_string())
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache of words already classified
#[derive(Debug, Default)]
pub struct WordMemo {
    inner: Mutex<HashMap<String, Classification>>,
}

impl WordMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached classification for a word, if any
    pub fn get(&self, word: &str) -> Option<Classification> {
        lock(&self.inner).get(word).copied()
    }

    /// Stores a classification for a word
    ///
    /// Two trails that raced on the same miss both land here; the last write wins.
    pub fn put(&self, word: &str, classification: Classification) {
        lock(&self.inner).insert(word.to_string(), classification);
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide dedup and memo state shared by every trail
///
/// The two halves are locked independently so that a memo lookup never waits
/// on a sentence claim and vice versa.
#[derive(Debug, Default)]
pub struct HarvestState {
    pub sentences: SeenSentences,
    pub memo: WordMemo,
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`SeenSentences::claim`]
    pub fn claim_sentence(&self, sentence: &str) -> bool {
        self.sentences.claim(sentence)
    }

    /// Returns the memoized classification of a word
    pub fn get_or_none(&self, word: &str) -> Option<Classification> {
        self.memo.get(word)
    }

    pub fn put(&self, word: &str, classification: Classification) {
        self.memo.put(word, classification);
    }

    /// Replays one persisted record into both halves (used when resuming a store)
    pub fn replay(&self, word: &str, sentence: &str, classification: Classification) {
        self.sentences.claim(sentence);
        self.memo.put(word, classification);
    }
}

/// Locks a mutex, recovering the data if a panicking trail poisoned it
///
/// Both guarded collections stay consistent after any single insert, so a
/// poisoned lock carries no torn state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
