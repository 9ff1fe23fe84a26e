// Repository trait for reading persistence
use crate::domain::reading::{Reading, ReadingId};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Durably append one reading
    async fn append(&self, reading: Reading) -> StoreResult<()>;

    /// The `n` most recent readings, oldest of the window first
    async fn latest(&self, n: usize) -> StoreResult<Vec<Reading>>;

    /// Every stored reading, newest first
    async fn all(&self) -> StoreResult<Vec<Reading>>;

    /// Remove one reading; `false` when no reading had that id
    async fn delete_one(&self, id: &ReadingId) -> StoreResult<bool>;

    /// Remove every reading, returning how many were removed
    async fn delete_all(&self) -> StoreResult<usize>;

    async fn len(&self) -> StoreResult<usize>;
}

/// Order `(sequence, reading)` pairs newest first.
///
/// Readings are ranked by timestamp; equal timestamps fall back to append
/// order so the most recently appended wins.
pub(crate) fn sort_newest_first(entries: &mut [(u64, Reading)]) {
    entries.sort_by(|(seq_a, a), (seq_b, b)| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| seq_b.cmp(seq_a))
    });
}

/// Top `n` by descending timestamp, then reversed into ascending order
pub(crate) fn latest_window(mut entries: Vec<(u64, Reading)>, n: usize) -> Vec<Reading> {
    sort_newest_first(&mut entries);
    entries.truncate(n);
    entries.reverse();
    entries.into_iter().map(|(_, reading)| reading).collect()
}

pub(crate) fn newest_first(mut entries: Vec<(u64, Reading)>) -> Vec<Reading> {
    sort_newest_first(&mut entries);
    entries.into_iter().map(|(_, reading)| reading).collect()
}
