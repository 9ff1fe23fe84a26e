// JSON-lines file store - durable reading persistence without an external database
use crate::application::reading_store::{
    latest_window, newest_first, ReadingStore, StoreError, StoreResult,
};
use crate::domain::reading::{Reading, ReadingId};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Entries {
    next_sequence: u64,
    readings: Vec<(u64, Reading)>,
}

/// Each reading is one JSON line in the file. Appends write a single line;
/// deletes rewrite the file through a temporary sibling and a rename. The
/// in-memory index is only updated after the file write succeeds.
#[derive(Debug)]
pub struct FileReadingStore {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl FileReadingStore {
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(StoreError::Unavailable(format!(
                "{} is a directory",
                path.display()
            )));
        }

        let mut entries = Entries::default();
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let complete = repair_tail(&path, &content).await?;
                for (line_no, line) in content[..complete].lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Reading>(line) {
                        Ok(reading) => {
                            entries.readings.push((entries.next_sequence, reading));
                            entries.next_sequence += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Skipping unreadable line {} in {}: {}",
                                line_no + 1,
                                path.display(),
                                e
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Io(e)),
        }

        tracing::info!(
            "Opened reading store {} with {} readings",
            path.display(),
            entries.readings.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn rewrite(&self, readings: &[(u64, Reading)]) -> StoreResult<()> {
        let mut buffer = String::new();
        for (_, reading) in readings {
            buffer.push_str(&serde_json::to_string(reading)?);
            buffer.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, buffer).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Make sure the next append starts on a fresh line. A last line without a
/// newline is kept if it parses and cut off otherwise. Returns the length of
/// `content` that holds complete lines.
async fn repair_tail(path: &Path, content: &str) -> StoreResult<usize> {
    if content.is_empty() || content.ends_with('\n') {
        return Ok(content.len());
    }

    let tail_start = content.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let tail = &content[tail_start..];
    if serde_json::from_str::<Reading>(tail).is_ok() {
        let mut file = OpenOptions::new().append(true).open(path).await?;
        write_line(&mut file, b"\n").await?;
        return Ok(content.len());
    }

    tracing::warn!(
        "Discarding {} bytes of incomplete trailing data in {}",
        tail.len(),
        path.display()
    );
    let file = OpenOptions::new().write(true).open(path).await?;
    file.set_len(tail_start as u64).await?;
    Ok(tail_start)
}

async fn write_line(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

#[async_trait]
impl ReadingStore for FileReadingStore {
    async fn append(&self, reading: Reading) -> StoreResult<()> {
        let mut line = serde_json::to_string(&reading)?;
        line.push('\n');

        let mut entries = self.entries.write().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let start_len = file.metadata().await?.len();
        if let Err(e) = write_line(&mut file, line.as_bytes()).await {
            if let Err(rollback) = file.set_len(start_len).await {
                tracing::warn!(
                    "Failed to roll back partial append to {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(StoreError::Io(e));
        }

        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries.readings.push((sequence, reading));
        Ok(())
    }

    async fn latest(&self, n: usize) -> StoreResult<Vec<Reading>> {
        let entries = self.entries.read().await;
        Ok(latest_window(entries.readings.clone(), n))
    }

    async fn all(&self) -> StoreResult<Vec<Reading>> {
        let entries = self.entries.read().await;
        Ok(newest_first(entries.readings.clone()))
    }

    async fn delete_one(&self, id: &ReadingId) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        if !entries.readings.iter().any(|(_, reading)| &reading.id == id) {
            return Ok(false);
        }

        let remaining: Vec<(u64, Reading)> = entries
            .readings
            .iter()
            .filter(|(_, reading)| &reading.id != id)
            .cloned()
            .collect();
        self.rewrite(&remaining).await?;
        entries.readings = remaining;
        Ok(true)
    }

    async fn delete_all(&self) -> StoreResult<usize> {
        let mut entries = self.entries.write().await;
        self.rewrite(&[]).await?;
        let removed = entries.readings.len();
        entries.readings.clear();
        Ok(removed)
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().await.readings.len())
    }
}
