//! Durable append-only journal implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::entry::MemoryEntry;
use crate::error::MemoryResult;

/// Trait implemented by durable journals.
#[async_trait]
pub trait Journal: Send + Sync {
    /// Appends an entry to the journal.
    async fn append(&self, entry: &MemoryEntry) -> MemoryResult<()>;

    /// Returns the most recent `limit` entries, ordered oldest to newest.
    async fn tail(&self, limit: usize) -> MemoryResult<Vec<MemoryEntry>>;

    /// Clears the journal contents.
    async fn clear(&self) -> MemoryResult<()>;
}

/// File-backed journal writing newline-delimited JSON entries.
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl FileJournal {
    /// Opens (or creates) a journal file at the provided path.
    ///
    /// # Errors
    ///
    /// Propagates I/O and serialization errors encountered while preparing the
    /// file.
    pub async fn open(path: impl Into<PathBuf>) -> MemoryResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the underlying path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Journal for FileJournal {
    async fn append(&self, entry: &MemoryEntry) -> MemoryResult<()> {
        let line = serde_json::to_vec(entry)?;
        let mut guard = self.file.lock().await;
        guard.write_all(&line).await?;
        guard.write_u8(b'\n').await?;
        guard.flush().await?;
        Ok(())
    }

    async fn tail(&self, limit: usize) -> MemoryResult<Vec<MemoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).await?;
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for chunk in data
            .split(|byte| *byte == b'\n')
            .filter(|chunk| !chunk.is_empty())
        {
            let entry: MemoryEntry = serde_json::from_slice(chunk)?;
            entries.push(entry);
        }

        if entries.len() <= limit {
            return Ok(entries);
        }

        let skip = entries.len() - limit;
        Ok(entries.into_iter().skip(skip).collect())
    }

    async fn clear(&self) -> MemoryResult<()> {
        let mut guard = self.file.lock().await;
        guard.rewind().await?;
        guard.set_len(0).await?;
        guard.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflect_core::AgentId;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("reflect-memory-journal-{}.log", Uuid::new_v4()));
        path
    }

    #[tokio::test]
    async fn append_and_tail_roundtrip() {
        let path = temp_path();
        let journal = FileJournal::open(&path).await.unwrap();
        let agent_id = AgentId::random();

        for content in ["one", "two", "three"] {
            let entry = MemoryEntry::builder(agent_id, content).build().unwrap();
            journal.append(&entry).await.unwrap();
        }

        let tail = journal.tail(2).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content(), "two");
        assert_eq!(tail[1].content(), "three");

        journal.clear().await.unwrap();
        let empty = journal.tail(10).await.unwrap();
        assert!(empty.is_empty());

        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}
