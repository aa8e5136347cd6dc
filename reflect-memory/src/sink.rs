//! The memory sink contract consumed by the reflection loop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entry::MemoryEntry;
use crate::error::MemoryResult;
use crate::journal::Journal;
use crate::volatile::{VolatileConfig, VolatileMemory};

/// Write/search interface for cycle summaries and observation context.
#[async_trait]
pub trait MemorySink: Send + Sync {
    /// Returns up to `top_k` entries matching `query`, most relevant first.
    async fn search(&self, query: &str, top_k: usize) -> MemoryResult<Vec<MemoryEntry>>;

    /// Persists an entry.
    async fn save(&self, entry: MemoryEntry) -> MemoryResult<()>;
}

/// A [`MemorySink`] backed only by the in-process volatile ring.
pub struct VolatileMemorySink {
    volatile: Arc<VolatileMemory>,
}

impl VolatileMemorySink {
    /// Creates a sink around a fresh volatile buffer with the given config.
    #[must_use]
    pub fn new(config: VolatileConfig) -> Self {
        Self {
            volatile: Arc::new(VolatileMemory::new(config)),
        }
    }

    /// Returns the underlying volatile buffer.
    #[must_use]
    pub fn volatile(&self) -> &Arc<VolatileMemory> {
        &self.volatile
    }
}

#[async_trait]
impl MemorySink for VolatileMemorySink {
    async fn search(&self, query: &str, top_k: usize) -> MemoryResult<Vec<MemoryEntry>> {
        Ok(self.volatile.search(query, top_k).await)
    }

    async fn save(&self, entry: MemoryEntry) -> MemoryResult<()> {
        self.volatile.push(entry).await;
        Ok(())
    }
}

/// A [`MemorySink`] that fans writes out to both the volatile ring and a
/// durable journal, but reads only from the ring. The journal exists so a
/// restarted process can replay recent history; it is never searched
/// directly since [`VolatileMemory::search`] is already a linear scan and
/// doubling that work against disk would not improve relevance.
pub struct JournaledMemorySink {
    volatile: Arc<VolatileMemory>,
    journal: Arc<dyn Journal>,
}

impl JournaledMemorySink {
    /// Creates a sink combining a volatile ring and a durable journal.
    #[must_use]
    pub fn new(volatile: Arc<VolatileMemory>, journal: Arc<dyn Journal>) -> Self {
        Self { volatile, journal }
    }

    /// Returns the underlying volatile buffer.
    #[must_use]
    pub fn volatile(&self) -> &Arc<VolatileMemory> {
        &self.volatile
    }

    /// Returns the underlying journal.
    #[must_use]
    pub fn journal(&self) -> &Arc<dyn Journal> {
        &self.journal
    }
}

#[async_trait]
impl MemorySink for JournaledMemorySink {
    async fn search(&self, query: &str, top_k: usize) -> MemoryResult<Vec<MemoryEntry>> {
        Ok(self.volatile.search(query, top_k).await)
    }

    async fn save(&self, entry: MemoryEntry) -> MemoryResult<()> {
        self.volatile.push(entry.clone()).await;
        self.journal.append(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::FileJournal;
    use reflect_core::AgentId;
    use std::num::NonZeroUsize;
    use uuid::Uuid;

    fn temp_path() -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("reflect-memory-sink-{}.log", Uuid::new_v4()));
        path
    }

    #[tokio::test]
    async fn journaled_sink_writes_both_stores() {
        let path = temp_path();
        let journal: Arc<dyn Journal> = Arc::new(FileJournal::open(&path).await.unwrap());
        let volatile = Arc::new(VolatileMemory::new(VolatileConfig::new(
            NonZeroUsize::new(8).unwrap(),
        )));
        let sink = JournaledMemorySink::new(volatile, journal.clone());

        let entry = MemoryEntry::builder(AgentId::random(), "cycle complete")
            .build()
            .unwrap();
        sink.save(entry).await.unwrap();

        let hits = sink.search("cycle", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let tail = journal.tail(10).await.unwrap();
        assert_eq!(tail.len(), 1);

        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}
