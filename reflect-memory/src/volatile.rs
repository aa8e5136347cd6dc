//! In-memory volatile store backed by a bounded ring buffer.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use tokio::sync::RwLock;

use crate::entry::MemoryEntry;

/// Configuration for the volatile memory buffer.
#[derive(Debug, Clone, Copy)]
pub struct VolatileConfig {
    capacity: NonZeroUsize,
    max_total_bytes: Option<NonZeroUsize>,
}

impl VolatileConfig {
    /// Creates a configuration with the provided capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            max_total_bytes: None,
        }
    }

    /// Sets the optional total byte ceiling for the buffer.
    #[must_use]
    pub fn with_max_total_bytes(mut self, max_total_bytes: NonZeroUsize) -> Self {
        self.max_total_bytes = Some(max_total_bytes);
        self
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(self) -> NonZeroUsize {
        self.capacity
    }

    /// Returns the maximum total bytes, if configured.
    #[must_use]
    pub const fn max_total_bytes(self) -> Option<NonZeroUsize> {
        self.max_total_bytes
    }
}

impl Default for VolatileConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(256).expect("non-zero"),
            max_total_bytes: None,
        }
    }
}

#[derive(Debug, Default)]
struct VolatileInner {
    entries: VecDeque<MemoryEntry>,
    total_bytes: usize,
}

/// Volatile memory ring retaining the most recent entries.
#[derive(Debug)]
pub struct VolatileMemory {
    config: VolatileConfig,
    inner: RwLock<VolatileInner>,
}

impl VolatileMemory {
    /// Creates a new buffer using the supplied configuration.
    #[must_use]
    pub fn new(config: VolatileConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(VolatileInner {
                entries: VecDeque::with_capacity(config.capacity().get()),
                total_bytes: 0,
            }),
        }
    }

    /// Inserts an entry, evicting the oldest entries if capacity constraints are exceeded.
    pub async fn push(&self, entry: MemoryEntry) {
        let mut guard = self.inner.write().await;
        guard.total_bytes += entry.content().len();
        guard.entries.push_back(entry);

        while guard.entries.len() > self.config.capacity().get() {
            if let Some(evicted) = guard.entries.pop_front() {
                guard.total_bytes = guard.total_bytes.saturating_sub(evicted.content().len());
            }
        }

        if let Some(limit) = self.config.max_total_bytes() {
            let limit = limit.get();
            while guard.total_bytes > limit && guard.entries.len() > 1 {
                if let Some(evicted) = guard.entries.pop_front() {
                    guard.total_bytes = guard.total_bytes.saturating_sub(evicted.content().len());
                }
            }
        }
    }

    /// Returns the most recent entries up to the requested limit, newest last.
    #[must_use]
    pub async fn recent(&self, limit: usize) -> Vec<MemoryEntry> {
        let guard = self.inner.read().await;
        let take = limit.min(guard.entries.len());
        guard
            .entries
            .iter()
            .rev()
            .take(take)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Naive substring search over recent entries, newest first.
    ///
    /// This is intentionally not an index: it is a convenience for the
    /// reflection loop's own "recent context" lookups, not a production
    /// search surface.
    #[must_use]
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<MemoryEntry> {
        if top_k == 0 {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let guard = self.inner.read().await;
        guard
            .entries
            .iter()
            .rev()
            .filter(|entry| needle.is_empty() || entry.content().to_lowercase().contains(&needle))
            .take(top_k)
            .cloned()
            .collect()
    }

    /// Returns statistics about the buffer utilisation.
    #[must_use]
    pub async fn stats(&self) -> VolatileStats {
        let guard = self.inner.read().await;
        VolatileStats {
            entries: guard.entries.len(),
            total_bytes: guard.total_bytes,
            capacity: self.config.capacity().get(),
            max_total_bytes: self.config.max_total_bytes().map(NonZeroUsize::get),
        }
    }
}

/// Snapshot describing utilisation of the volatile buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatileStats {
    /// Entries currently stored in the buffer.
    pub entries: usize,
    /// Accumulated payload bytes currently retained.
    pub total_bytes: usize,
    /// Maximum number of entries permitted.
    pub capacity: usize,
    /// Optional total byte limit when configured.
    pub max_total_bytes: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflect_core::AgentId;

    fn entry(content: &str) -> MemoryEntry {
        MemoryEntry::builder(AgentId::random(), content).build().unwrap()
    }

    #[tokio::test]
    async fn respects_capacity() {
        let config = VolatileConfig::new(NonZeroUsize::new(2).unwrap());
        let memory = VolatileMemory::new(config);

        memory.push(entry("one")).await;
        memory.push(entry("two")).await;
        memory.push(entry("three")).await;

        let recent = memory.recent(10).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content(), "two");
        assert_eq!(recent[1].content(), "three");
    }

    #[tokio::test]
    async fn respects_total_byte_limit() {
        let config = VolatileConfig::new(NonZeroUsize::new(10).unwrap())
            .with_max_total_bytes(NonZeroUsize::new(8).unwrap());
        let memory = VolatileMemory::new(config);

        for value in ["aaaa", "bbbb", "cccc"] {
            memory.push(entry(value)).await;
        }

        let stats = memory.stats().await;
        assert!(stats.total_bytes <= 8 || stats.entries == 1);
    }

    #[tokio::test]
    async fn search_matches_newest_first() {
        let memory = VolatileMemory::new(VolatileConfig::default());
        memory.push(entry("ci pipeline is slow")).await;
        memory.push(entry("host disk is fine")).await;
        memory.push(entry("ci pipeline recovered")).await;

        let hits = memory.search("ci", 10).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content(), "ci pipeline recovered");
    }
}
