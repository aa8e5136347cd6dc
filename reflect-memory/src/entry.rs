//! The memory entry type shared by every memory sink implementation.

use chrono::{DateTime, Utc};
use reflect_core::AgentId;
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, MemoryResult};

/// A single piece of captured context: a cycle summary, an observation
/// digest, or any other text an agent wants to recall later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    created_at: DateTime<Utc>,
    agent_id: AgentId,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl MemoryEntry {
    /// Creates a builder seeded with the producing agent and entry content.
    #[must_use]
    pub fn builder(agent_id: AgentId, content: impl Into<String>) -> MemoryEntryBuilder {
        MemoryEntryBuilder {
            created_at: Utc::now(),
            agent_id,
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Returns when the entry was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the agent that produced the entry.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Returns the entry's textual content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the entry's tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Builder for [`MemoryEntry`].
#[derive(Debug)]
pub struct MemoryEntryBuilder {
    created_at: DateTime<Utc>,
    agent_id: AgentId,
    content: String,
    tags: Vec<String>,
}

impl MemoryEntryBuilder {
    /// Overrides the creation timestamp; defaults to the current time.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Adds a single tag after validating that it is not empty.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::InvalidRecord`] when the tag is empty or whitespace.
    pub fn tag(mut self, tag: impl Into<String>) -> MemoryResult<Self> {
        let value = tag.into();
        if value.trim().is_empty() {
            return Err(MemoryError::InvalidRecord("memory tags must not be empty"));
        }
        self.tags.push(value);
        Ok(self)
    }

    /// Extends the entry with multiple tags.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::InvalidRecord`] if any supplied tag is empty.
    pub fn tags<I, S>(mut self, tags: I) -> MemoryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self = self.tag(tag)?;
        }
        Ok(self)
    }

    /// Finalises the builder and produces the entry.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::InvalidRecord`] when the content is empty.
    pub fn build(self) -> MemoryResult<MemoryEntry> {
        if self.content.trim().is_empty() {
            return Err(MemoryError::InvalidRecord(
                "memory entry content must not be empty",
            ));
        }
        Ok(MemoryEntry {
            created_at: self.created_at,
            agent_id: self.agent_id,
            content: self.content,
            tags: self.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_content() {
        let err = MemoryEntry::builder(AgentId::random(), "   ")
            .build()
            .expect_err("blank content should fail");
        assert!(matches!(err, MemoryError::InvalidRecord(_)));
    }

    #[test]
    fn builder_rejects_empty_tags() {
        let err = MemoryEntry::builder(AgentId::random(), "content")
            .tag("")
            .expect_err("empty tag should fail");
        assert!(matches!(err, MemoryError::InvalidRecord(_)));
    }

    #[test]
    fn builder_constructs_entry() {
        let agent_id = AgentId::random();
        let entry = MemoryEntry::builder(agent_id, "deployed v1.2.3")
            .tag("cycle-summary")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(entry.agent_id(), agent_id);
        assert_eq!(entry.content(), "deployed v1.2.3");
        assert_eq!(entry.tags(), ["cycle-summary"]);
    }
}
