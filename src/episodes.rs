//! Episodic event boundary
//!
//! The cognitive subsystem lives outside the core; it supplies raw
//! episodic events consumable as explanation evidence. The core only
//! depends on the recall interface defined here, plus a bounded in-memory
//! reference implementation for tests and simple drivers.

use crate::error::Result;
use crate::ring::RingBuffer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Default capacity of the in-memory episode store
pub const DEFAULT_EPISODE_CAPACITY: usize = 1000;

/// A raw episodic event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Unique episode identifier
    pub id: Uuid,
    /// When the episode was recorded
    pub timestamp: DateTime<Utc>,
    /// Event kind used for exact-match recall
    pub kind: String,
    /// Arbitrary descriptive attributes
    pub attributes: HashMap<String, String>,
}

impl Episode {
    /// Create an episode of the given kind, timestamped now
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind: kind.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add a descriptive attribute (builder style)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Render the episode as an evidence record for explanations
    pub fn as_evidence(&self) -> HashMap<String, String> {
        let mut attrs = self.attributes.clone();
        attrs.insert("source".to_string(), "episode".to_string());
        attrs.insert("kind".to_string(), self.kind.clone());
        attrs.insert("episode_id".to_string(), self.id.to_string());
        attrs
    }
}

/// Trait for episodic event sources
///
/// Recall is by exact kind match and returns the most recent matching
/// episode, or none.
#[cfg_attr(test, mockall::automock)]
pub trait EpisodeSource: Send + Sync {
    /// Store an episode
    fn record(&mut self, episode: Episode);

    /// Most recent episode whose kind matches the query exactly
    fn recall(&self, query: &str) -> Option<Episode>;

    /// Source name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

/// Bounded in-memory episode store
///
/// Episodes beyond capacity are silently discarded oldest-first, matching
/// the memory-bound design of the other session histories.
#[derive(Debug, Clone)]
pub struct MemoryEpisodeStore {
    episodes: RingBuffer<Episode>,
}

impl MemoryEpisodeStore {
    /// Create a store with the default capacity
    pub fn new() -> Self {
        Self {
            episodes: RingBuffer::new_unchecked(DEFAULT_EPISODE_CAPACITY),
        }
    }

    /// Create a store with a custom capacity
    ///
    /// A capacity of zero is rejected as a configuration error.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            episodes: RingBuffer::new(capacity)?,
        })
    }

    /// Number of retained episodes
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    /// Whether the store holds no episodes
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

impl Default for MemoryEpisodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeSource for MemoryEpisodeStore {
    fn record(&mut self, episode: Episode) {
        self.episodes.push(episode);
    }

    fn recall(&self, query: &str) -> Option<Episode> {
        self.episodes.iter().filter(|e| e.kind == query).last().cloned()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
