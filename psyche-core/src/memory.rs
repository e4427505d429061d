//! Conversation memory — "What was said".
//!
//! A bounded, append-only log of `Speaker:"utterance"` records. Once the
//! configured capacity is exceeded the oldest records are evicted from the
//! head, strictly first-in first-out.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Bounded FIFO log of dialogue lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMemory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ConversationMemory {
    /// Create an empty memory holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Append `Speaker:"utterance"` and evict from the head past capacity.
    ///
    /// Returns the number of records evicted.
    pub fn record(&mut self, speaker: &str, utterance: &str) -> usize {
        self.entries.push_back(format!("{speaker}:\"{utterance}\""));

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.entries.pop_front() {
                trace!(entry = %oldest, "Evicted conversation record");
                evicted += 1;
            }
        }
        evicted
    }

    /// Records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The whole log, one record per line.
    #[must_use]
    pub fn log(&self) -> String {
        self.entries.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }

    /// The most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded (or everything was evicted).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured maximum.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
