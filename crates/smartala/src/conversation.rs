//! Bounded history of voice exchanges.
//!
//! The log only feeds context text to the language model; nothing in the
//! crate interprets its contents.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Default number of exchanges retained.
pub const DEFAULT_CAPACITY: usize = 50;

/// One voice exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// When the exchange completed.
    pub timestamp: DateTime<Utc>,
    /// What the user said.
    pub transcription: String,
    /// What the assistant answered.
    #[serde(rename = "response")]
    pub response_text: String,
    /// Where the user was, if known.
    #[serde(rename = "location")]
    pub origin: Option<Coordinate>,
    /// Where the user was heading, if stated.
    #[serde(rename = "destination")]
    pub destination_label: Option<String>,
}

impl ConversationEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(transcription: impl Into<String>, response_text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            transcription: transcription.into(),
            response_text: response_text.into(),
            origin: None,
            destination_label: None,
        }
    }

    /// Attach where the user was.
    #[must_use]
    pub fn with_origin(mut self, origin: Option<Coordinate>) -> Self {
        self.origin = origin;
        self
    }

    /// Attach the stated destination.
    #[must_use]
    pub fn with_destination(mut self, destination: Option<String>) -> Self {
        self.destination_label = destination;
        self
    }
}

/// Append-only log capped at a fixed length, oldest evicted first.
#[derive(Debug)]
pub struct ConversationLog {
    capacity: usize,
    entries: Mutex<VecDeque<ConversationEntry>>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ConversationLog {
    /// Create a log holding [`DEFAULT_CAPACITY`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ConversationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, evicting the oldest ones beyond capacity.
    pub fn append(&self, entry: ConversationEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// The last `n` exchanges as alternating user/assistant lines, oldest first.
    #[must_use]
    pub fn recent_context(&self, n: usize) -> String {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries
            .iter()
            .skip(skip)
            .map(|e| format!("User: {}\nAssistant: {}", e.transcription, e.response_text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Snapshot of all entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ConversationEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
