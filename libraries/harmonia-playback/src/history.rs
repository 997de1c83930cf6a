//! Recently-played history
//!
//! Bounded ring buffer of the tracks the player has loaded, most recent last.

use std::collections::VecDeque;

/// History with bounded size
///
/// Implements a ring buffer that automatically discards oldest entries.
#[derive(Debug, Clone)]
pub struct History<T> {
    /// History buffer (most recent = back)
    entries: VecDeque<T>,

    /// Maximum history size
    max_size: usize,
}

impl<T> History<T> {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Add an entry, discarding the oldest when full
    pub fn push(&mut self, entry: T) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent entry
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Entries, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<T: Clone> History<T> {
    /// Copy of the entries, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(50)
    }
}
