//! Capacity-bounded line history.
//!
//! The buffer is the stream's only backpressure on history: when full, the
//! oldest lines are dropped rather than blocking ingestion.

use std::collections::VecDeque;

use crate::sanitize::LogLine;

/// Default number of retained lines.
pub const DEFAULT_CAPACITY: usize = 2000;

/// Ordered sequence of sanitized lines with FIFO eviction.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: VecDeque<LogLine>,
    capacity: usize,
    evicted: u64,
}

impl LineBuffer {
    /// Create a buffer holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Push a line to the end, evicting from the front while over capacity.
    pub fn append(&mut self, line: LogLine) {
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
    }

    /// Copy of every retained line, oldest first, regardless of filters.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.iter().cloned().collect()
    }

    /// Drop all retained lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, LogLine> {
        self.lines.iter()
    }

    /// Most recently appended line.
    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total lines dropped by eviction since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a LineBuffer {
    type Item = &'a LogLine;
    type IntoIter = std::collections::vec_deque::Iter<'a, LogLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
