// ── Filter view over the line buffer ──
//
// Pure projection used on every render: the buffer is never touched.

use crate::buffer::LineBuffer;
use crate::sanitize::LogLine;

/// Case-insensitive substring predicate. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    needle: String,
}

impl LineFilter {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    /// Matches every line.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// The normalized (trimmed, lower-cased) predicate text.
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, line: &str) -> bool {
        self.needle.is_empty() || line.to_lowercase().contains(&self.needle)
    }
}

impl From<&str> for LineFilter {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Lines of `buffer` accepted by `filter`, oldest first.
///
/// The iterator is lazy and `Clone`, so it can be restarted freely.
pub fn visible<'a>(
    buffer: &'a LineBuffer,
    filter: &'a LineFilter,
) -> impl Iterator<Item = &'a LogLine> + Clone + 'a {
    buffer.iter().filter(move |line| filter.matches(line))
}

/// Number of lines [`visible`] would yield.
pub fn count_visible(buffer: &LineBuffer, filter: &LineFilter) -> usize {
    if filter.is_empty() {
        buffer.len()
    } else {
        visible(buffer, filter).count()
    }
}
