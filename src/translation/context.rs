/*!
 * Sliding window of previously processed source lines.
 *
 * The window holds the last `capacity` source texts of the file being
 * translated, oldest first. It is reset at every file boundary, so a file
 * never sees lines from another file.
 */

use std::collections::VecDeque;

/// Bounded history of source lines for context-aware services
#[derive(Debug, Clone)]
pub struct ContextWindow {
    capacity: usize,
    lines: VecDeque<String>,
}

impl ContextWindow {
    /// Create an empty window holding at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    /// Maximum number of lines kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines currently held
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Record a processed source line, evicting the oldest when full
    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// Forget every line; called when a new file starts
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
