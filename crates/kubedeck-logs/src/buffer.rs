use std::collections::VecDeque;

/// Lines kept per log view
pub const LOG_BUFFER_CAPACITY: usize = 1000;

/// Ring buffer of log lines, oldest evicted first
#[derive(Clone, Debug)]
pub struct LogBuffer {
    /// Internal storage
    lines: VecDeque<String>,

    /// Maximum capacity
    capacity: usize,

    /// Lines dropped from the front since creation
    evicted: u64,
}

impl LogBuffer {
    /// Create a new log buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Push a new line, evicting oldest if at capacity
    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            self.evicted += 1;
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line);
    }

    /// Total line count
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines evicted to make room for newer output
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Get lines in a range (for virtual scrolling)
    pub fn range(&self, start: usize, count: usize) -> impl Iterator<Item = &str> {
        self.lines.iter().skip(start).take(count).map(String::as_str)
    }

    /// Clear all lines
    pub fn clear(&mut self) {
        self.lines.clear();
        self.evicted = 0;
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_BUFFER_CAPACITY)
    }
}
