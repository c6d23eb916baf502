use std::ops::Range;

/// Scroll position of the log view.
///
/// `offset` is the index of the first visible line. The viewport is "at the
/// bottom" when the last line is visible; appends made while at the bottom
/// keep it there, anything else leaves the offset where the user put it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogViewport {
    offset: usize,
    height: usize,
}

impl LogViewport {
    pub fn new(height: usize) -> Self {
        Self { offset: 0, height }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.height)
    }

    /// Whether the last of `len` lines is visible
    pub fn at_bottom(&self, len: usize) -> bool {
        self.offset >= self.max_offset(len)
    }

    /// Update after the content grew to `len` lines
    pub fn after_append(&mut self, was_at_bottom: bool, len: usize) {
        if was_at_bottom {
            self.scroll_to_bottom(len);
        } else {
            self.clamp(len);
        }
    }

    /// Resize, staying pinned to the bottom if we were there
    pub fn set_height(&mut self, height: usize, len: usize) {
        let was_at_bottom = self.at_bottom(len);
        self.height = height;
        self.after_append(was_at_bottom, len);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize, len: usize) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset(len));
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    pub fn page_down(&mut self, len: usize) {
        self.scroll_down(self.height.max(1), len);
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self, len: usize) {
        self.offset = self.max_offset(len);
    }

    fn clamp(&mut self, len: usize) {
        self.offset = self.offset.min(self.max_offset(len));
    }

    /// Indices of the lines currently on screen
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        start..(start + self.height).min(len)
    }
}
