use kubedeck_logs::{LogBuffer, LogViewport};
use kubedeck_types::PodRef;

use crate::app::Action;
use crate::tui::Scroll;

/// The log tail of one container
#[derive(Debug, Default)]
pub struct LogView {
    target: Option<PodRef>,
    buffer: LogBuffer,
    viewport: LogViewport,
    ended: bool,
}

impl LogView {
    pub fn new(height: usize) -> Self {
        Self {
            viewport: LogViewport::new(height),
            ..Self::default()
        }
    }

    /// Start over for a new target, keeping the viewport height
    pub fn reset(&mut self, target: PodRef) {
        self.target = Some(target);
        self.buffer.clear();
        self.viewport = LogViewport::new(self.viewport.height());
        self.ended = false;
    }

    /// Append a line, following the output if the bottom was in view
    pub fn push_line(&mut self, line: String) {
        let was_at_bottom = self.viewport.at_bottom(self.buffer.len());
        self.buffer.push(line);
        self.viewport.after_append(was_at_bottom, self.buffer.len());
    }

    /// The stream has ended; no more lines will arrive
    pub fn mark_ended(&mut self) {
        self.ended = true;
    }

    pub fn handle(&mut self, action: Action) -> bool {
        let len = self.buffer.len();
        match action {
            Action::Up => self.viewport.scroll_up(1),
            Action::Down => self.viewport.scroll_down(1, len),
            Action::PageUp => self.viewport.page_up(),
            Action::PageDown => self.viewport.page_down(len),
            Action::Top => self.viewport.scroll_to_top(),
            Action::Bottom | Action::Follow => self.viewport.scroll_to_bottom(len),
            _ => return false,
        }
        true
    }

    /// Move the view by `lines`, as a mouse wheel does
    pub fn scroll(&mut self, scroll: Scroll, lines: usize) {
        match scroll {
            Scroll::Up => self.viewport.scroll_up(lines),
            Scroll::Down => self.viewport.scroll_down(lines, self.buffer.len()),
        }
    }

    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_height(height, self.buffer.len());
    }

    pub fn target(&self) -> Option<&PodRef> {
        self.target.as_ref()
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn viewport(&self) -> &LogViewport {
        &self.viewport
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Whether new lines scroll into view
    pub fn is_following(&self) -> bool {
        self.viewport.at_bottom(self.buffer.len())
    }

    /// Lines currently on screen
    pub fn visible_lines(&self) -> impl Iterator<Item = &str> {
        let range = self.viewport.visible_range(self.buffer.len());
        self.buffer.range(range.start, range.len())
    }
}
