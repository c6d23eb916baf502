use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
/// Top and bottom border of a bordered block
const BORDER_ROWS: u16 = 2;
const TABLE_HEADER_ROWS: u16 = 1;

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Centered popup for the error banner
    pub fn banner(area: Rect) -> Rect {
        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(7),
                Constraint::Fill(1),
            ])
            .split(area);

        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(60),
                Constraint::Percentage(20),
            ])
            .split(vertical[1]);

        horizontal[1]
    }

    /// Table rows visible in a terminal `height` rows tall
    pub fn table_rows(height: u16) -> u16 {
        Self::log_rows(height).saturating_sub(TABLE_HEADER_ROWS)
    }

    /// Log lines visible in a terminal `height` rows tall
    pub fn log_rows(height: u16) -> u16 {
        height.saturating_sub(HEADER_HEIGHT + STATUS_HEIGHT + BORDER_ROWS)
    }
}
