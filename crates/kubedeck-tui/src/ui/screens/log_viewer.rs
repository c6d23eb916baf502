use ratatui::{
    Frame,
    layout::{Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::ui::Theme;
use crate::views::LogView;

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    pub fn render(frame: &mut Frame, area: Rect, view: &LogView) {
        let lines: Vec<Line> = view
            .visible_lines()
            .map(|line| Line::from(Span::styled(line, Theme::text())))
            .collect();

        let target = view
            .target()
            .map(ToString::to_string)
            .unwrap_or_default();
        let title = format!(" {} ({}) ", target, view.buffer().len());

        let logs_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(logs_widget, area);

        // Render scrollbar
        let total = view.buffer().len();
        let height = view.viewport().height();
        if total > height {
            let max_scroll = total - height;
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));

            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(view.viewport().offset().min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// Right-hand status text for the log view
    pub fn status(view: &LogView) -> String {
        let state = if view.has_ended() {
            "stream ended"
        } else if view.is_following() {
            "following"
        } else {
            "paused"
        };
        let mut status = format!(
            "{state} · {}/{} lines",
            view.buffer().len(),
            view.buffer().capacity()
        );
        let dropped = view.buffer().evicted();
        if dropped > 0 {
            status.push_str(&format!(" · {dropped} dropped"));
        }
        status
    }
}
