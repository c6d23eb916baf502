use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use kubedeck_types::AppError;

use crate::ui::Theme;

/// Dismissible popup for the current error
pub struct ErrorBanner<'a> {
    error: &'a AppError,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(error: &'a AppError) -> Self {
        Self { error }
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Theme::severity(self.error.severity);

        let mut lines = vec![Line::from(Span::styled(self.error.message.as_str(), style))];
        if let Some(detail) = &self.error.detail {
            lines.push(Line::from(Span::styled(detail.as_str(), Theme::text())));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "press any key to dismiss",
            Theme::text_dim(),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(Span::styled(format!(" {} ", self.error.severity.as_str()), style));

        Clear.render(area, buf);
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}
