mod log_viewer;
mod table_screen;

pub use log_viewer::LogViewerScreen;
pub use table_screen::TableScreen;

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::Theme;

/// Header shared by every screen: where we are and what we are looking at
pub fn render_header(frame: &mut Frame, area: Rect, context: &str, namespace: &str, title: &str) {
    let line = Line::from(vec![
        Span::styled("kubedeck", Theme::title()),
        Span::styled(" │ ", Theme::text_dim()),
        Span::styled("CONTEXT ", Theme::text_dim()),
        Span::styled(context, Theme::text()),
        Span::styled(" │ ", Theme::text_dim()),
        Span::styled("NAMESPACE ", Theme::text_dim()),
        Span::styled(namespace, Theme::text()),
        Span::styled(" │ ", Theme::text_dim()),
        Span::styled(title, Theme::text_highlight()),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(header, area);
}
