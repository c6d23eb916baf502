use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Cell, Row as TableRow, StatefulWidget, Table, TableState},
};

use crate::ui::Theme;
use crate::views::{Row, Snapshot};

/// A bordered table over one resource snapshot
pub struct ResourceTable<'a, T> {
    snapshot: &'a Snapshot<T>,
    title: String,
}

impl<'a, T: Row> ResourceTable<'a, T> {
    pub fn new(snapshot: &'a Snapshot<T>, title: impl Into<String>) -> Self {
        Self {
            snapshot,
            title: title.into(),
        }
    }
}

impl<T: Row> StatefulWidget for ResourceTable<'_, T> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let header = TableRow::new(T::COLUMNS.iter().map(|column| Cell::from(column.title)))
            .style(Theme::table_header());

        let failed = self.snapshot.error.is_some();
        let rows = self.snapshot.rows.iter().enumerate().map(|(i, cells)| {
            let style = if failed {
                Theme::error()
            } else if self.snapshot.items.get(i).is_some_and(Row::is_current) {
                Theme::list_item_current()
            } else {
                Theme::list_item()
            };
            TableRow::new(cells.iter().map(|cell| Cell::from(cell.as_str()))).style(style)
        });

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(self.title, Theme::title()));

        let table = Table::new(rows, T::COLUMNS.iter().map(|column| column.width))
            .header(header)
            .block(block)
            .row_highlight_style(Theme::list_item_selected())
            .highlight_symbol("▶ ");

        StatefulWidget::render(table, area, buf, state);
    }
}
