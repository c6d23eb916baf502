use ratatui::{Frame, layout::Rect};

use crate::ui::components::ResourceTable;
use crate::views::{ResourceList, Row};

/// Content area of the four list views
pub struct TableScreen;

impl TableScreen {
    pub fn render<T: Row>(frame: &mut Frame, area: Rect, list: &mut ResourceList<T>) {
        let (snapshot, state) = list.render_parts();
        let title = format!(" {} ({}) ", capitalize(T::LABEL), snapshot.items.len());
        frame.render_stateful_widget(ResourceTable::new(snapshot, title), area, state);
    }

    /// Right-hand status text for a list
    pub fn status<T: Row>(list: &ResourceList<T>) -> String {
        match &list.snapshot().error {
            Some(_) => format!("{} unavailable", T::LABEL),
            None => format!(
                "{} {} · {}",
                list.len(),
                T::LABEL,
                list.snapshot().taken_at.format("%H:%M:%S")
            ),
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
