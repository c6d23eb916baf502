use std::future::Future;

use chrono::{DateTime, Utc};
use ratatui::layout::Constraint;
use ratatui::widgets::TableState;
use tracing::warn;

use kubedeck_k8s::{ControlPlane, KubeError};

use crate::app::Action;

/// A table column header and its width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub width: Constraint,
}

impl Column {
    pub const fn new(title: &'static str, width: Constraint) -> Self {
        Self { title, width }
    }
}

/// A resource that can be listed and shown as a table row
pub trait Row: Clone + Send + Sync + Sized + 'static {
    /// Plural name used in titles and messages
    const LABEL: &'static str;

    const COLUMNS: &'static [Column];

    /// Cell text, one entry per column
    fn cells(&self, now: DateTime<Utc>) -> Vec<String>;

    /// Rows matching the active selection are highlighted
    fn is_current(&self) -> bool {
        false
    }

    fn fetch<C: ControlPlane>(
        client: &C,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<Self>, KubeError>> + Send;
}

/// Rows of one refresh; replaced wholesale on the next
#[derive(Clone, Debug)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub rows: Vec<Vec<String>>,
    pub taken_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl<T: Row> Snapshot<T> {
    pub fn new(items: Vec<T>, now: DateTime<Utc>) -> Self {
        let rows = items.iter().map(|item| item.cells(now)).collect();
        Self {
            items,
            rows,
            taken_at: now,
            error: None,
        }
    }

    /// A snapshot holding a single error row and no items
    pub fn failed(error: String, now: DateTime<Utc>) -> Self {
        Self {
            items: Vec::new(),
            rows: vec![vec![format!("error: {error}")]],
            taken_at: now,
            error: Some(error),
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            rows: Vec::new(),
            taken_at: DateTime::<Utc>::UNIX_EPOCH,
            error: None,
        }
    }
}

/// A navigable table of one resource kind
pub struct ResourceList<T> {
    snapshot: Snapshot<T>,
    state: TableState,
    page_size: usize,
}

impl<T: Row> ResourceList<T> {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            state: TableState::default(),
            page_size: 10,
        }
    }

    /// Fetch, project and replace the snapshot.
    ///
    /// Failures are kept in the snapshot rather than returned, so the table
    /// always has something to show.
    pub async fn refresh<C: ControlPlane>(
        &mut self,
        client: &C,
        namespace: &str,
        scroll_to_top: bool,
    ) -> &Snapshot<T> {
        let now = Utc::now();
        self.snapshot = match T::fetch(client, namespace).await {
            Ok(items) => Snapshot::new(items, now),
            Err(err) => {
                warn!(kind = T::LABEL, %namespace, "refresh failed: {err}");
                Snapshot::failed(err.to_string(), now)
            }
        };

        let len = self.len();
        let selected = match self.state.selected() {
            _ if len == 0 => None,
            Some(index) if !scroll_to_top => Some(index.min(len - 1)),
            _ => Some(0),
        };
        self.state.select(selected);
        if scroll_to_top {
            *self.state.offset_mut() = 0;
        }

        &self.snapshot
    }

    /// Apply a navigation action; returns false if it does not apply here
    pub fn handle(&mut self, action: Action) -> bool {
        let len = self.len();
        if len == 0 {
            return matches!(
                action,
                Action::Up | Action::Down | Action::Top | Action::Bottom | Action::PageUp | Action::PageDown
            );
        }

        let current = self.state.selected().unwrap_or(0);
        let next = match action {
            Action::Up => current.checked_sub(1).unwrap_or(len - 1),
            Action::Down => (current + 1) % len,
            Action::Top => 0,
            Action::Bottom => len - 1,
            Action::PageUp => current.saturating_sub(self.page_size),
            Action::PageDown => (current + self.page_size).min(len - 1),
            _ => return false,
        };
        self.state.select(Some(next));
        true
    }

    pub fn selected(&self) -> Option<&T> {
        self.snapshot.items.get(self.state.selected()?)
    }

    pub fn snapshot(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.items.is_empty()
    }

    /// Rows visible at once; sets the PageUp/PageDown step
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    /// Snapshot and selection state, split for stateful rendering
    pub fn render_parts(&mut self) -> (&Snapshot<T>, &mut TableState) {
        (&self.snapshot, &mut self.state)
    }
}

impl<T: Row> Default for ResourceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use kubedeck_k8s::fake::FakeControlPlane;
    use kubedeck_types::{NamespaceInfo, PodInfo};

    use super::*;

    fn fake_with_pods(names: &[&str]) -> FakeControlPlane {
        names.iter().fold(FakeControlPlane::new(), |fake, name| {
            fake.with_pod(PodInfo::new(name.to_string(), "default".to_string()))
        })
    }

    #[tokio::test]
    async fn test_refresh_selects_first_row() {
        let fake = fake_with_pods(&["web-0", "web-1", "web-2"]);
        let mut list = ResourceList::<PodInfo>::new();

        let snapshot = list.refresh(&fake, "default", true).await;
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.rows[1][0], "web-1");
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("web-0"));
    }

    #[tokio::test]
    async fn test_navigation_wraps_around() {
        let fake = fake_with_pods(&["a", "b", "c"]);
        let mut list = ResourceList::<PodInfo>::new();
        list.refresh(&fake, "default", true).await;

        assert!(list.handle(Action::Up));
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("c"));
        assert!(list.handle(Action::Down));
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("a"));

        list.handle(Action::Bottom);
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("c"));
        list.handle(Action::PageUp);
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("a"));
        assert!(!list.handle(Action::Select));
    }

    #[tokio::test]
    async fn test_refresh_keeps_selection_unless_scrolling_to_top() {
        let fake = fake_with_pods(&["a", "b", "c"]);
        let mut list = ResourceList::<PodInfo>::new();
        list.refresh(&fake, "default", true).await;
        list.handle(Action::Bottom);

        list.refresh(&fake, "default", false).await;
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("c"));

        fake.set_pods("default", vec![PodInfo::new("a".to_string(), "default".to_string())]);
        list.refresh(&fake, "default", false).await;
        assert_eq!(list.selected().map(|p| p.name.as_str()), Some("a"));

        list.refresh(&fake, "default", true).await;
        assert_eq!(list.state.offset(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_holds_error_row() {
        let fake = FakeControlPlane::new().with_namespace("default");
        fake.set_fail_lists(true);
        let mut list = ResourceList::<NamespaceInfo>::new();

        let snapshot = list.refresh(&fake, "default", true).await;
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.rows.len(), 1);
        assert!(snapshot.rows[0][0].starts_with("error: "));
        assert!(snapshot.error.is_some());
        assert!(list.selected().is_none());
    }
}
