use crossterm::event::KeyEvent;
use tracing::{debug, error, info, warn};

use kubedeck_k8s::{ControlPlane, ResourceKind, WatchMessage, WatchSignal};
use kubedeck_logs::LogSession;
use kubedeck_types::{
    AppError, ContextInfo, CurrentContext, DeploymentInfo, NamespaceInfo, PodInfo, Severity,
    default_namespace,
};

use super::{Action, LogMessage, Message, ViewState, WatchSet};
use crate::config::{KeyBindings, Settings};
use crate::tui::Scroll;
use crate::ui::Layout;
use crate::views::{LogView, ResourceList};

/// Tunables the controller needs from the settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    pub tail_lines: i64,
    /// Log lines per mouse wheel notch
    pub scroll_lines: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ControllerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            tail_lines: settings.tail_lines,
            scroll_lines: settings.scroll_lines,
        }
    }
}

/// Owns the active view and every piece of state the views render.
///
/// All mutation happens through [`Controller::update`]; background tasks
/// only ever reach it as [`Message`]s.
pub struct Controller<C: ControlPlane> {
    client: C,
    config: ControllerConfig,
    keybindings: KeyBindings,

    view: ViewState,
    context: Option<CurrentContext>,
    namespace: String,

    contexts: ResourceList<ContextInfo>,
    namespaces: ResourceList<NamespaceInfo>,
    pods: ResourceList<PodInfo>,
    deployments: ResourceList<DeploymentInfo>,

    log_view: LogView,
    log_session: Option<LogSession>,
    next_session_id: u64,

    watches: WatchSet<C>,
    error: Option<AppError>,
    size: (u16, u16),
    running: bool,
}

impl<C: ControlPlane> Controller<C> {
    pub fn new(client: C, config: ControllerConfig, size: (u16, u16)) -> Self {
        let mut controller = Self {
            watches: WatchSet::new(client.clone()),
            client,
            config,
            keybindings: KeyBindings::new(),
            view: ViewState::default(),
            context: None,
            namespace: default_namespace(None).to_string(),
            contexts: ResourceList::new(),
            namespaces: ResourceList::new(),
            pods: ResourceList::new(),
            deployments: ResourceList::new(),
            log_view: LogView::default(),
            log_session: None,
            next_session_id: 1,
            error: None,
            size,
            running: true,
        };
        controller.resize(size.0, size.1);
        controller
    }

    /// Load the current context, take initial snapshots and start watching
    pub async fn init(&mut self) {
        self.context = self.client.current_context();
        if self.context.is_none() {
            self.raise(AppError::new(
                Severity::Warning,
                "No current context; press c to choose one",
            ));
        }
        self.namespace = self.context_namespace();

        self.contexts.refresh(&self.client, &self.namespace, true).await;
        self.namespaces.refresh(&self.client, &self.namespace, true).await;
        self.refresh_tables(true).await;
        self.watches.start(&self.namespace);
        info!(namespace = %self.namespace, "controller started");
    }

    /// Apply one message
    pub async fn update(&mut self, message: Message) {
        match message {
            Message::Key(key) => self.handle_key(key).await,
            Message::Resize(width, height) => self.resize(width, height),
            Message::Scroll(scroll) => self.scroll(scroll),
            Message::Tick => {}
            Message::Watch(message) => self.apply_watch(message).await,
            Message::Log(message) => self.apply_log(message).await,
            Message::TerminalError(err) => {
                self.raise(AppError::new(Severity::Error, "Terminal error").with_detail(err));
            }
        }
    }

    /// Wait for the next message from a background source: either watch
    /// subscription or the open log session.
    ///
    /// Never completes while nothing is live.
    pub async fn next_message(&mut self) -> Message {
        let Self {
            watches,
            log_session,
            ..
        } = self;

        tokio::select! {
            message = watches.next() => Message::Watch(message),
            message = next_log_line(log_session.as_mut()) => Message::Log(message),
        }
    }

    /// Show `err` unless something more severe is already showing
    pub fn raise(&mut self, err: AppError) {
        match err.severity {
            Severity::Error | Severity::Fatal => error!("{err}"),
            Severity::Warning => warn!("{err}"),
            Severity::Info => info!("{err}"),
        }

        if self
            .error
            .as_ref()
            .is_none_or(|current| err.severity >= current.severity)
        {
            self.error = Some(err);
        }
    }

    /// Stop every background task
    pub async fn shutdown(&mut self) {
        self.close_log().await;
        self.watches.stop_all();
        self.running = false;
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if self.keybindings.is_quit(&key) {
            info!("quit requested");
            self.running = false;
            return;
        }

        // The first key after an error only dismisses it
        if self.error.take().is_some() {
            return;
        }

        let Some(action) = self.keybindings.get_action(self.view, &key) else {
            return;
        };

        match (self.view, action) {
            (_, Action::Quit) => self.running = false,

            (ViewState::Pod, Action::ShowContexts) | (ViewState::Deployment, Action::ShowContexts) => {
                self.contexts.refresh(&self.client, &self.namespace, false).await;
                self.view = ViewState::Context;
            }
            (ViewState::Pod, Action::ShowNamespaces)
            | (ViewState::Deployment, Action::ShowNamespaces) => {
                self.namespaces.refresh(&self.client, &self.namespace, false).await;
                self.view = ViewState::Namespace;
            }
            (ViewState::Pod, Action::ShowDeployments) => self.view = ViewState::Deployment,
            (ViewState::Deployment, Action::ShowPods) => self.view = ViewState::Pod,
            (ViewState::Pod, Action::Select) => self.open_logs(),

            (ViewState::Context, Action::Select) => {
                if let Some(selected) = self.contexts.selected().cloned() {
                    self.switch_context(selected).await;
                }
            }
            (ViewState::Namespace, Action::Select) => {
                if let Some(selected) = self.namespaces.selected().cloned() {
                    self.switch_namespace(selected.name).await;
                }
            }

            (ViewState::Log, Action::Back) => {
                self.close_log().await;
                self.view = ViewState::Pod;
            }
            (_, Action::Back) => self.view = ViewState::Pod,

            (ViewState::Log, action) => {
                self.log_view.handle(action);
            }
            (ViewState::Pod, action) => {
                self.pods.handle(action);
            }
            (ViewState::Deployment, action) => {
                self.deployments.handle(action);
            }
            (ViewState::Context, action) => {
                self.contexts.handle(action);
            }
            (ViewState::Namespace, action) => {
                self.namespaces.handle(action);
            }
        }
    }

    /// Persist `selected` and rebuild everything around it
    async fn switch_context(&mut self, selected: ContextInfo) {
        self.close_log().await;
        self.watches.stop_all();

        let namespace = selected.namespace.clone().unwrap_or_default();
        match self
            .client
            .set_context(&selected.name, &namespace, &selected.user)
            .await
        {
            Ok(()) => {
                info!(context = %selected.name, "switched context");
                self.context = self.client.current_context();
                self.namespace = self.context_namespace();
                self.namespaces.refresh(&self.client, &self.namespace, true).await;
                self.contexts.refresh(&self.client, &self.namespace, false).await;
            }
            Err(err) => {
                self.raise(
                    AppError::new(
                        Severity::Error,
                        format!("Failed to switch to context {}", selected.name),
                    )
                    .with_detail(err),
                );
            }
        }

        self.refresh_tables(true).await;
        self.watches.start(&self.namespace);
        self.view = ViewState::Pod;
    }

    async fn switch_namespace(&mut self, namespace: String) {
        self.close_log().await;
        self.watches.stop_all();

        info!(%namespace, "switched namespace");
        self.namespace = namespace;
        self.refresh_tables(true).await;
        self.watches.start(&self.namespace);
        self.view = ViewState::Pod;
    }

    fn open_logs(&mut self) {
        let Some(pod) = self.pods.selected() else {
            return;
        };
        let target = pod.log_target();

        // Replacing a live session must never leave two readers running
        if let Some(previous) = self.log_session.take() {
            previous.stop();
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        self.log_view.reset(target.clone());
        self.log_session = Some(LogSession::open(
            self.client.clone(),
            target,
            self.config.tail_lines,
            id,
        ));
        self.view = ViewState::Log;
    }

    /// Close the log session and wait for its reader to exit
    async fn close_log(&mut self) {
        if let Some(mut session) = self.log_session.take() {
            session.shutdown().await;
        }
    }

    async fn apply_watch(&mut self, message: WatchMessage) {
        if !self.watches.is_current(&message) {
            debug!(kind = %message.kind, generation = message.generation, "discarding stale watch message");
            return;
        }

        match message.signal {
            WatchSignal::Changed(change) => {
                debug!(kind = %message.kind, name = %change.name, "resource changed");
                match message.kind {
                    ResourceKind::Pods => {
                        self.pods.refresh(&self.client, &self.namespace, false).await;
                    }
                    ResourceKind::Deployments => {
                        self.deployments.refresh(&self.client, &self.namespace, false).await;
                    }
                }
            }
            WatchSignal::Failed(err) => {
                self.raise(
                    AppError::new(Severity::Error, format!("Watching {} failed", message.kind))
                        .with_detail(err),
                );
            }
        }
    }

    async fn apply_log(&mut self, message: LogMessage) {
        let current = self.log_session.as_ref().map(LogSession::id);
        if current != Some(message.session) {
            debug!(session = message.session, "discarding line from closed log session");
            return;
        }

        match message.line {
            Some(line) => self.log_view.push_line(line),
            None => {
                self.log_view.mark_ended();
                self.close_log().await;
            }
        }
    }

    /// Only the log view follows the wheel; tables move by key
    fn scroll(&mut self, scroll: Scroll) {
        if self.view == ViewState::Log {
            self.log_view.scroll(scroll, self.config.scroll_lines);
        }
    }

    async fn refresh_tables(&mut self, scroll_to_top: bool) {
        self.pods.refresh(&self.client, &self.namespace, scroll_to_top).await;
        self.deployments.refresh(&self.client, &self.namespace, scroll_to_top).await;
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let rows = usize::from(Layout::table_rows(height));
        self.contexts.set_page_size(rows);
        self.namespaces.set_page_size(rows);
        self.pods.set_page_size(rows);
        self.deployments.set_page_size(rows);
        self.log_view.set_height(usize::from(Layout::log_rows(height)));
    }

    fn context_namespace(&self) -> String {
        default_namespace(
            self.context
                .as_ref()
                .map(|context| context.namespace.as_str()),
        )
        .to_string()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn context(&self) -> Option<&CurrentContext> {
        self.context.as_ref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn log_view(&self) -> &LogView {
        &self.log_view
    }

    pub fn has_log_session(&self) -> bool {
        self.log_session.is_some()
    }

    pub fn watches(&self) -> &WatchSet<C> {
        &self.watches
    }

    pub fn contexts(&self) -> &ResourceList<ContextInfo> {
        &self.contexts
    }

    pub fn namespaces(&self) -> &ResourceList<NamespaceInfo> {
        &self.namespaces
    }

    pub fn pods(&self) -> &ResourceList<PodInfo> {
        &self.pods
    }

    pub fn deployments(&self) -> &ResourceList<DeploymentInfo> {
        &self.deployments
    }

    pub fn contexts_mut(&mut self) -> &mut ResourceList<ContextInfo> {
        &mut self.contexts
    }

    pub fn namespaces_mut(&mut self) -> &mut ResourceList<NamespaceInfo> {
        &mut self.namespaces
    }

    pub fn pods_mut(&mut self) -> &mut ResourceList<PodInfo> {
        &mut self.pods
    }

    pub fn deployments_mut(&mut self) -> &mut ResourceList<DeploymentInfo> {
        &mut self.deployments
    }
}

/// Wait for one line from `session`, or forever if there is none
async fn next_log_line(session: Option<&mut LogSession>) -> LogMessage {
    let Some(session) = session else {
        return std::future::pending().await;
    };

    LogMessage {
        session: session.id(),
        line: session.next_line().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use kubedeck_k8s::fake::{FakeControlPlane, wait_until};
    use kubedeck_types::{ChangeKind, ContainerInfo, ResourceChange};

    use super::*;
    use crate::ui::screens::LogViewerScreen;

    fn pod(name: &str, namespace: &str) -> PodInfo {
        let mut pod = PodInfo::new(name.to_string(), namespace.to_string());
        pod.phase = "Running".to_string();
        pod.primary_container = Some("app".to_string());
        pod.containers.push(ContainerInfo::new("app".to_string()));
        pod
    }

    fn cluster() -> FakeControlPlane {
        FakeControlPlane::new()
            .with_context("dev", None, "dev-user")
            .with_context("prod", Some("payments"), "ops")
            .with_namespace("default")
            .with_namespace("kube-system")
            .with_pod(pod("web-0", "default"))
            .with_pod(pod("web-1", "default"))
            .with_pod(pod("web-2", "default"))
            .with_pod(pod("coredns", "kube-system"))
            .with_pod(pod("billing", "payments"))
            .with_deployment(DeploymentInfo::new("web".to_string(), "default".to_string()))
    }

    async fn started(fake: &FakeControlPlane) -> Controller<FakeControlPlane> {
        let mut controller = Controller::new(fake.clone(), ControllerConfig::default(), (120, 40));
        controller.init().await;
        controller
    }

    async fn press(controller: &mut Controller<FakeControlPlane>, code: KeyCode) {
        controller
            .update(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .await;
    }

    async fn next(controller: &mut Controller<FakeControlPlane>) -> Message {
        tokio::time::timeout(Duration::from_secs(1), controller.next_message())
            .await
            .expect("a background message")
    }

    fn pod_names(controller: &Controller<FakeControlPlane>) -> Vec<String> {
        controller
            .pods()
            .snapshot()
            .items
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Wait until the only attached watch of `kind` is the one in `namespace`
    async fn settled_on(fake: &FakeControlPlane, kind: ResourceKind, namespace: &str) -> bool {
        wait_until(|| fake.live_watch_namespaces(kind) == [namespace]).await
    }

    fn count_calls(fake: &FakeControlPlane, call: &str) -> usize {
        fake.calls().iter().filter(|c| *c == call).count()
    }

    #[tokio::test]
    async fn test_init_snapshots_and_watches_default_namespace() {
        let fake = cluster();
        let controller = started(&fake).await;

        assert_eq!(controller.view(), ViewState::Pod);
        assert_eq!(controller.namespace(), "default");
        assert_eq!(pod_names(&controller), vec!["web-0", "web-1", "web-2"]);
        assert_eq!(controller.deployments().len(), 1);

        for kind in ResourceKind::ALL {
            assert_eq!(controller.watches().live_count(kind), 1);
            assert!(settled_on(&fake, kind, "default").await);
        }
    }

    #[tokio::test]
    async fn test_quit_from_every_view() {
        let paths: [&[KeyCode]; 5] = [
            &[],
            &[KeyCode::Char('c')],
            &[KeyCode::Char('n')],
            &[KeyCode::Char('d')],
            &[KeyCode::Enter],
        ];

        for quit in [
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            for path in paths {
                let fake = cluster();
                let mut controller = started(&fake).await;
                for code in path {
                    press(&mut controller, *code).await;
                }
                assert!(controller.is_running());

                controller.update(Message::Key(quit)).await;
                assert!(!controller.is_running(), "quit from {:?}", controller.view());
            }
        }
    }

    #[tokio::test]
    async fn test_quit_wins_over_error_banner() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        controller.raise(AppError::new(Severity::Error, "boom"));

        press(&mut controller, KeyCode::Char('q')).await;
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_any_key_dismisses_error_banner() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        controller.raise(AppError::new(Severity::Warning, "careful"));

        press(&mut controller, KeyCode::Char('d')).await;
        assert!(controller.error().is_none());
        assert_eq!(controller.view(), ViewState::Pod);

        press(&mut controller, KeyCode::Char('d')).await;
        assert_eq!(controller.view(), ViewState::Deployment);
    }

    #[tokio::test]
    async fn test_less_severe_error_does_not_replace_banner() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        controller.raise(AppError::new(Severity::Fatal, "offline"));
        controller.raise(AppError::new(Severity::Warning, "minor"));
        assert_eq!(controller.error().map(|e| e.message.as_str()), Some("offline"));
    }

    #[tokio::test]
    async fn test_view_transitions_return_to_pod() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        press(&mut controller, KeyCode::Char('d')).await;
        assert_eq!(controller.view(), ViewState::Deployment);
        press(&mut controller, KeyCode::Char('p')).await;
        assert_eq!(controller.view(), ViewState::Pod);

        press(&mut controller, KeyCode::Char('d')).await;
        press(&mut controller, KeyCode::Char('n')).await;
        assert_eq!(controller.view(), ViewState::Namespace);
        press(&mut controller, KeyCode::Esc).await;
        assert_eq!(controller.view(), ViewState::Pod);

        press(&mut controller, KeyCode::Char('c')).await;
        assert_eq!(controller.view(), ViewState::Context);
        press(&mut controller, KeyCode::Esc).await;
        assert_eq!(controller.view(), ViewState::Pod);

        press(&mut controller, KeyCode::Char('d')).await;
        press(&mut controller, KeyCode::Esc).await;
        assert_eq!(controller.view(), ViewState::Pod);
    }

    #[tokio::test]
    async fn test_log_view_round_trip() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        press(&mut controller, KeyCode::Down).await;
        assert_eq!(controller.pods().selected().map(|p| p.name.as_str()), Some("web-1"));

        press(&mut controller, KeyCode::Enter).await;
        assert_eq!(controller.view(), ViewState::Log);
        assert!(wait_until(|| fake.log_streams_open() == 1).await);
        assert_eq!(fake.log_calls(), vec!["logs default/web-1:app 50".to_string()]);

        fake.emit_log_line("GET /healthz 200");
        let message = loop {
            match next(&mut controller).await {
                message @ Message::Log(_) => break message,
                other => controller.update(other).await,
            }
        };
        controller.update(message).await;
        assert_eq!(
            controller.log_view().visible_lines().collect::<Vec<_>>(),
            vec!["GET /healthz 200"]
        );

        press(&mut controller, KeyCode::Esc).await;
        assert_eq!(controller.view(), ViewState::Pod);
        assert!(!controller.has_log_session());
        assert_eq!(fake.log_streams_open(), 0);
        assert_eq!(pod_names(&controller), vec!["web-0", "web-1", "web-2"]);
        assert_eq!(controller.pods().selected().map(|p| p.name.as_str()), Some("web-1"));
    }

    #[tokio::test]
    async fn test_log_read_error_ends_session_quietly() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        press(&mut controller, KeyCode::Enter).await;
        assert!(wait_until(|| fake.log_streams_open() == 1).await);

        fake.emit_log_line("a");
        fake.fail_log_stream("connection reset by peer");
        while !controller.log_view().has_ended() {
            let message = next(&mut controller).await;
            controller.update(message).await;
        }

        assert_eq!(controller.log_view().visible_lines().collect::<Vec<_>>(), vec!["a"]);
        assert!(!controller.has_log_session());
        assert!(controller.error().is_none());
        assert_eq!(controller.view(), ViewState::Log);
        assert_eq!(fake.log_streams_open(), 0);
        assert!(LogViewerScreen::status(controller.log_view()).starts_with("stream ended"));

        press(&mut controller, KeyCode::Esc).await;
        assert_eq!(controller.view(), ViewState::Pod);
        assert_eq!(pod_names(&controller), vec!["web-0", "web-1", "web-2"]);
    }

    #[tokio::test]
    async fn test_mouse_wheel_scrolls_log_view() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        press(&mut controller, KeyCode::Enter).await;

        for i in 0..200 {
            controller
                .update(Message::Log(LogMessage {
                    session: 1,
                    line: Some(format!("line {i}")),
                }))
                .await;
        }
        let bottom = controller.log_view().viewport().offset();
        assert!(controller.log_view().is_following());

        controller.update(Message::Scroll(Scroll::Up)).await;
        assert_eq!(controller.log_view().viewport().offset(), bottom - 50);
        assert!(!controller.log_view().is_following());

        controller.update(Message::Scroll(Scroll::Down)).await;
        assert_eq!(controller.log_view().viewport().offset(), bottom);
        assert!(controller.log_view().is_following());
    }

    #[tokio::test]
    async fn test_mouse_wheel_leaves_tables_and_banner_alone() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        controller.raise(AppError::new(Severity::Warning, "careful"));

        controller.update(Message::Scroll(Scroll::Down)).await;
        assert_eq!(controller.pods().selected().map(|p| p.name.as_str()), Some("web-0"));
        assert!(controller.error().is_some());
    }

    #[tokio::test]
    async fn test_namespace_switch_closes_log_session_first() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        press(&mut controller, KeyCode::Enter).await;
        assert!(wait_until(|| fake.log_streams_open() == 1).await);

        // Leave the session running while the namespace view is reached
        controller.view = ViewState::Pod;
        press(&mut controller, KeyCode::Char('n')).await;
        assert_eq!(controller.view(), ViewState::Namespace);

        press(&mut controller, KeyCode::Down).await;
        press(&mut controller, KeyCode::Enter).await;

        assert_eq!(fake.log_streams_open(), 0);
        assert!(!controller.has_log_session());
        assert_eq!(controller.view(), ViewState::Pod);
        assert_eq!(controller.namespace(), "kube-system");
        assert_eq!(pod_names(&controller), vec!["coredns"]);

        for kind in ResourceKind::ALL {
            assert!(
                settled_on(&fake, kind, "kube-system").await,
                "{kind}: {:?}",
                fake.live_watch_namespaces(kind)
            );
        }
        let calls = fake.watch_calls();
        assert!(calls.iter().rev().take(2).all(|c| c.contains(" kube-system ")));
    }

    #[tokio::test]
    async fn test_repeated_switches_keep_one_watch_per_kind() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        for _ in 0..4 {
            let previous = controller.namespace().to_string();
            press(&mut controller, KeyCode::Char('n')).await;
            press(&mut controller, KeyCode::Down).await;
            press(&mut controller, KeyCode::Enter).await;

            let namespace = controller.namespace().to_string();
            assert_ne!(namespace, previous);
            for kind in ResourceKind::ALL {
                assert_eq!(controller.watches().live_count(kind), 1);
                assert!(
                    settled_on(&fake, kind, &namespace).await,
                    "{kind}: {:?}",
                    fake.live_watch_namespaces(kind)
                );
            }
        }
    }

    #[tokio::test]
    async fn test_context_switch_persists_and_rescopes() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        press(&mut controller, KeyCode::Char('c')).await;
        press(&mut controller, KeyCode::Down).await;
        assert_eq!(controller.contexts().selected().map(|c| c.name.as_str()), Some("prod"));
        press(&mut controller, KeyCode::Enter).await;

        assert_eq!(
            fake.current_context(),
            Some(CurrentContext::new("prod", "payments", "ops"))
        );
        assert_eq!(controller.view(), ViewState::Pod);
        assert_eq!(controller.namespace(), "payments");
        assert_eq!(pod_names(&controller), vec!["billing"]);
        assert_eq!(controller.context().map(|c| c.name.as_str()), Some("prod"));

        for kind in ResourceKind::ALL {
            assert!(settled_on(&fake, kind, "payments").await);
        }
    }

    #[tokio::test]
    async fn test_watch_change_refreshes_snapshot() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        assert!(settled_on(&fake, ResourceKind::Pods, "default").await);

        fake.set_pods("default", vec![pod("web-0", "default")]);
        fake.emit(
            ResourceKind::Pods,
            ResourceChange::new(ChangeKind::Deleted, "web-1"),
        );

        let message = next(&mut controller).await;
        assert!(matches!(message, Message::Watch(_)));
        controller.update(message).await;
        assert_eq!(pod_names(&controller), vec!["web-0"]);
    }

    #[tokio::test]
    async fn test_stale_watch_message_is_discarded() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        let before = count_calls(&fake, "list pods default");

        let stale = WatchMessage {
            kind: ResourceKind::Pods,
            generation: 0,
            signal: WatchSignal::Changed(ResourceChange::new(ChangeKind::Added, "ghost")),
        };
        controller.update(Message::Watch(stale)).await;

        assert_eq!(count_calls(&fake, "list pods default"), before);
    }

    #[tokio::test]
    async fn test_failed_watch_raises_banner() {
        let fake = cluster();
        fake.set_fail_watches(true);
        let mut controller = started(&fake).await;

        let message = next(&mut controller).await;
        controller.update(message).await;

        let error = controller.error().expect("banner");
        assert_eq!(error.severity, Severity::Error);
        assert!(error.message.starts_with("Watching "));
        assert!(controller.is_running());
    }

    #[tokio::test]
    async fn test_late_line_from_closed_session_is_ignored() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        press(&mut controller, KeyCode::Enter).await;

        controller
            .update(Message::Log(LogMessage {
                session: 999,
                line: Some("stale".to_string()),
            }))
            .await;
        assert!(controller.log_view().buffer().is_empty());
    }

    #[tokio::test]
    async fn test_resize_reflows_log_viewport() {
        let fake = cluster();
        let mut controller = started(&fake).await;

        controller.update(Message::Resize(100, 30)).await;
        assert_eq!(controller.size(), (100, 30));
        assert_eq!(
            controller.log_view().viewport().height(),
            usize::from(Layout::log_rows(30))
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_background_work() {
        let fake = cluster();
        let mut controller = started(&fake).await;
        press(&mut controller, KeyCode::Enter).await;
        assert!(wait_until(|| fake.log_streams_open() == 1).await);

        controller.shutdown().await;
        assert_eq!(fake.log_streams_open(), 0);
        for kind in ResourceKind::ALL {
            assert_eq!(controller.watches().live_count(kind), 0);
            assert!(wait_until(|| fake.live_watches(kind) == 0).await);
        }
    }
}
