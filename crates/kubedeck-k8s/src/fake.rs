//! In-memory control plane for tests
//!
//! Resources are seeded through builder methods; watch windows and log
//! streams are driven from the test through channels, so tests decide
//! exactly when events arrive and when upstream streams end.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::channel::mpsc;
use parking_lot::Mutex;

use kubedeck_types::{
    ContextInfo, CurrentContext, DeploymentInfo, NamespaceInfo, PodInfo, PodRef, ResourceChange,
    ResourceKind,
};

use crate::KubeError;
use crate::control_plane::{ControlPlane, EventStream, LineStream, WatchUpdate};

/// Scriptable `ControlPlane` implementation
#[derive(Clone, Default)]
pub struct FakeControlPlane {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    contexts: Vec<ContextInfo>,
    current: Option<CurrentContext>,
    namespaces: Vec<NamespaceInfo>,
    pods: HashMap<String, Vec<PodInfo>>,
    deployments: HashMap<String, Vec<DeploymentInfo>>,
    watches: Vec<WatchFeed>,
    logs: Vec<LogFeed>,
    fail_watches: bool,
    fail_lists: bool,
    calls: Vec<String>,
}

struct WatchFeed {
    kind: ResourceKind,
    namespace: String,
    tx: mpsc::UnboundedSender<Result<WatchUpdate, KubeError>>,
}

struct LogFeed {
    tx: mpsc::UnboundedSender<Result<String, KubeError>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a context; the first one added becomes current
    pub fn with_context(self, name: &str, namespace: Option<&str>, user: &str) -> Self {
        {
            let mut state = self.state.lock();
            let is_current = state.current.is_none();
            if is_current {
                state.current = Some(CurrentContext::new(
                    name,
                    namespace.unwrap_or_default(),
                    user,
                ));
            }
            state.contexts.push(ContextInfo::new(
                name.to_string(),
                format!("{name}-cluster"),
                user.to_string(),
                namespace.map(str::to_string),
                is_current,
            ));
        }
        self
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.state
            .lock()
            .namespaces
            .push(NamespaceInfo::new(name.to_string(), "Active".to_string()));
        self
    }

    pub fn with_pod(self, pod: PodInfo) -> Self {
        self.state
            .lock()
            .pods
            .entry(pod.namespace.clone())
            .or_default()
            .push(pod);
        self
    }

    pub fn with_deployment(self, deployment: DeploymentInfo) -> Self {
        self.state
            .lock()
            .deployments
            .entry(deployment.namespace.clone())
            .or_default()
            .push(deployment);
        self
    }

    /// Replace the pods listed in `namespace`
    pub fn set_pods(&self, namespace: &str, pods: Vec<PodInfo>) {
        self.state.lock().pods.insert(namespace.to_string(), pods);
    }

    pub fn set_fail_watches(&self, fail: bool) {
        self.state.lock().fail_watches = fail;
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.state.lock().fail_lists = fail;
    }

    /// Push an update into every open watch window of `kind`
    pub fn send_update(&self, kind: ResourceKind, update: WatchUpdate) {
        for feed in self.state.lock().watches.iter().filter(|f| f.kind == kind) {
            let _ = feed.tx.unbounded_send(Ok(update.clone()));
        }
    }

    pub fn emit(&self, kind: ResourceKind, change: ResourceChange) {
        self.send_update(kind, WatchUpdate::Changed(change));
    }

    /// Fail every open watch window of `kind` with a stream error
    pub fn fail_watch_stream(&self, kind: ResourceKind, message: &str) {
        for feed in self.state.lock().watches.iter().filter(|f| f.kind == kind) {
            let _ = feed.tx.unbounded_send(Err(KubeError::Watch {
                code: 500,
                message: message.to_string(),
            }));
        }
    }

    /// Close every open watch window of `kind`, as a server timeout would
    pub fn end_watch_window(&self, kind: ResourceKind) {
        self.state.lock().watches.retain(|f| f.kind != kind);
    }

    /// Watch windows of `kind` whose consumer is still attached
    pub fn live_watches(&self, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .watches
            .iter()
            .filter(|f| f.kind == kind && !f.tx.is_closed())
            .count()
    }

    /// Namespaces of the attached watch windows of `kind`, in opening order.
    ///
    /// Windows stay attached until their subscription task has actually
    /// dropped them, so this settles only once old subscriptions are gone.
    pub fn live_watch_namespaces(&self, kind: ResourceKind) -> Vec<String> {
        self.state
            .lock()
            .watches
            .iter()
            .filter(|f| f.kind == kind && !f.tx.is_closed())
            .map(|f| f.namespace.clone())
            .collect()
    }

    /// Every watch opened so far, as `watch <kind> <namespace> <version>`
    pub fn watch_calls(&self) -> Vec<String> {
        self.calls_starting_with("watch ")
    }

    /// Every log stream opened so far, as `logs <pod ref> <tail lines>`
    pub fn log_calls(&self) -> Vec<String> {
        self.calls_starting_with("logs ")
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn emit_log_line(&self, line: &str) {
        for feed in &self.state.lock().logs {
            let _ = feed.tx.unbounded_send(Ok(line.to_string()));
        }
    }

    /// Fail every open log stream with a read error
    pub fn fail_log_stream(&self, message: &str) {
        for feed in &self.state.lock().logs {
            let _ = feed
                .tx
                .unbounded_send(Err(KubeError::Stream(io::Error::other(message.to_string()))));
        }
    }

    /// End every open log stream, as a container exiting would
    pub fn end_log_streams(&self) {
        self.state.lock().logs.clear();
    }

    /// Log streams whose reader is still attached
    pub fn log_streams_open(&self) -> usize {
        self.state
            .lock()
            .logs
            .iter()
            .filter(|f| !f.tx.is_closed())
            .count()
    }

    fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    fn list_failure(&self) -> Result<(), KubeError> {
        if self.state.lock().fail_lists {
            return Err(KubeError::NotConnected("list failed".to_string()));
        }
        Ok(())
    }

    fn open_watch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        resource_version: &str,
    ) -> Result<EventStream, KubeError> {
        self.record(format!("watch {kind} {namespace} {resource_version}"));

        let mut state = self.state.lock();
        if state.fail_watches {
            return Err(KubeError::NotConnected("watch failed".to_string()));
        }

        let (tx, rx) = mpsc::unbounded();
        state.watches.push(WatchFeed {
            kind,
            namespace: namespace.to_string(),
            tx,
        });
        Ok(rx.boxed())
    }
}

impl ControlPlane for FakeControlPlane {
    fn list_contexts(&self) -> Vec<ContextInfo> {
        self.state.lock().contexts.clone()
    }

    fn current_context(&self) -> Option<CurrentContext> {
        self.state.lock().current.clone()
    }

    async fn set_context(&self, name: &str, namespace: &str, user: &str) -> Result<(), KubeError> {
        self.record(format!("set_context {name} {namespace} {user}"));

        let mut state = self.state.lock();
        for context in &mut state.contexts {
            context.is_current = context.name == name;
        }
        if !state.contexts.iter().any(|c| c.name == name) {
            state.contexts.push(ContextInfo::new(
                name.to_string(),
                name.to_string(),
                user.to_string(),
                Some(namespace.to_string()).filter(|ns| !ns.is_empty()),
                true,
            ));
        }
        state.current = Some(CurrentContext::new(name, namespace, user));
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, KubeError> {
        self.record("list namespaces".to_string());
        self.list_failure()?;
        Ok(self.state.lock().namespaces.clone())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>, KubeError> {
        self.record(format!("list pods {namespace}"));
        self.list_failure()?;
        Ok(self
            .state
            .lock()
            .pods
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>, KubeError> {
        self.record(format!("list deployments {namespace}"));
        self.list_failure()?;
        Ok(self
            .state
            .lock()
            .deployments
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn watch_pods(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> Result<EventStream, KubeError> {
        self.open_watch(ResourceKind::Pods, namespace, resource_version)
    }

    async fn watch_deployments(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> Result<EventStream, KubeError> {
        self.open_watch(ResourceKind::Deployments, namespace, resource_version)
    }

    async fn stream_pod_logs(&self, target: &PodRef, tail_lines: i64) -> Result<LineStream, KubeError> {
        self.record(format!("logs {target} {tail_lines}"));

        let (tx, rx) = mpsc::unbounded();
        self.state.lock().logs.push(LogFeed { tx });
        Ok(rx.boxed())
    }
}

/// Poll `condition` until it holds, giving background tasks time to run.
///
/// Returns false if it still does not hold after about a second.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
