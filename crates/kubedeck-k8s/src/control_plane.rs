use std::future::Future;

use futures::stream::BoxStream;

use kubedeck_types::{
    ContextInfo, CurrentContext, DeploymentInfo, NamespaceInfo, PodInfo, PodRef, ResourceChange,
    ResourceKind,
};

use crate::KubeError;

/// One item of a time-bounded watch window
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchUpdate {
    Changed(ResourceChange),
    /// Progress marker carrying the latest resource version
    Bookmark(String),
    /// The resume version is too old (410 Gone); the next window starts over
    Expired,
}

/// Watch events for one window; ends when the server closes the window
pub type EventStream = BoxStream<'static, Result<WatchUpdate, KubeError>>;

/// Newline-delimited container output, one item per line
pub type LineStream = BoxStream<'static, Result<String, KubeError>>;

/// The list/watch/log primitives kubedeck consumes from the control plane.
///
/// Implementations are cheap handles: they are cloned into every background
/// task that needs to talk to the cluster.
pub trait ControlPlane: Clone + Send + Sync + 'static {
    /// All contexts known to the credentials store
    fn list_contexts(&self) -> Vec<ContextInfo>;

    /// The active context as `(name, namespace, user)`
    fn current_context(&self) -> Option<CurrentContext>;

    /// Persist `name` as the active context and switch to it
    fn set_context(
        &self,
        name: &str,
        namespace: &str,
        user: &str,
    ) -> impl Future<Output = Result<(), KubeError>> + Send;

    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<NamespaceInfo>, KubeError>> + Send;

    fn list_pods(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<PodInfo>, KubeError>> + Send;

    fn list_deployments(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<DeploymentInfo>, KubeError>> + Send;

    fn watch_pods(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> impl Future<Output = Result<EventStream, KubeError>> + Send;

    fn watch_deployments(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> impl Future<Output = Result<EventStream, KubeError>> + Send;

    /// Follow a container's output, starting `tail_lines` back
    fn stream_pod_logs(
        &self,
        target: &PodRef,
        tail_lines: i64,
    ) -> impl Future<Output = Result<LineStream, KubeError>> + Send;

    /// Open a watch window for `kind`
    fn watch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        resource_version: &str,
    ) -> impl Future<Output = Result<EventStream, KubeError>> + Send {
        async move {
            match kind {
                ResourceKind::Pods => self.watch_pods(namespace, resource_version).await,
                ResourceKind::Deployments => {
                    self.watch_deployments(namespace, resource_version).await
                }
            }
        }
    }
}
