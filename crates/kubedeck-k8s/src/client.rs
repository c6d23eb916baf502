use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{AsyncBufReadExt, StreamExt, TryStreamExt};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{ListParams, LogParams, WatchEvent, WatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Resource, ResourceExt};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use kubedeck_types::{
    ChangeKind, ContainerInfo, ContextInfo, CurrentContext, DeploymentInfo, NamespaceInfo, PodInfo,
    PodRef, ResourceChange,
};

use crate::control_plane::{ControlPlane, EventStream, LineStream, WatchUpdate};
use crate::{KubeError, kubeconfig};

/// Kubernetes client wrapper.
///
/// Clones share the same kubeconfig and active connection, so a context
/// switch is observed by every background task holding a handle.
#[derive(Clone)]
pub struct KubeClient {
    inner: Arc<RwLock<Inner>>,
    path: Arc<PathBuf>,
    watch_timeout_secs: u32,
}

struct Inner {
    kubeconfig: Kubeconfig,
    connection: Result<kube::Client, String>,
}

impl KubeClient {
    /// Load the kubeconfig at `path` and connect to its current context
    pub async fn connect(path: PathBuf, watch_timeout_secs: u32) -> Result<Self, KubeError> {
        let kubeconfig = kubeconfig::load(&path)?;
        let context = kubeconfig
            .current_context
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(KubeError::NoCurrentContext)?;

        let client = Self::client_for_context(&kubeconfig, &context).await?;
        info!(%context, path = %path.display(), "connected to cluster");

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                kubeconfig,
                connection: Ok(client),
            })),
            path: Arc::new(path),
            watch_timeout_secs,
        })
    }

    /// A client with no live connection.
    ///
    /// Contexts are still listed when the kubeconfig is readable, so a
    /// successful `set_context` brings the client online.
    pub fn offline(path: PathBuf, watch_timeout_secs: u32, reason: impl Into<String>) -> Self {
        let kubeconfig = kubeconfig::load(&path).unwrap_or_default();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                kubeconfig,
                connection: Err(reason.into()),
            })),
            path: Arc::new(path),
            watch_timeout_secs,
        }
    }

    /// Path of the kubeconfig this client reads and writes
    pub fn kubeconfig_path(&self) -> &Path {
        &self.path
    }

    /// Create a kube::Client for a specific context
    async fn client_for_context(
        kubeconfig: &Kubeconfig,
        context_name: &str,
    ) -> Result<kube::Client, KubeError> {
        let config = kube::Config::from_custom_kubeconfig(
            kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|source| KubeError::InvalidContext {
            context: context_name.to_string(),
            source,
        })?;

        Ok(kube::Client::try_from(config)?)
    }

    fn client(&self) -> Result<kube::Client, KubeError> {
        self.inner
            .read()
            .connection
            .clone()
            .map_err(KubeError::NotConnected)
    }

    async fn watch_api<K>(&self, api: Api<K>, resource_version: &str) -> Result<EventStream, KubeError>
    where
        K: Resource + Clone + DeserializeOwned + Debug + Send + 'static,
    {
        let params = WatchParams::default().timeout(self.watch_timeout_secs);
        let stream = api.watch(&params, resource_version).await?;

        Ok(stream
            .map(|event| match event {
                Ok(event) => watch_update(event),
                Err(err) => Err(KubeError::from(err)),
            })
            .boxed())
    }

    /// Convert a k8s Pod to PodInfo
    fn pod_to_info(pod: Pod, namespace: &str) -> PodInfo {
        let name = pod.metadata.name.unwrap_or_default();
        let mut info = PodInfo::new(name, namespace.to_string());
        info.created = pod.metadata.creation_timestamp.map(|t| t.0);

        if let Some(spec) = &pod.spec {
            info.primary_container = spec.containers.first().map(|c| c.name.clone());
        }

        if let Some(status) = pod.status {
            if let Some(phase) = status.phase {
                info.phase = phase;
            }

            if let Some(container_statuses) = status.container_statuses {
                info.containers = container_statuses
                    .into_iter()
                    .map(|cs| {
                        let mut container = ContainerInfo::new(cs.name);
                        container.ready = cs.ready;
                        container.restart_count = cs.restart_count;
                        container
                    })
                    .collect();
            }
        }

        info
    }

    /// Convert a k8s Deployment to DeploymentInfo
    fn deployment_to_info(deploy: Deployment, namespace: &str) -> DeploymentInfo {
        let name = deploy.metadata.name.unwrap_or_default();
        let mut info = DeploymentInfo::new(name, namespace.to_string());
        info.created = deploy.metadata.creation_timestamp.map(|t| t.0);

        if let Some(status) = deploy.status {
            info.replicas = status.replicas.unwrap_or(0);
            info.ready_replicas = status.ready_replicas.unwrap_or(0);
            info.condition = status
                .conditions
                .and_then(|conditions| conditions.into_iter().next())
                .map(|condition| condition.type_);
        }

        info
    }
}

impl ControlPlane for KubeClient {
    fn list_contexts(&self) -> Vec<ContextInfo> {
        kubeconfig::contexts(&self.inner.read().kubeconfig)
    }

    fn current_context(&self) -> Option<CurrentContext> {
        kubeconfig::current(&self.inner.read().kubeconfig)
    }

    async fn set_context(&self, name: &str, namespace: &str, user: &str) -> Result<(), KubeError> {
        let mut updated = self.inner.read().kubeconfig.clone();
        kubeconfig::apply_context(&mut updated, name, namespace, user);

        let client = Self::client_for_context(&updated, name).await?;
        kubeconfig::persist_context(&self.path, name, namespace, user)?;

        let mut inner = self.inner.write();
        inner.kubeconfig = updated;
        inner.connection = Ok(client);
        info!(context = %name, %namespace, "switched context");
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, KubeError> {
        let namespaces: Api<Namespace> = Api::all(self.client()?);
        let list = namespaces.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .map(|ns| {
                let name = ns.metadata.name.unwrap_or_default();
                let status = ns
                    .status
                    .and_then(|s| s.phase)
                    .unwrap_or_else(|| "Unknown".to_string());
                NamespaceInfo::new(name, status)
            })
            .collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>, KubeError> {
        let pods: Api<Pod> = Api::namespaced(self.client()?, namespace);
        let list = pods.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .map(|pod| Self::pod_to_info(pod, namespace))
            .collect())
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>, KubeError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client()?, namespace);
        let list = deployments.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .map(|d| Self::deployment_to_info(d, namespace))
            .collect())
    }

    async fn watch_pods(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> Result<EventStream, KubeError> {
        let api: Api<Pod> = Api::namespaced(self.client()?, namespace);
        self.watch_api(api, resource_version).await
    }

    async fn watch_deployments(
        &self,
        namespace: &str,
        resource_version: &str,
    ) -> Result<EventStream, KubeError> {
        let api: Api<Deployment> = Api::namespaced(self.client()?, namespace);
        self.watch_api(api, resource_version).await
    }

    async fn stream_pod_logs(&self, target: &PodRef, tail_lines: i64) -> Result<LineStream, KubeError> {
        let pods: Api<Pod> = Api::namespaced(self.client()?, &target.namespace);
        let params = LogParams {
            follow: true,
            container: target.container.clone(),
            tail_lines: Some(tail_lines),
            ..Default::default()
        };

        debug!(%target, tail_lines, "opening log stream");
        let stream = pods.log_stream(&target.pod, &params).await?;
        Ok(stream.lines().map_err(KubeError::from).boxed())
    }
}

fn watch_update<K: Resource>(event: WatchEvent<K>) -> Result<WatchUpdate, KubeError> {
    match event {
        WatchEvent::Added(obj) => Ok(WatchUpdate::Changed(change(ChangeKind::Added, &obj))),
        WatchEvent::Modified(obj) => Ok(WatchUpdate::Changed(change(ChangeKind::Modified, &obj))),
        WatchEvent::Deleted(obj) => Ok(WatchUpdate::Changed(change(ChangeKind::Deleted, &obj))),
        WatchEvent::Bookmark(bookmark) => Ok(WatchUpdate::Bookmark(
            bookmark.metadata.resource_version,
        )),
        WatchEvent::Error(err) if err.code == 410 => Ok(WatchUpdate::Expired),
        WatchEvent::Error(err) => Err(KubeError::Watch {
            code: err.code,
            message: err.message,
        }),
    }
}

fn change<K: Resource>(kind: ChangeKind, obj: &K) -> ResourceChange {
    ResourceChange {
        kind,
        name: obj.name_any(),
        resource_version: obj.resource_version(),
    }
}
