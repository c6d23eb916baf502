//! Kubernetes client for kubedeck
//!
//! This crate provides the control-plane seam (`ControlPlane`), its
//! Kubernetes implementation, kubeconfig persistence and the watch
//! subscriptions that keep resource tables live.

mod client;
mod control_plane;
mod error;
pub mod kubeconfig;
pub mod watch;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use client::KubeClient;
pub use control_plane::{ControlPlane, EventStream, LineStream, WatchUpdate};
pub use error::KubeError;
pub use watch::{Subscription, WatchMessage, WatchSignal, bridge};

// Re-export types that are used in our public API
pub use kubedeck_types::{
    ContainerInfo, ContextInfo, CurrentContext, DeploymentInfo, NamespaceInfo, PodInfo, PodRef,
    ResourceChange, ResourceKind,
};
