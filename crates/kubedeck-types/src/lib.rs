//! Shared types for kubedeck
//!
//! This crate contains data structures used across multiple kubedeck crates.

pub mod columns;

use std::fmt;

use chrono::{DateTime, Utc};
use ratatui::style::Color;

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// Kubernetes context information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextInfo {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
    pub is_current: bool,
}

impl ContextInfo {
    pub fn new(
        name: String,
        cluster: String,
        user: String,
        namespace: Option<String>,
        is_current: bool,
    ) -> Self {
        Self {
            name,
            cluster,
            user,
            namespace,
            is_current,
        }
    }
}

/// The active context as recorded in the kubeconfig
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CurrentContext {
    pub name: String,
    pub namespace: String,
    pub user: String,
}

impl CurrentContext {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            user: user.into(),
        }
    }
}

/// Falls back to `default` for unset or empty namespaces
pub fn default_namespace(namespace: Option<&str>) -> &str {
    match namespace {
        Some(ns) if !ns.is_empty() => ns,
        _ => "default",
    }
}

/// Namespace information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
}

impl NamespaceInfo {
    pub fn new(name: String, status: String) -> Self {
        Self { name, status }
    }
}

/// Deployment information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    /// Type of the first reported status condition
    pub condition: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl DeploymentInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            replicas: 0,
            ready_replicas: 0,
            condition: None,
            created: None,
        }
    }

    /// Format replica status as "ready/total"
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.ready_replicas, self.replicas)
    }

    pub fn condition_label(&self) -> &str {
        self.condition.as_deref().unwrap_or("-")
    }
}

/// Pod information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub containers: Vec<ContainerInfo>,
    /// First container declared in the pod spec
    pub primary_container: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            phase: "Unknown".to_string(),
            containers: Vec::new(),
            primary_container: None,
            created: None,
        }
    }

    /// Reference used to open a log stream for this pod
    pub fn log_target(&self) -> PodRef {
        PodRef {
            namespace: self.namespace.clone(),
            pod: self.name.clone(),
            container: self
                .primary_container
                .clone()
                .or_else(|| self.containers.first().map(|c| c.name.clone())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,
    pub ready: bool,
    pub restart_count: i32,
}

impl ContainerInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ready: false,
            restart_count: 0,
        }
    }
}

/// Address of a single container's log stream
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PodRef {
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.pod)?;
        if let Some(container) = &self.container {
            write!(f, ":{container}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Watch Types
// ============================================================================

/// Resource kinds that are kept live through a watch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pods,
    Deployments,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Pods, ResourceKind::Deployments];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pods => "pods",
            Self::Deployments => "deployments",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// A "something changed" notification; carries no diff
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceChange {
    pub kind: ChangeKind,
    pub name: String,
    pub resource_version: Option<String>,
}

impl ResourceChange {
    pub fn new(kind: ChangeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            resource_version: None,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Severity of an error surfaced to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error | Self::Fatal => Color::Red,
        }
    }
}

/// An error shown in the dismissible banner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppError {
    pub severity: Severity,
    pub message: String,
    pub detail: Option<String>,
}

impl AppError {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => f.write_str(&self.message),
        }
    }
}
