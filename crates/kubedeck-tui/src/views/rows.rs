//! Table projections for each listed resource

use chrono::{DateTime, Utc};
use ratatui::layout::Constraint;

use kubedeck_k8s::{ControlPlane, KubeError};
use kubedeck_types::columns;
use kubedeck_types::{ContextInfo, DeploymentInfo, NamespaceInfo, PodInfo};

use super::resource_list::{Column, Row};

impl Row for PodInfo {
    const LABEL: &'static str = "pods";

    const COLUMNS: &'static [Column] = &[
        Column::new("NAME", Constraint::Fill(3)),
        Column::new("READY", Constraint::Length(7)),
        Column::new("STATUS", Constraint::Length(12)),
        Column::new("RESTARTS", Constraint::Length(9)),
        Column::new("AGE", Constraint::Length(6)),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            columns::ready(&self.containers),
            self.phase.clone(),
            columns::restarts(&self.containers),
            columns::age(self.created, now),
        ]
    }

    async fn fetch<C: ControlPlane>(client: &C, namespace: &str) -> Result<Vec<Self>, KubeError> {
        client.list_pods(namespace).await
    }
}

impl Row for DeploymentInfo {
    const LABEL: &'static str = "deployments";

    const COLUMNS: &'static [Column] = &[
        Column::new("NAME", Constraint::Fill(3)),
        Column::new("READY", Constraint::Length(7)),
        Column::new("STATUS", Constraint::Length(16)),
        Column::new("AGE", Constraint::Length(6)),
    ];

    fn cells(&self, now: DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.replica_status(),
            self.condition_label().to_string(),
            columns::age(self.created, now),
        ]
    }

    async fn fetch<C: ControlPlane>(client: &C, namespace: &str) -> Result<Vec<Self>, KubeError> {
        client.list_deployments(namespace).await
    }
}

impl Row for ContextInfo {
    const LABEL: &'static str = "contexts";

    const COLUMNS: &'static [Column] = &[
        Column::new("NAME", Constraint::Fill(2)),
        Column::new("CLUSTER", Constraint::Fill(2)),
        Column::new("USER", Constraint::Fill(1)),
        Column::new("NAMESPACE", Constraint::Fill(1)),
    ];

    fn cells(&self, _now: DateTime<Utc>) -> Vec<String> {
        let name = if self.is_current {
            format!("{} (current)", self.name)
        } else {
            self.name.clone()
        };
        vec![
            name,
            self.cluster.clone(),
            self.user.clone(),
            self.namespace.clone().unwrap_or_default(),
        ]
    }

    fn is_current(&self) -> bool {
        self.is_current
    }

    /// Contexts come from the kubeconfig, so there is nothing to scope
    async fn fetch<C: ControlPlane>(client: &C, _namespace: &str) -> Result<Vec<Self>, KubeError> {
        Ok(client.list_contexts())
    }
}

impl Row for NamespaceInfo {
    const LABEL: &'static str = "namespaces";

    const COLUMNS: &'static [Column] = &[
        Column::new("NAME", Constraint::Fill(3)),
        Column::new("STATUS", Constraint::Length(12)),
    ];

    fn cells(&self, _now: DateTime<Utc>) -> Vec<String> {
        vec![self.name.clone(), self.status.clone()]
    }

    async fn fetch<C: ControlPlane>(client: &C, _namespace: &str) -> Result<Vec<Self>, KubeError> {
        client.list_namespaces().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use kubedeck_types::ContainerInfo;

    use super::*;

    #[test]
    fn test_pod_cells() {
        let now = Utc::now();
        let mut pod = PodInfo::new("web-1".to_string(), "default".to_string());
        pod.phase = "Running".to_string();
        pod.created = Some(now - TimeDelta::seconds(90));
        for (name, ready, restarts) in [("app", true, 1), ("sidecar", true, 2), ("init", false, 0)] {
            let mut container = ContainerInfo::new(name.to_string());
            container.ready = ready;
            container.restart_count = restarts;
            pod.containers.push(container);
        }

        assert_eq!(pod.cells(now), vec!["web-1", "2/3", "Running", "3", "2m"]);
        assert_eq!(pod.cells(now).len(), PodInfo::COLUMNS.len());
    }

    #[test]
    fn test_deployment_without_conditions() {
        let mut deployment = DeploymentInfo::new("api".to_string(), "default".to_string());
        deployment.replicas = 3;
        deployment.ready_replicas = 1;

        assert_eq!(
            deployment.cells(Utc::now()),
            vec!["api", "1/3", "-", "?"]
        );
    }

    #[test]
    fn test_current_context_is_marked() {
        let context = ContextInfo::new(
            "dev".to_string(),
            "dev-cluster".to_string(),
            "me".to_string(),
            None,
            true,
        );
        assert!(Row::is_current(&context));
        assert_eq!(context.cells(Utc::now())[0], "dev (current)");
        assert_eq!(context.cells(Utc::now())[3], "");
    }
}
