use tracing::debug;

use kubedeck_k8s::{ControlPlane, ResourceKind, Subscription, WatchMessage, bridge};

/// The live watch subscriptions, at most one per resource kind
pub struct WatchSet<C> {
    client: C,
    pods: Option<Subscription>,
    deployments: Option<Subscription>,
    next_generation: u64,
}

impl<C: ControlPlane> WatchSet<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            pods: None,
            deployments: None,
            next_generation: 1,
        }
    }

    /// Replace every subscription with a fresh one scoped to `namespace`
    pub fn start(&mut self, namespace: &str) {
        self.stop_all();
        debug!(%namespace, "starting watches");

        for kind in ResourceKind::ALL {
            let generation = self.next_generation;
            self.next_generation += 1;
            *self.slot_mut(kind) = Some(Subscription::start(
                self.client.clone(),
                kind,
                namespace,
                generation,
            ));
        }
    }

    /// Close every subscription. Idempotent.
    pub fn stop_all(&mut self) {
        for kind in ResourceKind::ALL {
            if let Some(mut subscription) = self.slot_mut(kind).take() {
                subscription.close();
            }
        }
    }

    /// Generation of the live subscription for `kind`
    pub fn generation(&self, kind: ResourceKind) -> Option<u64> {
        self.slot(kind).as_ref().map(Subscription::generation)
    }

    /// Whether `message` came from the subscription that is live now
    pub fn is_current(&self, message: &WatchMessage) -> bool {
        self.generation(message.kind) == Some(message.generation)
    }

    pub fn live_count(&self, kind: ResourceKind) -> usize {
        usize::from(self.slot(kind).as_ref().is_some_and(|s| !s.is_closed()))
    }

    /// Wait for the next message from either subscription
    pub async fn next(&mut self) -> WatchMessage {
        let Self {
            pods, deployments, ..
        } = self;

        tokio::select! {
            message = bridge(pods.as_mut()) => message,
            message = bridge(deployments.as_mut()) => message,
        }
    }

    fn slot(&self, kind: ResourceKind) -> &Option<Subscription> {
        match kind {
            ResourceKind::Pods => &self.pods,
            ResourceKind::Deployments => &self.deployments,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut Option<Subscription> {
        match kind {
            ResourceKind::Pods => &mut self.pods,
            ResourceKind::Deployments => &mut self.deployments,
        }
    }
}
